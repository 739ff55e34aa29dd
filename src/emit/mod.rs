//! Schema emitters and the machinery they share.
//!
//! Both dialects use the same primitive/literal/union lowerings and the same
//! intersection merge; they differ in how they encode optionality, object
//! closure, and dynamic keys.

pub mod gemini;
pub mod openai;

use indexmap::IndexMap;
use serde_json::{json, Value};

use crate::error::TdlError;
use crate::ir::{IndexSig, ObjectNode, Primitive, PropNode, TypeNode};

pub(crate) fn ref_to(name: &str) -> Value {
    json!({ "$ref": format!("#/$defs/{name}") })
}

/// `never` has no JSON Schema bottom type; a contradictory numeric range
/// rejects every value.
pub(crate) fn never_schema() -> Value {
    json!({ "type": "number", "minimum": 1, "maximum": 0 })
}

pub(crate) fn primitive_schema(p: Primitive) -> Value {
    match p {
        Primitive::String
        | Primitive::Typedoc
        | Primitive::Image
        | Primitive::Audio
        | Primitive::Video => json!({ "type": "string" }),
        Primitive::Number => json!({ "type": "number" }),
        Primitive::Boolean => json!({ "type": "boolean" }),
        Primitive::Never => never_schema(),
    }
}

pub(crate) fn array_of(items: Value) -> Value {
    json!({ "type": "array", "items": items })
}

/// Compress a union whose members are all literals of one JSON type into
/// `{type, enum}`, preserving member order. Returns `None` for anything else
/// (the caller falls back to `anyOf`).
pub(crate) fn literal_union(members: &[TypeNode]) -> Option<Value> {
    let mut ty: Option<&'static str> = None;
    let mut values = Vec::with_capacity(members.len());
    for member in members {
        let (t, v) = match member {
            TypeNode::StringLit(s) => ("string", Value::String(s.clone())),
            TypeNode::NumberLit(n) => ("number", Value::Number(n.clone())),
            TypeNode::BoolLit(b) => ("boolean", Value::Bool(*b)),
            _ => return None,
        };
        match ty {
            None => ty = Some(t),
            Some(seen) if seen == t => {}
            Some(_) => return None,
        }
        values.push(v);
    }
    Some(json!({ "type": ty?, "enum": values }))
}

// --------------------------- intersection merge ---------------------------- //

/// Collapse intersection operands into one synthetic object: properties merge
/// with rightmost-wins, index signatures concatenate in order, and closure is
/// sticky. Merging is structural and shallow.
pub(crate) fn merge_intersection(
    members: &[TypeNode],
    types: &IndexMap<String, TypeNode>,
) -> Result<ObjectNode, TdlError> {
    let mut resolving = Vec::new();
    merge_into(members, types, &mut resolving)
}

fn merge_into(
    members: &[TypeNode],
    types: &IndexMap<String, TypeNode>,
    resolving: &mut Vec<String>,
) -> Result<ObjectNode, TdlError> {
    let mut props: IndexMap<String, PropNode> = IndexMap::new();
    let mut index_sigs: Vec<IndexSig> = Vec::new();
    let mut closed = false;

    for member in members {
        let operand = resolve_operand(member, types, resolving)?;
        for prop in operand.props {
            props.insert(prop.name.clone(), prop);
        }
        index_sigs.extend(operand.index_sigs);
        closed |= operand.closed;
    }

    Ok(ObjectNode {
        props: props.into_values().collect(),
        index_sigs,
        closed,
    })
}

fn resolve_operand(
    node: &TypeNode,
    types: &IndexMap<String, TypeNode>,
    resolving: &mut Vec<String>,
) -> Result<ObjectNode, TdlError> {
    match node {
        TypeNode::Object(obj) => Ok(obj.clone()),
        TypeNode::TypeRef(name) => {
            if resolving.iter().any(|n| n == name) {
                return Err(TdlError::CircularIntersection(name.clone()));
            }
            let target = types
                .get(name)
                .ok_or_else(|| TdlError::UnknownTypeRef(name.clone()))?;
            resolving.push(name.clone());
            let resolved = resolve_operand(target, types, resolving);
            resolving.pop();
            resolved
        }
        TypeNode::Intersection(members) => merge_into(members, types, resolving),
        _ => Err(TdlError::NonObjectIntersection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ObjectNode;

    fn prop(name: &str, ty: TypeNode) -> PropNode {
        PropNode {
            name: name.into(),
            ty,
            optional: false,
            is_array: false,
        }
    }

    fn obj(props: Vec<PropNode>) -> TypeNode {
        TypeNode::Object(ObjectNode {
            props,
            index_sigs: Vec::new(),
            closed: false,
        })
    }

    #[test]
    fn test_literal_union_compression() {
        let members = vec![
            TypeNode::StringLit("a".into()),
            TypeNode::StringLit("b".into()),
        ];
        assert_eq!(
            literal_union(&members).unwrap(),
            json!({"type": "string", "enum": ["a", "b"]})
        );

        let mixed = vec![
            TypeNode::StringLit("a".into()),
            TypeNode::NumberLit(1.into()),
        ];
        assert!(literal_union(&mixed).is_none());

        let with_ref = vec![TypeNode::StringLit("a".into()), TypeNode::TypeRef("T".into())];
        assert!(literal_union(&with_ref).is_none());
    }

    #[test]
    fn test_merge_rightmost_wins() {
        let a = obj(vec![
            prop("x", TypeNode::Primitive(Primitive::String)),
            prop("y", TypeNode::Primitive(Primitive::String)),
        ]);
        let b = obj(vec![prop("x", TypeNode::Primitive(Primitive::Number))]);

        let merged = merge_intersection(&[a, b], &IndexMap::new()).unwrap();
        assert_eq!(merged.props.len(), 2);
        assert_eq!(merged.props[0].name, "x");
        assert_eq!(merged.props[0].ty, TypeNode::Primitive(Primitive::Number));
        assert_eq!(merged.props[1].name, "y");
    }

    #[test]
    fn test_merge_resolves_refs_and_rejects_cycles() {
        let mut types = IndexMap::new();
        types.insert(
            "A".to_string(),
            obj(vec![prop("x", TypeNode::Primitive(Primitive::String))]),
        );
        let merged =
            merge_intersection(&[TypeNode::TypeRef("A".into()), obj(vec![])], &types).unwrap();
        assert_eq!(merged.props.len(), 1);

        assert!(matches!(
            merge_intersection(&[TypeNode::TypeRef("Nope".into()), obj(vec![])], &types),
            Err(TdlError::UnknownTypeRef(name)) if name == "Nope"
        ));

        let mut cyclic = IndexMap::new();
        cyclic.insert(
            "Loop".to_string(),
            TypeNode::Intersection(vec![TypeNode::TypeRef("Loop".into()), obj(vec![])]),
        );
        assert!(matches!(
            merge_intersection(&[TypeNode::TypeRef("Loop".into()), obj(vec![])], &cyclic),
            Err(TdlError::CircularIntersection(_))
        ));
    }

    #[test]
    fn test_merge_rejects_non_object_operand() {
        assert!(matches!(
            merge_intersection(
                &[obj(vec![]), TypeNode::Primitive(Primitive::String)],
                &IndexMap::new()
            ),
            Err(TdlError::NonObjectIntersection)
        ));
    }
}
