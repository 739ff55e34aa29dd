//! TDL parser: YAML tree → IR.
//!
//! Top-level entries are classified by their label: underscore-prefixed keys
//! are opaque metadata, capitalized labels declare named types (with an
//! optional `Name(Base)` extends sugar), lowercase labels declare symbols.
//! Mapping values recurse through the inline-object body grammar; scalar
//! values go through the type-expression sub-parser.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value as Yaml};

use crate::error::TdlError;
use crate::ir::{
    IndexDomain, IndexSig, ObjectNode, Primitive, PropNode, SymbolDef, TdlDoc, TypeNode,
};
use crate::typexpr;

static EXTENDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z][A-Za-z0-9]*)\((.+)\)$").unwrap());
static TYPE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap());
static SYMBOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][A-Za-z0-9_]*)([?\[\]]*)$").unwrap());
static PROP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z][A-Za-z0-9_]*)(.*)$").unwrap());
static PROP_TAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\?|\[\])*$").unwrap());
static INDEX_SIG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[([A-Za-z_][A-Za-z0-9_]*)\s*:\s*(.+?)\](\[\]\?|\?\[\]|\[\]|\?)?$").unwrap()
});

pub fn parse_document(src: &str) -> Result<TdlDoc, TdlError> {
    let root: Yaml = serde_yaml::from_str(src).map_err(|e| TdlError::Yaml(e.to_string()))?;
    let Yaml::Mapping(mapping) = root else {
        return Err(TdlError::RootNotMapping);
    };

    let mut doc = TdlDoc::default();
    for (key, value) in &mapping {
        let label = match key {
            Yaml::String(s) => s.as_str(),
            other => return Err(TdlError::UnrecognizedTopLevel(yaml_key_display(other))),
        };

        if label.starts_with('_') {
            doc.meta.insert(label.to_string(), value.clone());
            continue;
        }

        if let Some(caps) = EXTENDS_RE.captures(label) {
            let name = &caps[1];
            let body = value
                .as_mapping()
                .ok_or_else(|| TdlError::ExtendsBodyNotMapping(name.to_string()))?;
            let base = typexpr::parse_type_expr(&caps[2])?;
            let body = TypeNode::Object(parse_object_body(body)?);
            doc.types
                .insert(name.to_string(), TypeNode::Intersection(vec![base, body]));
            continue;
        }

        if TYPE_NAME_RE.is_match(label) {
            let node = parse_member_value(label, value)?;
            doc.types.insert(label.to_string(), node);
            continue;
        }

        if let Some(caps) = SYMBOL_RE.captures(label) {
            let suffix = &caps[2];
            doc.symbols.push(SymbolDef {
                name: caps[1].to_string(),
                ty: parse_member_value(label, value)?,
                optional: suffix.contains('?'),
                is_array: suffix.contains("[]"),
            });
            continue;
        }

        return Err(TdlError::UnrecognizedTopLevel(label.to_string()));
    }
    Ok(doc)
}

/// A definition or member value: a mapping recurses as an inline object body,
/// a scalar is a type expression. A YAML reader hands `true` or `8080` back
/// as typed scalars; their source spelling is still a type expression.
fn parse_member_value(label: &str, value: &Yaml) -> Result<TypeNode, TdlError> {
    match value {
        Yaml::Mapping(body) => Ok(TypeNode::Object(parse_object_body(body)?)),
        Yaml::String(expr) => typexpr::parse_type_expr(expr),
        Yaml::Bool(b) => typexpr::parse_type_expr(if *b { "true" } else { "false" }),
        Yaml::Number(n) => typexpr::parse_type_expr(&n.to_string()),
        Yaml::Null => Err(TdlError::EmptyTypeExpr),
        _ => Err(TdlError::BadValueShape(label.to_string())),
    }
}

fn parse_object_body(body: &Mapping) -> Result<ObjectNode, TdlError> {
    let mut obj = ObjectNode::default();
    for (key, value) in body {
        let label = match key {
            Yaml::String(s) => s.as_str(),
            other => return Err(TdlError::MalformedLabel(yaml_key_display(other))),
        };
        if label.starts_with('[') {
            parse_index_sig(label, value, &mut obj)?;
        } else {
            parse_property(label, value, &mut obj)?;
        }
    }
    Ok(obj)
}

fn parse_index_sig(label: &str, value: &Yaml, obj: &mut ObjectNode) -> Result<(), TdlError> {
    let caps = INDEX_SIG_RE
        .captures(label)
        .ok_or_else(|| TdlError::MalformedIndexSignature(label.to_string()))?;
    let domain_src = caps[2].trim().to_string();
    let tail = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    let optional = tail.contains('?');
    let is_array = tail.contains("[]");
    let value_ty = parse_member_value(label, value)?;

    if domain_src == "string" {
        // `[k: string]? never` is the closure sugar: mark the object closed
        // and drop the signature itself.
        if optional && value_ty == TypeNode::Primitive(Primitive::Never) {
            obj.closed = true;
            return Ok(());
        }
        obj.index_sigs.push(IndexSig {
            domain: IndexDomain::String,
            value: value_ty,
            optional,
            is_array,
        });
        return Ok(());
    }

    let keys = typexpr::parse_enum_domain(&domain_src)?;
    if let Some(first) = keys.first() {
        if keys.iter().any(|k| k.kind() != first.kind()) {
            return Err(TdlError::MixedEnumDomain(label.to_string()));
        }
    }
    obj.index_sigs.push(IndexSig {
        domain: IndexDomain::Enum(keys),
        value: value_ty,
        optional,
        is_array,
    });
    Ok(())
}

fn parse_property(label: &str, value: &Yaml, obj: &mut ObjectNode) -> Result<(), TdlError> {
    let caps = PROP_RE
        .captures(label)
        .ok_or_else(|| TdlError::MalformedLabel(label.to_string()))?;
    let tail = &caps[2];
    if !PROP_TAIL_RE.is_match(tail) {
        return Err(TdlError::MalformedLabel(label.to_string()));
    }
    obj.props.push(PropNode {
        name: caps[1].to_string(),
        ty: parse_member_value(label, value)?,
        optional: tail.contains('?'),
        is_array: tail.contains("[]"),
    });
    Ok(())
}

fn yaml_key_display(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        Yaml::Bool(b) => b.to_string(),
        Yaml::Number(n) => n.to_string(),
        _ => "<non-scalar key>".to_string(),
    }
}
