//! Gemini `jsonschema_gemini` emitter.
//!
//! Dialect contract: optional fields are simply left out of `required`, and
//! object openness follows the TDL source — an open object emits
//! `additionalProperties: true`, a string-domain index signature emits its
//! value schema there. The root object is deliberately closed.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use super::{array_of, literal_union, merge_intersection, primitive_schema, ref_to};
use crate::error::TdlError;
use crate::ir::{IndexDomain, ObjectNode, Primitive, TdlDoc, TypeNode};

pub fn emit_gemini(doc: &TdlDoc) -> Result<Value, TdlError> {
    let mut emitter = Emitter {
        doc,
        defs: IndexMap::new(),
        stack: Vec::new(),
    };

    for name in doc.types.keys() {
        emitter.ensure_def(name)?;
    }

    let mut props = Map::new();
    let mut required = Vec::new();
    for sym in &doc.symbols {
        let mut schema = emitter.emit_node(&sym.ty)?;
        if sym.is_array {
            schema = array_of(schema);
        }
        if props.insert(sym.name.clone(), schema).is_none() && !sym.optional {
            required.push(sym.name.clone());
        }
    }

    Ok(json!({
        "type": "object",
        "properties": props,
        "required": required,
        "additionalProperties": false,
        "$defs": emitter.into_defs(),
    }))
}

struct Emitter<'a> {
    doc: &'a TdlDoc,
    defs: IndexMap<String, Value>,
    stack: Vec<String>,
}

impl<'a> Emitter<'a> {
    fn ensure_def(&mut self, name: &str) -> Result<Value, TdlError> {
        if self.stack.iter().any(|n| n == name) {
            self.defs
                .entry(name.to_string())
                .or_insert_with(placeholder);
            return Ok(ref_to(name));
        }
        if self.defs.contains_key(name) {
            return Ok(ref_to(name));
        }
        let node = self
            .doc
            .types
            .get(name)
            .cloned()
            .ok_or_else(|| TdlError::UnknownTypeRef(name.to_string()))?;
        self.stack.push(name.to_string());
        let emitted = self.emit_node(&node);
        self.stack.pop();
        self.defs.insert(name.to_string(), emitted?);
        Ok(ref_to(name))
    }

    fn emit_node(&mut self, node: &TypeNode) -> Result<Value, TdlError> {
        Ok(match node {
            TypeNode::Primitive(p) => primitive_schema(*p),
            TypeNode::StringLit(s) => json!({ "type": "string", "enum": [s] }),
            TypeNode::NumberLit(n) => json!({ "type": "number", "enum": [n] }),
            TypeNode::BoolLit(b) => json!({ "type": "boolean", "enum": [b] }),
            TypeNode::TypeRef(name) => self.ensure_def(name)?,
            TypeNode::Union(members) => match literal_union(members) {
                Some(compressed) => compressed,
                None => {
                    let arms = members
                        .iter()
                        .map(|m| self.emit_node(m))
                        .collect::<Result<Vec<_>, _>>()?;
                    json!({ "anyOf": arms })
                }
            },
            TypeNode::Intersection(members) => {
                let merged = merge_intersection(members, &self.doc.types)?;
                self.emit_object(&merged)?
            }
            TypeNode::Object(obj) => self.emit_object(obj)?,
        })
    }

    fn emit_object(&mut self, obj: &ObjectNode) -> Result<Value, TdlError> {
        let mut props = Map::new();
        let mut required = Vec::new();

        for prop in &obj.props {
            let mut schema = self.emit_node(&prop.ty)?;
            if prop.is_array {
                schema = array_of(schema);
            }
            if props.insert(prop.name.clone(), schema).is_none() && !prop.optional {
                required.push(prop.name.clone());
            }
        }

        let mut additional = Value::Bool(!obj.closed);
        for sig in &obj.index_sigs {
            match &sig.domain {
                IndexDomain::String => {
                    // A never-valued map admits no extra keys at all; any
                    // other value schema becomes the map's value constraint.
                    // Among several string-domain signatures (possible after
                    // intersection merging) the last one wins.
                    if matches!(sig.value, TypeNode::Primitive(Primitive::Never)) {
                        additional = Value::Bool(false);
                    } else {
                        let mut schema = self.emit_node(&sig.value)?;
                        if sig.is_array {
                            schema = array_of(schema);
                        }
                        additional = schema;
                    }
                }
                IndexDomain::Enum(keys) => {
                    for key in keys {
                        let name = key.property_name();
                        let mut schema = self.emit_node(&sig.value)?;
                        if sig.is_array {
                            schema = array_of(schema);
                        }
                        if props.insert(name.clone(), schema).is_none() && !sig.optional {
                            required.push(name);
                        }
                    }
                }
            }
        }

        Ok(json!({
            "type": "object",
            "properties": props,
            "required": required,
            "additionalProperties": additional,
        }))
    }

    fn into_defs(mut self) -> Map<String, Value> {
        let mut out = Map::new();
        for name in self.doc.types.keys() {
            if let Some(schema) = self.defs.shift_remove(name) {
                out.insert(name.clone(), schema);
            }
        }
        out
    }
}

fn placeholder() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "required": [],
        "additionalProperties": true,
    })
}
