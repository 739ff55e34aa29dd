//! OpenAI Structured Outputs emitter.
//!
//! Dialect contract: every object is closed (`additionalProperties: false`),
//! every property is listed in `required`, and optionality is encoded by
//! making the property schema nullable. String-domain index signatures have
//! no encoding here and are rejected.

use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use super::{array_of, literal_union, merge_intersection, primitive_schema, ref_to};
use crate::error::TdlError;
use crate::ir::{IndexDomain, ObjectNode, TdlDoc, TypeNode};

pub fn emit_openai(doc: &TdlDoc) -> Result<Value, TdlError> {
    let mut emitter = Emitter {
        doc,
        defs: IndexMap::new(),
        stack: Vec::new(),
    };

    // Pre-register every named type so `$defs` is complete even when no
    // symbol references it.
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
        if sym.optional {
            schema = nullable(schema);
        }
        if props.insert(sym.name.clone(), schema).is_none() {
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
    /// Finished (or placeholder) schemas per named type.
    defs: IndexMap<String, Value>,
    /// Names currently being emitted; a hit here means recursion.
    stack: Vec<String>,
}

impl<'a> Emitter<'a> {
    /// Emit `name`'s definition if it isn't already in the table, and hand
    /// back a `$ref` to it. A name found on the visitation stack gets a
    /// closed placeholder installed so the reference resolves; the finished
    /// schema replaces the placeholder once the outer emission returns.
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
            if prop.optional {
                schema = nullable(schema);
            }
            if props.insert(prop.name.clone(), schema).is_none() {
                required.push(prop.name.clone());
            }
        }

        for sig in &obj.index_sigs {
            match &sig.domain {
                // The closure sugar was absorbed during parsing; anything
                // still here is a real string→value map, which this dialect
                // cannot express.
                IndexDomain::String => return Err(TdlError::OpenAiStringIndex),
                IndexDomain::Enum(keys) => {
                    for key in keys {
                        let name = key.property_name();
                        let mut schema = self.emit_node(&sig.value)?;
                        if sig.is_array {
                            schema = array_of(schema);
                        }
                        if sig.optional {
                            schema = nullable(schema);
                        }
                        if props.insert(name.clone(), schema).is_none() {
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
            "additionalProperties": false,
        }))
    }

    fn into_defs(mut self) -> Map<String, Value> {
        // Bodies finish depth-first, so re-sequence into declaration order.
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
        "additionalProperties": false,
    })
}

/// Make a schema accept `null` in place: widen a `type` string to a two-kind
/// array, extend an existing `type` array idempotently, and wrap anything
/// without a `type` (refs, `anyOf`) in `anyOf`.
fn nullable(mut schema: Value) -> Value {
    let widened = match schema.get_mut("type") {
        Some(t) if t.is_string() => {
            let prev = t.take();
            *t = json!([prev, "null"]);
            true
        }
        Some(Value::Array(kinds)) => {
            if !kinds.iter().any(|k| k == "null") {
                kinds.push(json!("null"));
            }
            true
        }
        _ => false,
    };
    if widened {
        schema
    } else {
        json!({ "anyOf": [schema, { "type": "null" }] })
    }
}
