// Strongly-typed IR for the two schema emitters. Built once by the parser,
// read-only afterwards; named-type cycles live in `TypeRef` nodes, never as
// pointer cycles, so the tree stays acyclic.

use indexmap::IndexMap;
use serde_json::Number;

/// The whole parsed document.
#[derive(Debug, Clone, Default)]
pub struct TdlDoc {
    /// Named type definitions, keyed by declared name. Iteration order equals
    /// declaration order in the source YAML; `$defs` depends on it.
    pub types: IndexMap<String, TypeNode>,
    /// Top-level symbols (lowercase labels), in source order. These become the
    /// properties of the emitted root object.
    pub symbols: Vec<SymbolDef>,
    /// Underscore-prefixed sections (`_primitives`, `_comments`, ...), kept
    /// opaque for downstream tools.
    pub meta: IndexMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDef {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(Primitive),
    StringLit(String),
    /// Stored as the numeric value parsed from the source token.
    NumberLit(Number),
    BoolLit(bool),
    /// Reference to a named type; may be forward or self-referential.
    TypeRef(String),
    /// ≥ 2 members.
    Union(Vec<TypeNode>),
    /// ≥ 2 members.
    Intersection(Vec<TypeNode>),
    Object(ObjectNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Number,
    Boolean,
    /// A TDL document embedded as a value; lowers to `string`.
    Typedoc,
    Image,
    Audio,
    Video,
    Never,
}

impl Primitive {
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "typedoc" => Self::Typedoc,
            "image" => Self::Image,
            "audio" => Self::Audio,
            "video" => Self::Video,
            "never" => Self::Never,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    pub props: Vec<PropNode>,
    pub index_sigs: Vec<IndexSig>,
    /// Set when the body contained the closure sugar `[k: string]? never`;
    /// the sugar itself is not retained in `index_sigs`.
    pub closed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropNode {
    pub name: String,
    pub ty: TypeNode,
    pub optional: bool,
    /// `true` means array-of-`ty`; `ty` itself is not wrapped.
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSig {
    pub domain: IndexDomain,
    pub value: TypeNode,
    pub optional: bool,
    pub is_array: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexDomain {
    /// `[k: string]` — all string keys.
    String,
    /// `[k: 'a' | 'b']` — a finite key set of homogeneous literal kind.
    Enum(Vec<KeyLit>),
}

/// A literal admissible as an enum-domain key.
#[derive(Debug, Clone, PartialEq)]
pub enum KeyLit {
    Str(String),
    Num(Number),
    Bool(bool),
}

impl KeyLit {
    /// The concrete property name this key materializes as.
    pub fn property_name(&self) -> String {
        match self {
            KeyLit::Str(s) => s.clone(),
            KeyLit::Num(n) => n.to_string(),
            KeyLit::Bool(b) => b.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            KeyLit::Str(_) => "string",
            KeyLit::Num(_) => "number",
            KeyLit::Bool(_) => "boolean",
        }
    }
}
