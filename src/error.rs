//! Authoring errors surfaced by the parser and the schema emitters.

use thiserror::Error;

/// A violation of the TDL authoring rules. Carries the involved identifier
/// where one exists; the message names the rule broken.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TdlError {
    // ---- shape errors ----
    #[error("YAML: {0}")]
    Yaml(String),

    #[error("TDL document must be a YAML mapping at the top level")]
    RootNotMapping,

    #[error("Unrecognized top-level entry: {0}")]
    UnrecognizedTopLevel(String),

    #[error("Extends body of `{0}` must be a YAML mapping")]
    ExtendsBodyNotMapping(String),

    #[error("Value of `{0}` must be a mapping or a type expression")]
    BadValueShape(String),

    // ---- label errors ----
    #[error("Malformed member label: `{0}`")]
    MalformedLabel(String),

    #[error("Malformed index signature: `{0}`")]
    MalformedIndexSignature(String),

    #[error("Enum-like expression must be literals or ALL_CAPS_TOKENs")]
    BadEnumDomain,

    #[error("Enum-like domain of `{0}` mixes literal kinds")]
    MixedEnumDomain(String),

    // ---- type-expression errors ----
    #[error("Function types are not supported: `{0}`")]
    FunctionType(String),

    #[error("Conditional types are not supported: `{0}`")]
    ConditionalType(String),

    #[error("Qualified imports (`::`) are not supported: `{0}`")]
    QualifiedImport(String),

    #[error("Unsupported generic type: `{0}`")]
    UnsupportedGeneric(String),

    #[error("Empty type expression")]
    EmptyTypeExpr,

    #[error("Unrecognized type expression: `{0}`")]
    UnrecognizedTypeExpr(String),

    // ---- reference errors ----
    #[error("Reference to undeclared type: `{0}`")]
    UnknownTypeRef(String),

    #[error("Circular reference while merging intersection: `{0}`")]
    CircularIntersection(String),

    // ---- dialect errors ----
    #[error("Intersection operands must be object-like")]
    NonObjectIntersection,

    #[error("OpenAI schema: string index signatures (maps) are not supported.")]
    OpenAiStringIndex,
}
