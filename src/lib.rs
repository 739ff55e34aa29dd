//! TDL (Typedoc Definition Language) → structured-output JSON Schemas.
//!
//! One authoring language, two targets: a TDL document compiles into the
//! OpenAI Structured Outputs subset and the Gemini `jsonschema_gemini`
//! subset of JSON Schema from a single source of truth.
//!
//! Pipeline: YAML tree → TDL parser → typed IR → per-dialect emitters.
//! The transformation is pure and synchronous; every call builds a fresh IR
//! and fresh emitter state, so concurrent conversions cannot interfere.

pub mod cli;
pub mod emit;
pub mod error;
pub mod ir;
pub mod parser;
pub mod typexpr;

use serde_json::Value;

pub use emit::gemini::emit_gemini;
pub use emit::openai::emit_openai;
pub use error::TdlError;
pub use ir::TdlDoc;
pub use parser::parse_document;

/// Both schemas produced from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub openai: Value,
    pub gemini: Value,
}

/// Compile a TDL document into both dialects.
pub fn convert(source: &str) -> Result<Conversion, TdlError> {
    let doc = parser::parse_document(source)?;
    Ok(Conversion {
        openai: emit::openai::emit_openai(&doc)?,
        gemini: emit::gemini::emit_gemini(&doc)?,
    })
}
