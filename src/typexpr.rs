//! Scalar type-expression sub-parser.
//!
//! Recursive descent over the string right-hand side of a definition or
//! member: union (`|`) binds loosest, then intersection (`&`), then a
//! parenthesized group, then an atom. The top-level splitter skips separators
//! inside `(...)`, `<...>`, and quoted strings.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::TdlError;
use crate::ir::{KeyLit, Primitive, TypeNode};

static GENERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*<(.*)>$").unwrap());
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?$").unwrap());
static TYPE_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Za-z0-9]*$").unwrap());
static ALL_CAPS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap());

pub fn parse_type_expr(src: &str) -> Result<TypeNode, TdlError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(TdlError::EmptyTypeExpr);
    }

    // 1) union
    let parts = split_top_level(src, '|');
    if parts.len() >= 2 {
        let members = parts
            .iter()
            .map(|p| parse_type_expr(p))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(TypeNode::Union(members));
    }

    // 2) intersection
    let parts = split_top_level(src, '&');
    if parts.len() >= 2 {
        let members = parts
            .iter()
            .map(|p| parse_type_expr(p))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(TypeNode::Intersection(members));
    }

    // 3) parenthesized group
    if let Some(inner) = strip_outer_parens(src) {
        return parse_type_expr(inner);
    }

    // 4) atom
    parse_atom(src)
}

fn parse_atom(src: &str) -> Result<TypeNode, TdlError> {
    if let Some(lit) = quoted_literal(src) {
        return Ok(TypeNode::StringLit(lit));
    }
    match src {
        "true" => return Ok(TypeNode::BoolLit(true)),
        "false" => return Ok(TypeNode::BoolLit(false)),
        _ => {}
    }

    // Unsupported TDL constructs get a precise error instead of fallthrough.
    if src.contains("=>") {
        return Err(TdlError::FunctionType(src.to_string()));
    }
    if src
        .split_whitespace()
        .any(|w| matches!(w, "if" | "then" | "else"))
    {
        return Err(TdlError::ConditionalType(src.to_string()));
    }
    if src.contains("::") {
        return Err(TdlError::QualifiedImport(src.to_string()));
    }
    if let Some(caps) = GENERIC_RE.captures(src) {
        // `Ref<...>` is the one admitted generic: references are opaque
        // strings at the schema level.
        if &caps[1] == "Ref" {
            return Ok(TypeNode::Primitive(Primitive::String));
        }
        return Err(TdlError::UnsupportedGeneric(caps[1].to_string()));
    }

    if NUMBER_RE.is_match(src) {
        return Ok(TypeNode::NumberLit(parse_number(src)?));
    }
    if let Some(p) = Primitive::from_word(src) {
        return Ok(TypeNode::Primitive(p));
    }
    if TYPE_REF_RE.is_match(src) {
        return Ok(TypeNode::TypeRef(src.to_string()));
    }
    if ALL_CAPS_RE.is_match(src) {
        return Ok(TypeNode::StringLit(src.to_string()));
    }

    Err(TdlError::UnrecognizedTypeExpr(src.to_string()))
}

fn parse_number(token: &str) -> Result<serde_json::Number, TdlError> {
    if !token.contains('.') {
        if let Ok(i) = token.parse::<i64>() {
            return Ok(serde_json::Number::from(i));
        }
    }
    let f = token
        .parse::<f64>()
        .map_err(|_| TdlError::UnrecognizedTypeExpr(token.to_string()))?;
    serde_json::Number::from_f64(f).ok_or_else(|| TdlError::UnrecognizedTypeExpr(token.to_string()))
}

fn quoted_literal(src: &str) -> Option<String> {
    let bytes = src.as_bytes();
    if src.len() >= 2 {
        let q = bytes[0];
        if (q == b'\'' || q == b'"') && bytes[src.len() - 1] == q {
            return Some(src[1..src.len() - 1].to_string());
        }
    }
    None
}

// ---------------------------- enum-like domains ---------------------------- //

/// Parse an index-signature key domain written as a `|`-union of literals
/// (quoted strings, numbers, `true`/`false`) or ALL_CAPS_TOKENs.
pub fn parse_enum_domain(src: &str) -> Result<Vec<KeyLit>, TdlError> {
    split_top_level(src, '|')
        .iter()
        .map(|part| parse_enum_key(part))
        .collect()
}

fn parse_enum_key(src: &str) -> Result<KeyLit, TdlError> {
    if let Some(lit) = quoted_literal(src) {
        return Ok(KeyLit::Str(lit));
    }
    match src {
        "true" => return Ok(KeyLit::Bool(true)),
        "false" => return Ok(KeyLit::Bool(false)),
        _ => {}
    }
    if NUMBER_RE.is_match(src) {
        return Ok(KeyLit::Num(parse_number(src)?));
    }
    if ALL_CAPS_RE.is_match(src) {
        return Ok(KeyLit::Str(src.to_string()));
    }
    Err(TdlError::BadEnumDomain)
}

// ------------------------------ the splitter ------------------------------- //

/// Split `src` on `sep` at top level only: separators inside `(...)`, `<...>`,
/// or single/double quotes (with backslash escapes) do not count. Parts come
/// back trimmed.
pub fn split_top_level(src: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut paren_depth = 0usize;
    let mut angle_depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0usize;

    for (i, c) in src.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => paren_depth += 1,
            ')' => paren_depth = paren_depth.saturating_sub(1),
            '<' => angle_depth += 1,
            '>' => angle_depth = angle_depth.saturating_sub(1),
            _ if c == sep && paren_depth == 0 && angle_depth == 0 => {
                parts.push(src[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(src[start..].trim());
    parts
}

/// If the whole expression is one `(...)` group (parentheses stay balanced at
/// every prefix), return the interior.
fn strip_outer_parens(src: &str) -> Option<&str> {
    if !src.starts_with('(') || !src.ends_with(')') {
        return None;
    }
    let mut depth = 0i32;
    for (i, c) in src.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 && i != src.len() - 1 {
                    return None;
                }
            }
            _ => {}
        }
    }
    if depth == 0 {
        Some(&src[1..src.len() - 1])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitives_and_refs() {
        assert_eq!(
            parse_type_expr("string").unwrap(),
            TypeNode::Primitive(Primitive::String)
        );
        assert_eq!(
            parse_type_expr("never").unwrap(),
            TypeNode::Primitive(Primitive::Never)
        );
        assert_eq!(
            parse_type_expr("User").unwrap(),
            TypeNode::TypeRef("User".into())
        );
    }

    #[test]
    fn test_all_caps_token_is_string_literal() {
        // `FOO` satisfies the TypeRef pattern and stays a reference; only an
        // underscore forces the ALL_CAPS literal reading.
        assert_eq!(
            parse_type_expr("FOO").unwrap(),
            TypeNode::TypeRef("FOO".into())
        );
        assert_eq!(
            parse_type_expr("FOO_BAR").unwrap(),
            TypeNode::StringLit("FOO_BAR".into())
        );
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            parse_type_expr("'hi'").unwrap(),
            TypeNode::StringLit("hi".into())
        );
        assert_eq!(
            parse_type_expr("\"hi\"").unwrap(),
            TypeNode::StringLit("hi".into())
        );
        assert_eq!(parse_type_expr("true").unwrap(), TypeNode::BoolLit(true));
        assert_eq!(
            parse_type_expr("42").unwrap(),
            TypeNode::NumberLit(serde_json::Number::from(42))
        );
        assert_eq!(
            parse_type_expr("1.5").unwrap(),
            TypeNode::NumberLit(serde_json::Number::from_f64(1.5).unwrap())
        );
    }

    #[test]
    fn test_union_precedence_over_intersection() {
        let node = parse_type_expr("A & B | C").unwrap();
        match node {
            TypeNode::Union(members) => {
                assert_eq!(members.len(), 2);
                assert!(matches!(&members[0], TypeNode::Intersection(m) if m.len() == 2));
                assert_eq!(members[1], TypeNode::TypeRef("C".into()));
            }
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn test_parenthesized_group() {
        let node = parse_type_expr("(A | B) & C").unwrap();
        match node {
            TypeNode::Intersection(members) => {
                assert!(matches!(&members[0], TypeNode::Union(m) if m.len() == 2));
                assert_eq!(members[1], TypeNode::TypeRef("C".into()));
            }
            other => panic!("expected Intersection, got {other:?}"),
        }
    }

    #[test]
    fn test_splitter_skips_quotes_parens_angles() {
        assert_eq!(split_top_level("'a|b' | c", '|'), vec!["'a|b'", "c"]);
        assert_eq!(split_top_level("(a | b) | c", '|'), vec!["(a | b)", "c"]);
        assert_eq!(split_top_level("Ref<a|b> | c", '|'), vec!["Ref<a|b>", "c"]);
        assert_eq!(split_top_level("'a\\'|b' | c", '|'), vec!["'a\\'|b'", "c"]);
    }

    #[test]
    fn test_ref_generic_lowers_to_string() {
        assert_eq!(
            parse_type_expr("Ref<Whatever>").unwrap(),
            TypeNode::Primitive(Primitive::String)
        );
        assert_eq!(
            parse_type_expr("Ref<A | B>").unwrap(),
            TypeNode::Primitive(Primitive::String)
        );
    }

    #[test]
    fn test_rejections() {
        assert!(matches!(
            parse_type_expr("(x) => y"),
            Err(TdlError::FunctionType(_))
        ));
        assert!(matches!(
            parse_type_expr("if A then B else C"),
            Err(TdlError::ConditionalType(_))
        ));
        assert!(matches!(
            parse_type_expr("pkg::Name"),
            Err(TdlError::QualifiedImport(_))
        ));
        assert!(matches!(
            parse_type_expr("Map<string>"),
            Err(TdlError::UnsupportedGeneric(name)) if name == "Map"
        ));
        assert!(matches!(parse_type_expr("   "), Err(TdlError::EmptyTypeExpr)));
        assert!(matches!(
            parse_type_expr("%bogus"),
            Err(TdlError::UnrecognizedTypeExpr(_))
        ));
    }

    #[test]
    fn test_enum_domain() {
        let keys = parse_enum_domain("'a' | 'b'").unwrap();
        assert_eq!(keys, vec![KeyLit::Str("a".into()), KeyLit::Str("b".into())]);

        let keys = parse_enum_domain("1 | 2 | 3").unwrap();
        assert_eq!(keys.len(), 3);
        assert!(keys.iter().all(|k| k.kind() == "number"));

        let keys = parse_enum_domain("NORTH | SOUTH").unwrap();
        assert_eq!(
            keys,
            vec![KeyLit::Str("NORTH".into()), KeyLit::Str("SOUTH".into())]
        );

        assert!(matches!(
            parse_enum_domain("'a' | notliteral"),
            Err(TdlError::BadEnumDomain)
        ));
    }
}
