//! Code emission backends.
//!
//! Every backend is a structural recursion over the full [`SchemaType`]
//! variant set; the closed enum makes partial coverage a compile error
//! instead of a runtime surprise. Shared helpers live here.

pub mod python;
pub mod schema_literal;
pub mod typescript;

use crate::schema::SchemaType;

/// True when `name` can appear unquoted as an object key / member name.
pub(crate) fn is_safe_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// A JSON-escaped, double-quoted string literal (valid in both targets).
pub(crate) fn quoted(text: &str) -> String {
    serde_json::to_string(text).expect("string serialization")
}

/// Whether any part of the type is a template function; drives the
/// template-runtime import in generated files.
pub(crate) fn contains_function(t: &SchemaType) -> bool {
    match t {
        SchemaType::Function { .. } => true,
        SchemaType::Array(item) => contains_function(item),
        SchemaType::Object(fields) => fields.values().any(contains_function),
        SchemaType::Tuple(items) => items.iter().any(contains_function),
        SchemaType::Union(options) => options.iter().any(contains_function),
        SchemaType::Optional(inner) => contains_function(inner),
        SchemaType::String
        | SchemaType::Number { .. }
        | SchemaType::Boolean
        | SchemaType::Null
        | SchemaType::Undefined
        | SchemaType::Unknown
        | SchemaType::Any
        | SchemaType::Enum(_) => false,
    }
}
