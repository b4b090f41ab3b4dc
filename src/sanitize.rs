//! Config-key → accessor-identifier sanitization.
//!
//! One rule shared by every backend: the produced identifier must be valid in
//! TypeScript and Python simultaneously. Separators (dots, slashes, dashes,
//! spaces, any other punctuation) split the key into segments; segments are
//! camel-cased (all-caps snake segments are lowercased first); a leading
//! digit gets a `_` prefix; a reserved keyword of either target language gets
//! a `_` suffix. Deterministic by construction.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;

static RESERVED_WORDS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    let python = [
        "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
        "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
        "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
        "try", "while", "with", "yield",
    ];
    let javascript = [
        "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
        "do", "else", "enum", "export", "extends", "false", "finally", "for", "function", "if",
        "import", "in", "instanceof", "let", "new", "null", "return", "static", "super",
        "switch", "this", "throw", "true", "typeof", "var", "void", "while", "with", "yield",
        "await",
    ];
    python.into_iter().chain(javascript).collect()
});

/// Turn a config key into an identifier safe in every backend.
pub fn sanitize_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let segments = key
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|s| !s.is_empty());

    for (i, segment) in segments.enumerate() {
        // MAX_RETRIES-style segments read as words, not acronyms.
        let all_caps = segment.chars().any(|c| c.is_ascii_uppercase())
            && !segment.chars().any(|c| c.is_ascii_lowercase());
        let segment = if all_caps {
            segment.to_ascii_lowercase()
        } else {
            segment.to_string()
        };
        let mut chars = segment.chars();
        let Some(first) = chars.next() else {
            continue;
        };
        if i == 0 {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
        out.push_str(chars.as_str());
    }

    if out.is_empty() {
        out.push('_');
    }
    if out.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    // Belt: anything outside [A-Za-z0-9_] left by exotic input becomes `_`.
    let mut out: String = out
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if RESERVED_WORDS.contains(out.as_str()) {
        out.push('_');
    }
    out
}

/// PascalCase variant for generated type/model names.
pub fn type_name(key: &str) -> String {
    let ident = sanitize_key(key);
    let mut chars = ident.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => ident,
    }
}
