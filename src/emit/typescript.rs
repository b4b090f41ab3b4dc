//! TypeScript emission: type literals and runtime accessor expressions.
//!
//! Accessor expressions navigate from a single untyped `raw` root with
//! optional chaining, because the payload is untyped at the boundary.
//! Template functions render as calls to the `renderTemplate` runtime
//! primitive.

use super::{is_safe_ident, quoted};
use crate::schema::SchemaType;

/// `SchemaType` → TypeScript type literal.
pub fn resolve_type(t: &SchemaType) -> String {
    match t {
        SchemaType::String => "string".to_string(),
        SchemaType::Number { .. } => "number".to_string(),
        SchemaType::Boolean => "boolean".to_string(),
        SchemaType::Null => "null".to_string(),
        SchemaType::Undefined => "undefined".to_string(),
        SchemaType::Unknown => "unknown".to_string(),
        SchemaType::Any => "any".to_string(),
        SchemaType::Array(item) => format!("Array<{}>", resolve_type(item)),
        SchemaType::Object(fields) => {
            if fields.is_empty() {
                return "{}".to_string();
            }
            let body = fields
                .iter()
                .map(|(name, field)| {
                    let key = if is_safe_ident(name) {
                        name.clone()
                    } else {
                        quoted(name)
                    };
                    // Optionality hoists onto the field when the name is known.
                    match field {
                        SchemaType::Optional(inner) => {
                            format!("{key}?: {}", resolve_type(inner))
                        }
                        other => format!("{key}: {}", resolve_type(other)),
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");
            format!("{{ {body} }}")
        }
        SchemaType::Tuple(items) => format!(
            "[{}]",
            items.iter().map(resolve_type).collect::<Vec<_>>().join(", ")
        ),
        SchemaType::Enum(values) => values
            .iter()
            .map(|v| quoted(v))
            .collect::<Vec<_>>()
            .join(" | "),
        SchemaType::Union(options) => options
            .iter()
            .map(|o| match o {
                // Callable members need parens inside a union.
                SchemaType::Function { .. } => format!("({})", resolve_type(o)),
                other => resolve_type(other),
            })
            .collect::<Vec<_>>()
            .join(" | "),
        // No field name to hoist onto: spell out the undefined alternative.
        SchemaType::Optional(inner) => format!("{} | undefined", resolve_type(inner)),
        SchemaType::Function { params, returns } => {
            if params.is_empty_object() {
                format!("() => {}", resolve_type(returns))
            } else {
                format!("(params: {}) => {}", resolve_type(params), resolve_type(returns))
            }
        }
    }
}

/// `SchemaType` → runtime extraction expression reading from `expr`.
pub fn render_accessor(expr: &str, t: &SchemaType) -> String {
    render_at_depth(expr, t, 0)
}

/// Raw passthrough: surface the untyped value with only a type assertion.
pub fn render_raw(expr: &str, t: &SchemaType) -> String {
    format!("{expr} as {}", resolve_type(t))
}

fn render_at_depth(expr: &str, t: &SchemaType, depth: usize) -> String {
    match t {
        SchemaType::String
        | SchemaType::Number { .. }
        | SchemaType::Boolean
        | SchemaType::Null
        | SchemaType::Undefined
        | SchemaType::Enum(_)
        | SchemaType::Union(_) => format!("{expr} as {}", resolve_type(t)),
        SchemaType::Unknown => format!("{expr} as unknown"),
        SchemaType::Any => expr.to_string(),
        SchemaType::Array(item) => {
            let var = format!("v{depth}");
            format!(
                "({expr} as any[])?.map(({var}: any) => {})",
                render_at_depth(&var, item, depth + 1)
            )
        }
        SchemaType::Tuple(items) => {
            let elements = items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    render_at_depth(&format!("({expr} as any)?.[{i}]"), item, depth + 1)
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("[{elements}] as {}", resolve_type(t))
        }
        SchemaType::Object(fields) => {
            if fields.is_empty() {
                return "{}".to_string();
            }
            let body = fields
                .iter()
                .map(|(name, field)| {
                    let key = if is_safe_ident(name) {
                        name.clone()
                    } else {
                        quoted(name)
                    };
                    let nav = format!("({expr} as any)?.[{}]", quoted(name));
                    format!("{key}: {}", render_at_depth(&nav, field, depth + 1))
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{ {body} }}")
        }
        SchemaType::Optional(inner) => format!(
            "{expr} === undefined ? undefined : ({})",
            render_at_depth(expr, inner, depth)
        ),
        SchemaType::Function { params, .. } => {
            let var = format!("params{depth}");
            if params.is_empty_object() {
                format!("() => renderTemplate({expr} as string, {{}})")
            } else {
                format!(
                    "({var}: {}) => renderTemplate({expr} as string, {var})",
                    resolve_type(params)
                )
            }
        }
    }
}
