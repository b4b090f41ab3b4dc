//! Python emission: typing-notation type literals and accessor expressions.
//!
//! Python has no anonymous object types, so every `Object` is registered as a
//! named `TypedDict` model in a [`ModelRegistry`] owned by the generation
//! run. Models are keyed by structural equality: two configs with the same
//! parameter shape share one class.

use indexmap::IndexMap;

use super::quoted;
use crate::sanitize::type_name;
use crate::schema::SchemaType;

/// Arena of named TypedDict models for one generation run. Never a global:
/// the run context owns it and threads it through every resolve call.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Model>,
}

#[derive(Debug)]
struct Model {
    name: String,
    fields: IndexMap<String, SchemaType>,
    lines: Vec<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object shape under a name derived from `hint`, reusing an
    /// existing model when the shape is structurally equal. Children register
    /// before their parent so the rendered file declares them first.
    fn register(&mut self, hint: &str, fields: &IndexMap<String, SchemaType>) -> String {
        if let Some(model) = self.models.iter().find(|m| &m.fields == fields) {
            return model.name.clone();
        }

        let mut lines = Vec::with_capacity(fields.len().max(1));
        if fields.is_empty() {
            lines.push("    pass".to_string());
        }
        for (field_name, field) in fields {
            let ty = resolve_type(field, &format!("{hint} {field_name}"), self);
            lines.push(format!("    {}: {ty}", python_field_name(field_name)));
        }

        // Name after the field walk so names taken by just-registered
        // children count as occupied.
        let mut name = type_name(hint);
        while self.models.iter().any(|m| m.name == name) {
            name.push('_');
        }

        self.models.push(Model {
            name: name.clone(),
            fields: fields.clone(),
            lines,
        });
        name
    }

    /// Render every registered model as a TypedDict class, declaration order.
    pub fn render(&self) -> String {
        self.models
            .iter()
            .map(|model| {
                let mut out = format!("class {}(TypedDict, total=False):\n", model.name);
                out.push_str(&model.lines.join("\n"));
                out.push('\n');
                out
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// TypedDict field names cannot be quoted; fall back to sanitization for
/// keys that are not valid Python identifiers.
fn python_field_name(name: &str) -> String {
    if super::is_safe_ident(name) && !name.contains('$') {
        name.to_string()
    } else {
        crate::sanitize::sanitize_key(name)
    }
}

/// `SchemaType` → Python typing annotation. Object shapes register models on
/// the way through.
pub fn resolve_type(t: &SchemaType, hint: &str, registry: &mut ModelRegistry) -> String {
    match t {
        SchemaType::String => "str".to_string(),
        SchemaType::Number { is_integer: true } => "int".to_string(),
        SchemaType::Number { is_integer: false } => "float".to_string(),
        SchemaType::Boolean => "bool".to_string(),
        SchemaType::Null | SchemaType::Undefined => "None".to_string(),
        SchemaType::Unknown | SchemaType::Any => "Any".to_string(),
        SchemaType::Array(item) => {
            format!("List[{}]", resolve_type(item, hint, registry))
        }
        SchemaType::Object(fields) => {
            let name = registry.register(hint, fields);
            format!("\"{name}\"")
        }
        SchemaType::Tuple(items) => format!(
            "Tuple[{}]",
            items
                .iter()
                .map(|item| resolve_type(item, hint, registry))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        SchemaType::Enum(values) => format!(
            "Literal[{}]",
            values.iter().map(|v| quoted(v)).collect::<Vec<_>>().join(", ")
        ),
        SchemaType::Union(options) => format!(
            "Union[{}]",
            options
                .iter()
                .map(|o| resolve_type(o, hint, registry))
                .collect::<Vec<_>>()
                .join(", ")
        ),
        SchemaType::Optional(inner) => {
            format!("Optional[{}]", resolve_type(inner, hint, registry))
        }
        SchemaType::Function { params, returns } => format!(
            "Callable[[{}], {}]",
            resolve_type(params, &format!("{hint} params"), registry),
            resolve_type(returns, hint, registry)
        ),
    }
}

/// `SchemaType` → extraction expression reading from `expr`. Object field
/// access chains `.get()` because the payload is untyped at the boundary.
pub fn render_accessor(
    expr: &str,
    t: &SchemaType,
    hint: &str,
    registry: &mut ModelRegistry,
) -> String {
    render_at_depth(expr, t, hint, registry, 0)
}

fn render_at_depth(
    expr: &str,
    t: &SchemaType,
    hint: &str,
    registry: &mut ModelRegistry,
    depth: usize,
) -> String {
    match t {
        SchemaType::String => format!("cast(str, {expr})"),
        SchemaType::Number { is_integer: true } => format!("cast(int, {expr})"),
        SchemaType::Number { is_integer: false } => format!("cast(float, {expr})"),
        SchemaType::Boolean => format!("cast(bool, {expr})"),
        SchemaType::Null | SchemaType::Undefined | SchemaType::Unknown | SchemaType::Any => {
            expr.to_string()
        }
        SchemaType::Enum(_) | SchemaType::Union(_) | SchemaType::Tuple(_) => {
            format!("cast({}, {expr})", resolve_type(t, hint, registry))
        }
        SchemaType::Array(item) => {
            let var = format!("v{depth}");
            format!(
                "[{} for {var} in cast(List[Any], {expr} or [])]",
                render_at_depth(&var, item, hint, registry, depth + 1)
            )
        }
        SchemaType::Object(fields) => {
            let name = registry.register(hint, fields);
            let body = fields
                .iter()
                .map(|(field_name, field)| {
                    let nav = format!("({expr} or {{}}).get({})", quoted(field_name));
                    format!(
                        "{}: {}",
                        quoted(field_name),
                        render_at_depth(
                            &nav,
                            field,
                            &format!("{hint} {field_name}"),
                            registry,
                            depth + 1
                        )
                    )
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("cast(\"{name}\", {{{body}}})")
        }
        SchemaType::Optional(inner) => format!(
            "None if {expr} is None else ({})",
            render_at_depth(expr, inner, hint, registry, depth)
        ),
        SchemaType::Function { params, .. } => {
            if params.is_empty_object() {
                format!("lambda: render_template(cast(str, {expr}), {{}})")
            } else {
                let var = format!("params{depth}");
                format!(
                    "lambda {var}: render_template(cast(str, {expr}), {var})"
                )
            }
        }
    }
}
