//! Schema-literal emission: render a [`SchemaType`] back to `z` builder
//! notation. Output round-trips through the sandboxed evaluator, which is
//! what SCHEMA re-exports and debugging views rely on.

use super::{is_safe_ident, quoted};
use crate::schema::SchemaType;

pub fn schema_to_source(t: &SchemaType) -> String {
    match t {
        SchemaType::String => "z.string()".to_string(),
        SchemaType::Number { is_integer: true } => "z.number().int()".to_string(),
        SchemaType::Number { is_integer: false } => "z.number()".to_string(),
        SchemaType::Boolean => "z.boolean()".to_string(),
        SchemaType::Null => "z.null()".to_string(),
        SchemaType::Undefined => "z.undefined()".to_string(),
        SchemaType::Unknown => "z.unknown()".to_string(),
        SchemaType::Any => "z.any()".to_string(),
        SchemaType::Array(item) => format!("z.array({})", schema_to_source(item)),
        SchemaType::Object(fields) => {
            if fields.is_empty() {
                return "z.object({})".to_string();
            }
            let body = fields
                .iter()
                .map(|(name, field)| {
                    let key = if is_safe_ident(name) {
                        name.clone()
                    } else {
                        quoted(name)
                    };
                    format!("{key}: {}", schema_to_source(field))
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("z.object({{ {body} }})")
        }
        SchemaType::Tuple(items) => format!(
            "z.tuple([{}])",
            items
                .iter()
                .map(schema_to_source)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        SchemaType::Enum(values) => format!(
            "z.enum([{}])",
            values.iter().map(|v| quoted(v)).collect::<Vec<_>>().join(", ")
        ),
        SchemaType::Union(options) => format!(
            "z.union([{}])",
            options
                .iter()
                .map(schema_to_source)
                .collect::<Vec<_>>()
                .join(", ")
        ),
        SchemaType::Optional(inner) => format!("{}.optional()", schema_to_source(inner)),
        SchemaType::Function { params, .. } => {
            format!("z.function({})", schema_to_source(params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{secure_evaluate_schema, EvalOptions};

    fn round_trip(t: SchemaType) {
        let source = schema_to_source(&t);
        let outcome = secure_evaluate_schema(&source, &EvalOptions::default());
        assert!(outcome.success, "{source}: {:?}", outcome.error);
        assert_eq!(outcome.schema.unwrap(), t, "{source}");
    }

    #[test]
    fn scalars_round_trip() {
        round_trip(SchemaType::String);
        round_trip(SchemaType::integer());
        round_trip(SchemaType::float());
        round_trip(SchemaType::Boolean);
        round_trip(SchemaType::Unknown);
    }

    #[test]
    fn composites_round_trip() {
        round_trip(SchemaType::object(vec![
            ("name".to_string(), SchemaType::String),
            (
                "tags".to_string(),
                SchemaType::optional(SchemaType::array(SchemaType::String)),
            ),
            (
                "dotted.key".to_string(),
                SchemaType::Enum(vec!["A".to_string(), "B".to_string()]),
            ),
        ]));
        round_trip(SchemaType::Tuple(vec![SchemaType::String, SchemaType::Boolean]));
        round_trip(SchemaType::Union(vec![SchemaType::String, SchemaType::float()]));
        round_trip(SchemaType::template_fn(SchemaType::object(vec![(
            "name".to_string(),
            SchemaType::String,
        )])));
    }

    #[test]
    fn empty_object_renders_compact() {
        assert_eq!(
            schema_to_source(&SchemaType::empty_object()),
            "z.object({})"
        );
    }
}
