//! Interpreter over the validated schema expression AST.
//!
//! This is a real fold over the accepted method-chain grammar, not a dynamic
//! evaluation primitive: every builder call is matched here and produces a
//! [`SchemaType`] directly, so the interpreter is total over the grammar it
//! accepts and an unknown method is an ordinary evaluation error.

use super::parser::Expr;
use super::ROOT_IDENT;
use crate::schema::SchemaType;

/// Intermediate values during evaluation.
#[derive(Debug, Clone)]
pub(super) enum Value {
    Builder,
    Schema(SchemaType),
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Undefined,
    List(Vec<Value>),
    Map(Vec<(String, Value)>),
    /// A discarded callback argument (refine/transform/...).
    Callback,
}

/// Chain combinators accepted and discarded: they refine runtime validation
/// but do not change the structural type.
const IGNORED_METHODS: &[&str] = &[
    "describe",
    "default",
    "catch",
    "min",
    "max",
    "length",
    "email",
    "url",
    "uuid",
    "regex",
    "startsWith",
    "endsWith",
    "trim",
    "strict",
    "passthrough",
    "brand",
    "readonly",
    "refine",
    "transform",
    "superRefine",
    "pipe",
    "preprocess",
];

pub(super) fn evaluate(expr: &Expr) -> Result<Value, String> {
    match expr {
        Expr::Ident(name) if name == ROOT_IDENT => Ok(Value::Builder),
        Expr::Ident(name) => Err(format!("unknown identifier `{name}`")),
        Expr::StringLit(text) => Ok(Value::Str(text.clone())),
        Expr::NumberLit(value) => Ok(Value::Num(*value)),
        Expr::BoolLit(value) => Ok(Value::Bool(*value)),
        Expr::NullLit => Ok(Value::Null),
        Expr::UndefinedLit => Ok(Value::Undefined),
        Expr::ArrayLit(items) => Ok(Value::List(
            items.iter().map(evaluate).collect::<Result<_, _>>()?,
        )),
        Expr::ObjectLit(entries) => Ok(Value::Map(
            entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), evaluate(value)?)))
                .collect::<Result<_, String>>()?,
        )),
        Expr::Arrow { .. } => Ok(Value::Callback),
        Expr::Call { callee, args } => {
            let Expr::Member { object, property } = callee.as_ref() else {
                return Err("schema expressions may only call builder methods".to_string());
            };
            let receiver = evaluate(object)?;
            let args: Vec<Value> = args.iter().map(evaluate).collect::<Result<_, _>>()?;
            match receiver {
                Value::Builder => builder_method(property, &args),
                Value::Schema(schema) => chain_method(schema, property, &args),
                _ => Err(format!(
                    "cannot call `.{property}()` on a non-schema value"
                )),
            }
        }
        Expr::Member { property, .. } => Err(format!(
            "`.{property}` must be called, not referenced"
        )),
        Expr::Index { .. } => Err("computed member access is not supported".to_string()),
        Expr::Await(_) | Expr::Block(_) | Expr::ClassExpr | Expr::FunctionExpr
        | Expr::ImportStmt | Expr::ExportStmt => {
            Err("unsupported construct in schema expression".to_string())
        }
    }
}

/// `z.<method>(...)` constructors.
fn builder_method(method: &str, args: &[Value]) -> Result<Value, String> {
    let schema = match method {
        "string" => SchemaType::String,
        "number" => SchemaType::float(),
        "boolean" => SchemaType::Boolean,
        "null" => SchemaType::Null,
        "undefined" => SchemaType::Undefined,
        "unknown" => SchemaType::Unknown,
        "any" => SchemaType::Any,
        "array" => SchemaType::array(single_schema_arg(method, args)?),
        "optional" => SchemaType::optional(single_schema_arg(method, args)?),
        "nullable" => {
            SchemaType::union(vec![single_schema_arg(method, args)?, SchemaType::Null])
        }
        "object" => {
            let Some(Value::Map(entries)) = args.first() else {
                return Err("z.object(...) expects an object literal".to_string());
            };
            let mut fields = Vec::with_capacity(entries.len());
            for (name, value) in entries {
                let Value::Schema(field) = value else {
                    return Err(format!("field `{name}` of z.object(...) is not a schema"));
                };
                fields.push((name.clone(), field.clone()));
            }
            SchemaType::object(fields)
        }
        "tuple" => SchemaType::Tuple(schema_list_arg(method, args)?),
        "union" => SchemaType::union(schema_list_arg(method, args)?),
        "enum" => {
            let Some(Value::List(items)) = args.first() else {
                return Err("z.enum(...) expects an array of strings".to_string());
            };
            let mut values = Vec::with_capacity(items.len());
            for item in items {
                let Value::Str(text) = item else {
                    return Err("z.enum(...) expects an array of strings".to_string());
                };
                values.push(text.clone());
            }
            SchemaType::Enum(values)
        }
        "literal" => match args.first() {
            Some(Value::Str(text)) => SchemaType::Enum(vec![text.clone()]),
            Some(Value::Num(value)) => SchemaType::Number {
                is_integer: value.fract() == 0.0,
            },
            Some(Value::Bool(_)) => SchemaType::Boolean,
            Some(Value::Null) => SchemaType::Null,
            Some(Value::Undefined) => SchemaType::Undefined,
            _ => return Err("z.literal(...) expects a literal argument".to_string()),
        },
        // Template functions take a params object and render to a string.
        "function" => match args.first() {
            None => SchemaType::template_fn(SchemaType::empty_object()),
            Some(Value::Schema(params)) => SchemaType::template_fn(params.clone()),
            Some(_) => return Err("z.function(...) expects a schema argument".to_string()),
        },
        other => return Err(format!("unsupported builder method `z.{other}(...)`")),
    };
    Ok(Value::Schema(schema))
}

/// `<schema>.<method>(...)` chain combinators.
fn chain_method(schema: SchemaType, method: &str, args: &[Value]) -> Result<Value, String> {
    let schema = match method {
        "optional" => SchemaType::optional(schema),
        "nullable" => SchemaType::union(vec![schema, SchemaType::Null]),
        "nullish" => SchemaType::optional(SchemaType::union(vec![schema, SchemaType::Null])),
        "array" => SchemaType::array(schema),
        "int" => match schema {
            SchemaType::Number { .. } => SchemaType::integer(),
            other => {
                return Err(format!(
                    "`.int()` applies to numbers, not {other:?}"
                ))
            }
        },
        other if IGNORED_METHODS.contains(&other) => {
            let _ = args;
            schema
        }
        other => return Err(format!("unsupported schema method `.{other}(...)`")),
    };
    Ok(Value::Schema(schema))
}

fn single_schema_arg(method: &str, args: &[Value]) -> Result<SchemaType, String> {
    match args.first() {
        Some(Value::Schema(schema)) => Ok(schema.clone()),
        _ => Err(format!("z.{method}(...) expects a schema argument")),
    }
}

fn schema_list_arg(method: &str, args: &[Value]) -> Result<Vec<SchemaType>, String> {
    let Some(Value::List(items)) = args.first() else {
        return Err(format!("z.{method}(...) expects an array of schemas"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::Schema(schema) => Ok(schema.clone()),
            _ => Err(format!("z.{method}(...) expects an array of schemas")),
        })
        .collect()
}
