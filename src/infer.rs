//! Schema inference.
//!
//! Given one config and the manifest it lives in, produce the structural type
//! that the generated accessor will expose. An explicitly authored schema
//! (via `schemaKey` → SCHEMA config) wins when it evaluates; otherwise the
//! type is inferred from the observed values. All values across all rows are
//! candidate instances of the same logical type and are merged, never just
//! the first one.

use serde_json::Value;

use crate::diag::Diagnostics;
use crate::eval::{secure_evaluate_schema, EvalOptions};
use crate::model::{Config, ConfigFile, ConfigValue, ValueType};
use crate::schema::SchemaType;
use crate::template;
use indexmap::IndexMap;

/// Target representation for DURATION values. Call sites disagree on the
/// right answer, so it is a knob rather than a constant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DurationType {
    #[default]
    Number,
    String,
}

#[derive(Debug, Clone, Default)]
pub struct InferOptions {
    pub duration_type: DurationType,
}

/// Infer the structural type for one config.
pub fn infer(
    config: &Config,
    file: &ConfigFile,
    options: &InferOptions,
    diag: &dyn Diagnostics,
) -> SchemaType {
    if let Some(schema_key) = &config.schema_key {
        match file.resolve_schema(schema_key) {
            Some(schema_config) => {
                if let Some(base) = evaluate_linked_schema(schema_config, diag) {
                    return replace_strings_with_mustache(base, config, diag);
                }
                // Warning already logged; fall through to structural inference.
            }
            None => diag.log(
                "infer",
                &format!(
                    "config `{}` references schema `{schema_key}` which does not resolve; \
                     falling back to structural inference",
                    config.key
                ),
            ),
        }
    }
    infer_from_values(config, options, diag)
}

/// Run the evaluator on the first value of a SCHEMA config that carries
/// schema text. Evaluation failure is a warning, never fatal.
fn evaluate_linked_schema(schema_config: &Config, diag: &dyn Diagnostics) -> Option<SchemaType> {
    for value in schema_config.all_values() {
        let ConfigValue::Schema(payload) = value else {
            continue;
        };
        let outcome = secure_evaluate_schema(&payload.schema, &EvalOptions::default());
        if outcome.success {
            return outcome.schema;
        }
        diag.log(
            "infer",
            &format!(
                "schema `{}` failed to evaluate: {}",
                schema_config.key,
                outcome.error.unwrap_or_default()
            ),
        );
        return None;
    }
    diag.log(
        "infer",
        &format!("schema `{}` has no schema text", schema_config.key),
    );
    None
}

/// Structural inference by declared valueType.
fn infer_from_values(
    config: &Config,
    options: &InferOptions,
    diag: &dyn Diagnostics,
) -> SchemaType {
    match config.value_type {
        ValueType::String => {
            let strings = literal_strings(config);
            template_schema_from_strings(&strings, diag).unwrap_or(SchemaType::String)
        }
        ValueType::Bool => SchemaType::Boolean,
        ValueType::Int => SchemaType::integer(),
        ValueType::Double => SchemaType::float(),
        ValueType::StringList => SchemaType::array(SchemaType::String),
        ValueType::Duration => match options.duration_type {
            DurationType::Number => SchemaType::float(),
            DurationType::String => SchemaType::String,
        },
        ValueType::LogLevel => SchemaType::log_levels(),
        ValueType::Json => infer_json(config, diag),
        ValueType::NotSetValueType => {
            diag.log(
                "infer",
                &format!("config `{}` has an unrecognized valueType", config.key),
            );
            SchemaType::Any
        }
    }
}

/// Every literal string value across all rows, in order.
fn literal_strings(config: &Config) -> Vec<String> {
    config
        .all_values()
        .filter_map(|v| match v {
            ConfigValue::String(text) => Some(text.clone()),
            _ => None,
        })
        .collect()
}

/// Extract a template parameter schema from each string and merge the
/// results. Returns `None` when no string carries placeholders, in which
/// case the caller falls back to a plain `String`.
fn template_schema_from_strings(
    strings: &[String],
    diag: &dyn Diagnostics,
) -> Option<SchemaType> {
    let merged = strings
        .iter()
        .map(|text| template::extract_schema(text, diag))
        .reduce(merge_object_schemas)?;
    if merged.is_empty_object() {
        return None;
    }
    Some(SchemaType::template_fn(merged))
}

/// Infer from JSON payloads: one structural schema per parsable value, then a
/// pairwise merge across them. Unparsable payloads are skipped with a
/// warning.
fn infer_json(config: &Config, diag: &dyn Diagnostics) -> SchemaType {
    let mut schemas = Vec::new();
    for value in config.all_values() {
        let ConfigValue::Json(payload) = value else {
            continue;
        };
        match serde_json::from_str::<Value>(&payload.json) {
            Ok(parsed) => schemas.push(infer_value(&parsed, diag)),
            Err(error) => diag.log(
                "infer",
                &format!(
                    "config `{}`: skipping unparsable JSON value: {error}",
                    config.key
                ),
            ),
        }
    }
    match schemas.len() {
        0 => {
            diag.log(
                "infer",
                &format!("config `{}` has no parsable JSON values", config.key),
            );
            SchemaType::Any
        }
        _ => schemas
            .into_iter()
            .reduce(merge_object_schemas)
            .expect("non-empty schema list"),
    }
}

/// Bottom-up structural inference over one parsed JSON value. String leaves
/// that look template-like are threaded through the template extractor.
fn infer_value(value: &Value, diag: &dyn Diagnostics) -> SchemaType {
    match value {
        Value::Null => SchemaType::Null,
        Value::Bool(_) => SchemaType::Boolean,
        Value::Number(n) => SchemaType::Number {
            is_integer: n.is_i64() || n.is_u64(),
        },
        Value::String(text) => infer_string_leaf(text, diag),
        // Element type comes from the first element only. Mixed-type arrays
        // are treated as homogeneous-by-first-element on this path; rows that
        // disagree still get reconciled by the outer merge.
        Value::Array(items) => SchemaType::array(
            items
                .first()
                .map(|item| infer_value(item, diag))
                .unwrap_or(SchemaType::Unknown),
        ),
        Value::Object(map) => SchemaType::Object(
            map.iter()
                .map(|(name, item)| (name.clone(), infer_value(item, diag)))
                .collect(),
        ),
    }
}

fn infer_string_leaf(text: &str, diag: &dyn Diagnostics) -> SchemaType {
    if template::looks_like_template(text) {
        let params = template::extract_schema(text, diag);
        if !params.is_empty_object() {
            return SchemaType::template_fn(params);
        }
    }
    SchemaType::String
}

/// Merge two independently inferred schemas for the same logical value.
///
/// For two `Object`s, the result covers the union of field names: fields on
/// both sides merge recursively, fields on one side become `Optional`. Left
/// fold over more than two candidates.
pub fn merge_object_schemas(a: SchemaType, b: SchemaType) -> SchemaType {
    match (a, b) {
        (SchemaType::Object(fa), SchemaType::Object(mut fb)) => {
            let mut out: IndexMap<String, SchemaType> = IndexMap::new();
            for (name, ta) in fa {
                match fb.shift_remove(&name) {
                    Some(tb) => {
                        out.insert(name, merge_field(ta, tb));
                    }
                    None => {
                        out.insert(name, SchemaType::optional(ta));
                    }
                }
            }
            for (name, tb) in fb {
                out.insert(name, SchemaType::optional(tb));
            }
            SchemaType::Object(out)
        }
        (a, b) => merge_field(a, b),
    }
}

fn merge_field(a: SchemaType, b: SchemaType) -> SchemaType {
    match (a, b) {
        // Peel optionality before reconciling so the left fold stays
        // associative: a field optional after two rows still merges
        // field-wise with a third row instead of degenerating to a union.
        (SchemaType::Optional(ia), SchemaType::Optional(ib)) => {
            SchemaType::optional(merge_field(*ia, *ib))
        }
        (SchemaType::Optional(ia), b) => SchemaType::optional(merge_field(*ia, b)),
        (a, SchemaType::Optional(ib)) => SchemaType::optional(merge_field(a, *ib)),
        (SchemaType::Object(fa), SchemaType::Object(fb)) => {
            merge_object_schemas(SchemaType::Object(fa), SchemaType::Object(fb))
        }
        (
            SchemaType::Function {
                params: pa,
                returns,
            },
            SchemaType::Function { params: pb, .. },
        ) => {
            if params_significantly_different(&pa, &pb) {
                SchemaType::union(vec![
                    SchemaType::Function {
                        params: pa,
                        returns: returns.clone(),
                    },
                    SchemaType::Function {
                        params: pb,
                        returns,
                    },
                ])
            } else {
                SchemaType::Function {
                    params: Box::new(merge_object_schemas(*pa, *pb)),
                    returns,
                }
            }
        }
        (a, b) => {
            if core::mem::discriminant(&a) == core::mem::discriminant(&b) {
                // Same shape class: structurally equal for merge purposes.
                a
            } else {
                SchemaType::union(vec![a, b])
            }
        }
    }
}

/// Heuristic split rule for function-valued fields: parameter shapes are
/// incompatible when one side has a section-derived (array/object) field and
/// the other doesn't, or when they share no field names at all.
fn params_significantly_different(a: &SchemaType, b: &SchemaType) -> bool {
    let (Some(fa), Some(fb)) = (a.as_object(), b.as_object()) else {
        return a != b;
    };
    fn section_like(t: &SchemaType) -> bool {
        match t {
            SchemaType::Array(_) | SchemaType::Object(_) => true,
            SchemaType::Optional(inner) => section_like(inner),
            _ => false,
        }
    }
    let sections_a = fa.values().any(section_like);
    let sections_b = fb.values().any(section_like);
    if sections_a != sections_b {
        return true;
    }
    if !fa.is_empty() && !fb.is_empty() && fa.keys().all(|name| !fb.contains_key(name)) {
        return true;
    }
    false
}

/// Walk an explicitly authored schema and substitute template functions for
/// its string leaves, using the literal values observed at each field path
/// across the config's rows. `Enum` leaves stay as-is; arrays and unions are
/// not descended (a documented limitation of the explicit-schema path).
fn replace_strings_with_mustache(
    schema: SchemaType,
    config: &Config,
    diag: &dyn Diagnostics,
) -> SchemaType {
    let documents = observed_documents(config, diag);
    let mut path = Vec::new();
    substitute(schema, &documents, &mut path, diag)
}

/// Concrete values to mine for template text: parsed JSON payloads plus
/// top-level string values.
fn observed_documents(config: &Config, diag: &dyn Diagnostics) -> Vec<Value> {
    let mut documents = Vec::new();
    for value in config.all_values() {
        match value {
            ConfigValue::Json(payload) => match serde_json::from_str::<Value>(&payload.json) {
                Ok(parsed) => documents.push(parsed),
                Err(error) => diag.log(
                    "infer",
                    &format!(
                        "config `{}`: skipping unparsable JSON value: {error}",
                        config.key
                    ),
                ),
            },
            ConfigValue::String(text) => documents.push(Value::String(text.clone())),
            _ => {}
        }
    }
    documents
}

fn substitute(
    schema: SchemaType,
    documents: &[Value],
    path: &mut Vec<String>,
    diag: &dyn Diagnostics,
) -> SchemaType {
    match schema {
        SchemaType::Object(fields) => SchemaType::Object(
            fields
                .into_iter()
                .map(|(name, field)| {
                    path.push(name.clone());
                    let replaced = substitute(field, documents, path, diag);
                    path.pop();
                    (name, replaced)
                })
                .collect(),
        ),
        SchemaType::Optional(inner) => match *inner {
            SchemaType::String => {
                SchemaType::optional(substitute_string_leaf(documents, path, diag))
            }
            SchemaType::Object(fields) => SchemaType::optional(substitute(
                SchemaType::Object(fields),
                documents,
                path,
                diag,
            )),
            other => SchemaType::optional(other),
        },
        SchemaType::String => substitute_string_leaf(documents, path, diag),
        other => other,
    }
}

fn substitute_string_leaf(
    documents: &[Value],
    path: &[String],
    diag: &dyn Diagnostics,
) -> SchemaType {
    let strings = strings_at_path(documents, path);
    template_schema_from_strings(&strings, diag).unwrap_or(SchemaType::String)
}

/// Literal strings observed at one field path across all documents.
fn strings_at_path(documents: &[Value], path: &[String]) -> Vec<String> {
    documents
        .iter()
        .filter_map(|document| {
            let mut cursor = document;
            for segment in path {
                cursor = cursor.get(segment)?;
            }
            cursor.as_str().map(str::to_string)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{CollectingDiagnostics, NullDiagnostics};
    use crate::model::ConfigFile;

    fn manifest(source: &str) -> ConfigFile {
        ConfigFile::from_json(source).unwrap()
    }

    fn infer_only(file: &ConfigFile, key: &str) -> SchemaType {
        let config = file.configs.iter().find(|c| c.key == key).unwrap();
        infer(config, file, &InferOptions::default(), &NullDiagnostics)
    }

    #[test]
    fn bool_flag_infers_boolean() {
        let file = manifest(
            r#"{ "configs": [ { "key": "feature.enabled", "configType": "FEATURE_FLAG",
                 "valueType": "BOOL", "rows": [ { "values": [ { "value": { "bool": true } } ] } ] } ] }"#,
        );
        assert_eq!(infer_only(&file, "feature.enabled"), SchemaType::Boolean);
    }

    #[test]
    fn scalar_value_types() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "retries", "valueType": "INT", "rows": [ { "values": [ { "value": { "int": 3 } } ] } ] },
                { "key": "ratio", "valueType": "DOUBLE", "rows": [ { "values": [ { "value": { "double": 0.5 } } ] } ] },
                { "key": "hosts", "valueType": "STRING_LIST", "rows": [ { "values": [ { "value": { "stringList": { "values": ["a"] } } } ] } ] },
                { "key": "level", "valueType": "LOG_LEVEL", "rows": [ { "values": [ { "value": { "logLevel": "INFO" } } ] } ] }
            ] }"#,
        );
        assert_eq!(infer_only(&file, "retries"), SchemaType::integer());
        assert_eq!(infer_only(&file, "ratio"), SchemaType::float());
        assert_eq!(
            infer_only(&file, "hosts"),
            SchemaType::array(SchemaType::String)
        );
        assert_eq!(infer_only(&file, "level"), SchemaType::log_levels());
    }

    #[test]
    fn duration_type_is_a_knob() {
        let file = manifest(
            r#"{ "configs": [ { "key": "timeout", "valueType": "DURATION",
                 "rows": [ { "values": [ { "value": { "duration": { "definition": "PT30S" } } } ] } ] } ] }"#,
        );
        let config = &file.configs[0];
        let as_number = infer(config, &file, &InferOptions::default(), &NullDiagnostics);
        assert_eq!(as_number, SchemaType::float());
        let as_string = infer(
            config,
            &file,
            &InferOptions {
                duration_type: DurationType::String,
            },
            &NullDiagnostics,
        );
        assert_eq!(as_string, SchemaType::String);
    }

    #[test]
    fn plain_string_stays_string() {
        let file = manifest(
            r#"{ "configs": [ { "key": "motd", "valueType": "STRING",
                 "rows": [ { "values": [ { "value": { "string": "hello world" } } ] } ] } ] }"#,
        );
        assert_eq!(infer_only(&file, "motd"), SchemaType::String);
    }

    #[test]
    fn templated_string_becomes_function() {
        let file = manifest(
            r#"{ "configs": [ { "key": "greeting", "valueType": "STRING",
                 "rows": [ { "values": [ { "value": { "string": "Hello {{name}}!" } } ] } ] } ] }"#,
        );
        assert_eq!(
            infer_only(&file, "greeting"),
            SchemaType::template_fn(SchemaType::object(vec![(
                "name".to_string(),
                SchemaType::String
            )]))
        );
    }

    #[test]
    fn multiple_template_strings_merge_params() {
        let file = manifest(
            r#"{ "configs": [ { "key": "greeting", "valueType": "STRING", "rows": [
                { "values": [ { "value": { "string": "Hello {{name}}" } } ] },
                { "values": [ { "value": { "string": "Bye {{name}}, see you {{when}}" } } ] }
            ] } ] }"#,
        );
        let SchemaType::Function { params, .. } = infer_only(&file, "greeting") else {
            panic!("expected function");
        };
        let fields = params.as_object().unwrap();
        assert_eq!(fields.get("name"), Some(&SchemaType::String));
        assert_eq!(
            fields.get("when"),
            Some(&SchemaType::optional(SchemaType::String))
        );
    }

    #[test]
    fn json_rows_merge_into_one_object() {
        let file = manifest(
            r#"{ "configs": [ { "key": "limits", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "{\"a\":1,\"b\":\"x\"}" } } } ] },
                { "values": [ { "value": { "json": { "json": "{\"a\":2,\"c\":true}" } } } ] }
            ] } ] }"#,
        );
        let t = infer_only(&file, "limits");
        assert_eq!(
            t,
            SchemaType::object(vec![
                ("a".to_string(), SchemaType::integer()),
                ("b".to_string(), SchemaType::optional(SchemaType::String)),
                ("c".to_string(), SchemaType::optional(SchemaType::Boolean)),
            ])
        );
    }

    #[test]
    fn unparsable_json_is_skipped_with_warning() {
        let diag = CollectingDiagnostics::new();
        let file = manifest(
            r#"{ "configs": [ { "key": "limits", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "{not json" } } } ] },
                { "values": [ { "value": { "json": { "json": "{\"a\":1}" } } } ] }
            ] } ] }"#,
        );
        let config = &file.configs[0];
        let t = infer(config, &file, &InferOptions::default(), &diag);
        assert_eq!(
            t,
            SchemaType::object(vec![("a".to_string(), SchemaType::integer())])
        );
        assert!(diag.contains("unparsable"));
    }

    #[test]
    fn template_inside_json_becomes_function_field() {
        let file = manifest(
            r#"{ "configs": [ { "key": "email", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "{\"subject\":\"Hi {{user}}\",\"retries\":2}" } } } ] }
            ] } ] }"#,
        );
        let t = infer_only(&file, "email");
        let fields = t.as_object().unwrap();
        assert_eq!(
            fields.get("subject"),
            Some(&SchemaType::template_fn(SchemaType::object(vec![(
                "user".to_string(),
                SchemaType::String
            )])))
        );
        assert_eq!(fields.get("retries"), Some(&SchemaType::integer()));
    }

    #[test]
    fn json_array_uses_first_element_policy() {
        let file = manifest(
            r#"{ "configs": [ { "key": "mixed", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "[1, \"two\", true]" } } } ] }
            ] } ] }"#,
        );
        assert_eq!(
            infer_only(&file, "mixed"),
            SchemaType::array(SchemaType::integer())
        );
    }

    #[test]
    fn explicit_schema_wins_over_inference() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "payload", "valueType": "JSON", "schemaKey": "payload-schema", "rows": [
                    { "values": [ { "value": { "json": { "json": "{\"whatever\":1}" } } } ] } ] },
                { "key": "payload-schema", "configType": "SCHEMA", "rows": [
                    { "values": [ { "value": { "schema": { "schema": "z.object({ id: z.number().int() })" } } } ] } ] }
            ] }"#,
        );
        assert_eq!(
            infer_only(&file, "payload"),
            SchemaType::object(vec![("id".to_string(), SchemaType::integer())])
        );
    }

    #[test]
    fn broken_explicit_schema_falls_back_with_warning() {
        let diag = CollectingDiagnostics::new();
        let file = manifest(
            r#"{ "configs": [
                { "key": "payload", "valueType": "BOOL", "schemaKey": "payload-schema", "rows": [
                    { "values": [ { "value": { "bool": true } } ] } ] },
                { "key": "payload-schema", "configType": "SCHEMA", "rows": [
                    { "values": [ { "value": { "schema": { "schema": "eval('boom')" } } } ] } ] }
            ] }"#,
        );
        let config = &file.configs[0];
        let t = infer(config, &file, &InferOptions::default(), &diag);
        assert_eq!(t, SchemaType::Boolean);
        assert!(diag.contains("payload-schema"));
    }

    #[test]
    fn unresolved_schema_key_falls_back_with_warning() {
        let diag = CollectingDiagnostics::new();
        let file = manifest(
            r#"{ "configs": [ { "key": "payload", "valueType": "INT", "schemaKey": "ghost",
                 "rows": [ { "values": [ { "value": { "int": 1 } } ] } ] } ] }"#,
        );
        let t = infer(&file.configs[0], &file, &InferOptions::default(), &diag);
        assert_eq!(t, SchemaType::integer());
        assert!(diag.contains("ghost"));
    }

    #[test]
    fn explicit_schema_string_leaves_pick_up_templates() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "email", "valueType": "JSON", "schemaKey": "email-schema", "rows": [
                    { "values": [ { "value": { "json": { "json": "{\"subject\":\"Hi {{user}}\",\"from\":\"ops@example.com\"}" } } } ] } ] },
                { "key": "email-schema", "configType": "SCHEMA", "rows": [
                    { "values": [ { "value": { "schema": { "schema": "z.object({ subject: z.string(), from: z.string() })" } } } ] } ] }
            ] }"#,
        );
        let t = infer_only(&file, "email");
        let fields = t.as_object().unwrap();
        assert_eq!(
            fields.get("subject"),
            Some(&SchemaType::template_fn(SchemaType::object(vec![(
                "user".to_string(),
                SchemaType::String
            )])))
        );
        // No placeholders observed at this path: the declared String stays.
        assert_eq!(fields.get("from"), Some(&SchemaType::String));
    }

    #[test]
    fn enum_leaves_are_left_untouched() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "mode", "valueType": "JSON", "schemaKey": "mode-schema", "rows": [
                    { "values": [ { "value": { "json": { "json": "{\"kind\":\"{{k}}\"}" } } } ] } ] },
                { "key": "mode-schema", "configType": "SCHEMA", "rows": [
                    { "values": [ { "value": { "schema": { "schema": "z.object({ kind: z.enum([\"fast\", \"slow\"]) })" } } } ] } ] }
            ] }"#,
        );
        let t = infer_only(&file, "mode");
        let fields = t.as_object().unwrap();
        assert_eq!(
            fields.get("kind"),
            Some(&SchemaType::Enum(vec![
                "fast".to_string(),
                "slow".to_string()
            ]))
        );
    }

    #[test]
    fn merge_is_idempotent() {
        let a = SchemaType::object(vec![
            ("x".to_string(), SchemaType::String),
            (
                "y".to_string(),
                SchemaType::object(vec![("z".to_string(), SchemaType::Boolean)]),
            ),
            (
                "f".to_string(),
                SchemaType::template_fn(SchemaType::object(vec![(
                    "p".to_string(),
                    SchemaType::String,
                )])),
            ),
        ]);
        assert_eq!(merge_object_schemas(a.clone(), a.clone()), a);
    }

    #[test]
    fn merge_is_commutative_up_to_union_order() {
        let a = SchemaType::object(vec![
            ("shared".to_string(), SchemaType::String),
            ("only_a".to_string(), SchemaType::Boolean),
        ]);
        let b = SchemaType::object(vec![
            ("shared".to_string(), SchemaType::integer()),
            ("only_b".to_string(), SchemaType::String),
        ]);
        let ab = merge_object_schemas(a.clone(), b.clone());
        let ba = merge_object_schemas(b, a);
        let fa = ab.as_object().unwrap();
        let fb = ba.as_object().unwrap();
        let mut names_ab: Vec<&String> = fa.keys().collect();
        let mut names_ba: Vec<&String> = fb.keys().collect();
        names_ab.sort();
        names_ba.sort();
        assert_eq!(names_ab, names_ba);
        // Divergent field: union with both arms, order may differ.
        let SchemaType::Union(arms_ab) = fa.get("shared").unwrap() else {
            panic!();
        };
        let SchemaType::Union(arms_ba) = fb.get("shared").unwrap() else {
            panic!();
        };
        assert_eq!(arms_ab.len(), 2);
        assert!(arms_ab.iter().all(|t| arms_ba.contains(t)));
        // One-sided fields are optional on both orders.
        assert_eq!(
            fa.get("only_a"),
            Some(&SchemaType::optional(SchemaType::Boolean))
        );
        assert_eq!(
            fb.get("only_a"),
            Some(&SchemaType::optional(SchemaType::Boolean))
        );
    }

    #[test]
    fn three_row_merge_keeps_optionality_flat() {
        // A field absent in the first row stays a plain Optional after later
        // rows agree on its type, not a union of wrapped and bare forms.
        let file = manifest(
            r#"{ "configs": [ { "key": "limits", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "{\"a\":1}" } } } ] },
                { "values": [ { "value": { "json": { "json": "{\"a\":1,\"b\":\"x\"}" } } } ] },
                { "values": [ { "value": { "json": { "json": "{\"a\":1,\"b\":\"y\"}" } } } ] }
            ] } ] }"#,
        );
        assert_eq!(
            infer_only(&file, "limits"),
            SchemaType::object(vec![
                ("a".to_string(), SchemaType::integer()),
                ("b".to_string(), SchemaType::optional(SchemaType::String)),
            ])
        );
    }

    #[test]
    fn optional_object_fields_still_merge_field_wise() {
        let a = SchemaType::object(vec![(
            "f".to_string(),
            SchemaType::optional(SchemaType::object(vec![(
                "p".to_string(),
                SchemaType::String,
            )])),
        )]);
        let b = SchemaType::object(vec![(
            "f".to_string(),
            SchemaType::object(vec![
                ("p".to_string(), SchemaType::String),
                ("q".to_string(), SchemaType::Boolean),
            ]),
        )]);
        let merged = merge_object_schemas(a, b);
        let fields = merged.as_object().unwrap();
        assert_eq!(
            fields.get("f"),
            Some(&SchemaType::optional(SchemaType::object(vec![
                ("p".to_string(), SchemaType::String),
                ("q".to_string(), SchemaType::optional(SchemaType::Boolean)),
            ])))
        );
    }

    #[test]
    fn function_merge_splits_on_section_mismatch() {
        let flat = SchemaType::template_fn(SchemaType::object(vec![(
            "name".to_string(),
            SchemaType::String,
        )]));
        let sectioned = SchemaType::template_fn(SchemaType::object(vec![(
            "items".to_string(),
            SchemaType::array(SchemaType::object(vec![(
                "name".to_string(),
                SchemaType::String,
            )])),
        )]));
        let a = SchemaType::object(vec![("f".to_string(), flat.clone())]);
        let b = SchemaType::object(vec![("f".to_string(), sectioned.clone())]);
        let merged = merge_object_schemas(a, b);
        let fields = merged.as_object().unwrap();
        assert_eq!(
            fields.get("f"),
            Some(&SchemaType::union(vec![flat, sectioned]))
        );
    }

    #[test]
    fn function_merge_combines_compatible_params() {
        let a = SchemaType::object(vec![(
            "f".to_string(),
            SchemaType::template_fn(SchemaType::object(vec![
                ("name".to_string(), SchemaType::String),
                ("city".to_string(), SchemaType::String),
            ])),
        )]);
        let b = SchemaType::object(vec![(
            "f".to_string(),
            SchemaType::template_fn(SchemaType::object(vec![
                ("name".to_string(), SchemaType::String),
                ("country".to_string(), SchemaType::String),
            ])),
        )]);
        let merged = merge_object_schemas(a, b);
        let fields = merged.as_object().unwrap();
        let SchemaType::Function { params, .. } = fields.get("f").unwrap() else {
            panic!("expected merged function");
        };
        let params = params.as_object().unwrap();
        assert_eq!(params.get("name"), Some(&SchemaType::String));
        assert_eq!(
            params.get("city"),
            Some(&SchemaType::optional(SchemaType::String))
        );
        assert_eq!(
            params.get("country"),
            Some(&SchemaType::optional(SchemaType::String))
        );
    }
}
