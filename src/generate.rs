//! Generation driver: manifest in, one generated source file out.
//!
//! Entries are sorted by key so output is deterministic regardless of
//! manifest order. Configs with zero rows carry no data and are skipped.
//! SCHEMA configs re-export their evaluated type under a generated name;
//! everything else gets a type declaration plus a typed accessor reading
//! from the untyped payload.

use std::collections::BTreeMap;

use crate::diag::Diagnostics;
use crate::emit::{contains_function, python, quoted, typescript};
use crate::error::GenerateError;
use crate::eval::{secure_evaluate_schema, EvalOptions};
use crate::infer::{infer, InferOptions};
use crate::model::{Config, ConfigFile, ConfigType, ConfigValue};
use crate::sanitize::{sanitize_key, type_name};
use crate::schema::SchemaType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    TypeScript,
    Python,
}

impl Target {
    pub fn file_name(&self) -> &'static str {
        match self {
            Target::TypeScript => "confgen_generated.ts",
            Target::Python => "confgen_generated.py",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub target: Target,
    pub infer: InferOptions,
    /// Surface values with a single type assertion instead of navigating
    /// accessor expressions.
    pub raw_accessors: bool,
}

impl GenerateOptions {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            infer: InferOptions::default(),
            raw_accessors: false,
        }
    }
}

struct Entry<'a> {
    config: &'a Config,
    ident: String,
    type_name: String,
    schema: SchemaType,
    is_schema: bool,
}

/// Generate one source file for the requested target.
pub fn generate(
    file: &ConfigFile,
    options: &GenerateOptions,
    diag: &dyn Diagnostics,
) -> Result<String, GenerateError> {
    let mut selected: Vec<&Config> = file
        .configs
        .iter()
        .filter(|config| !config.rows.is_empty())
        .collect();
    selected.sort_by(|a, b| a.key.cmp(&b.key));

    // Two keys that sanitize to the same identifier would silently shadow
    // each other in the generated file, so the whole run fails instead.
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for config in &selected {
        let ident = sanitize_key(&config.key);
        if let Some(first_key) = seen.insert(ident.clone(), config.key.as_str()) {
            return Err(GenerateError::IdentifierCollision {
                first_key: first_key.to_string(),
                second_key: config.key.clone(),
                identifier: ident,
            });
        }
    }

    let mut entries = Vec::with_capacity(selected.len());
    for config in selected {
        let is_schema = config.config_type == ConfigType::Schema;
        let schema = if is_schema {
            match evaluate_schema_config(config, diag) {
                Some(schema) => schema,
                None => continue,
            }
        } else {
            infer(config, file, &options.infer, diag)
        };
        if contains_unknown(&schema) {
            diag.log(
                "generate",
                &format!("config `{}` has parts of unknown type", config.key),
            );
        }
        entries.push(Entry {
            config,
            ident: sanitize_key(&config.key),
            type_name: type_name(&config.key),
            schema,
            is_schema,
        });
    }

    Ok(match options.target {
        Target::TypeScript => typescript_file(&entries, options),
        Target::Python => python_file(&entries, options),
    })
}

/// Evaluate a SCHEMA config's own schema text. Failure skips the entry with
/// a warning rather than failing the run.
fn evaluate_schema_config(config: &Config, diag: &dyn Diagnostics) -> Option<SchemaType> {
    for value in config.all_values() {
        let ConfigValue::Schema(payload) = value else {
            continue;
        };
        let outcome = secure_evaluate_schema(&payload.schema, &EvalOptions::default());
        if outcome.success {
            return outcome.schema;
        }
        diag.log(
            "generate",
            &format!(
                "schema `{}` failed to evaluate and is skipped: {}",
                config.key,
                outcome.error.unwrap_or_default()
            ),
        );
        return None;
    }
    diag.log(
        "generate",
        &format!("schema `{}` has no schema text and is skipped", config.key),
    );
    None
}

fn contains_unknown(t: &SchemaType) -> bool {
    match t {
        SchemaType::Unknown => true,
        SchemaType::Array(item) => contains_unknown(item),
        SchemaType::Object(fields) => fields.values().any(contains_unknown),
        SchemaType::Tuple(items) => items.iter().any(contains_unknown),
        SchemaType::Union(options) => options.iter().any(contains_unknown),
        SchemaType::Optional(inner) => contains_unknown(inner),
        SchemaType::Function { params, returns } => {
            contains_unknown(params) || contains_unknown(returns)
        }
        SchemaType::String
        | SchemaType::Number { .. }
        | SchemaType::Boolean
        | SchemaType::Null
        | SchemaType::Undefined
        | SchemaType::Any
        | SchemaType::Enum(_) => false,
    }
}

fn typescript_file(entries: &[Entry<'_>], options: &GenerateOptions) -> String {
    let needs_template =
        !options.raw_accessors && entries.iter().any(|e| contains_function(&e.schema));

    let mut out = String::from("// Code generated by confgen. DO NOT EDIT.\n");
    if needs_template {
        out.push_str("\nimport { renderTemplate } from \"./renderTemplate\";\n");
    }

    for entry in entries {
        out.push('\n');
        out.push_str(&format!(
            "export type {} = {};\n",
            entry.type_name,
            typescript::resolve_type(&entry.schema)
        ));
        if entry.is_schema {
            continue;
        }

        let key = quoted(&entry.config.key);
        let payload = format!("raw[{key}]");
        out.push('\n');
        match &entry.schema {
            // Template-valued configs hoist the parameter object into the
            // accessor signature and return the rendered string directly.
            SchemaType::Function { params, returns } if !options.raw_accessors => {
                let ret = typescript::resolve_type(returns);
                if params.is_empty_object() {
                    out.push_str(&format!(
                        "export function {}(raw: Record<string, any>): {ret} {{\n  \
                         return renderTemplate({payload} as string, {{}});\n}}\n",
                        entry.ident
                    ));
                } else {
                    // Params are optional at the call site; rendering with an
                    // empty context is valid.
                    out.push_str(&format!(
                        "export function {}(raw: Record<string, any>, params?: {}): {ret} {{\n  \
                         return renderTemplate({payload} as string, params ?? {{}});\n}}\n",
                        entry.ident,
                        typescript::resolve_type(params)
                    ));
                }
            }
            schema => {
                let body = if options.raw_accessors {
                    typescript::render_raw(&payload, schema)
                } else {
                    typescript::render_accessor(&payload, schema)
                };
                out.push_str(&format!(
                    "export function {}(raw: Record<string, any>): {} {{\n  return {body};\n}}\n",
                    entry.ident, entry.type_name
                ));
            }
        }
    }
    out
}

fn python_file(entries: &[Entry<'_>], options: &GenerateOptions) -> String {
    let needs_template =
        !options.raw_accessors && entries.iter().any(|e| contains_function(&e.schema));

    let mut registry = python::ModelRegistry::new();
    let mut aliases: Vec<String> = Vec::new();
    let mut methods: Vec<String> = Vec::new();

    for entry in entries {
        if entry.is_schema {
            // Object schemas become a named model directly; anything else is
            // re-exported as a typing alias.
            if entry.schema.as_object().is_some() {
                python::resolve_type(&entry.schema, &entry.config.key, &mut registry);
            } else {
                aliases.push(format!(
                    "{} = {}",
                    entry.type_name,
                    python::resolve_type(&entry.schema, &entry.config.key, &mut registry)
                ));
            }
            continue;
        }

        let key = quoted(&entry.config.key);
        let payload = format!("self._raw.get({key})");
        let method = match &entry.schema {
            SchemaType::Function { params, returns } if !options.raw_accessors => {
                let ret = python::resolve_type(returns, &entry.config.key, &mut registry);
                if params.is_empty_object() {
                    format!(
                        "    def {}(self) -> {ret}:\n        \
                         return render_template(cast(str, {payload}), {{}})",
                        entry.ident
                    )
                } else {
                    let params_ty =
                        python::resolve_type(params, &format!("{} params", entry.config.key), &mut registry);
                    format!(
                        "    def {}(self, params: Optional[{params_ty}] = None) -> {ret}:\n        \
                         return render_template(cast(str, {payload}), params or {{}})",
                        entry.ident
                    )
                }
            }
            schema => {
                let annotation = python::resolve_type(schema, &entry.config.key, &mut registry);
                let body = if options.raw_accessors {
                    format!("cast({annotation}, {payload})")
                } else {
                    python::render_accessor(&payload, schema, &entry.config.key, &mut registry)
                };
                format!(
                    "    def {}(self) -> {annotation}:\n        return {body}",
                    entry.ident
                )
            }
        };
        methods.push(method);
    }

    let mut out = String::from("# Code generated by confgen. DO NOT EDIT.\n\n");
    out.push_str(
        "from typing import Any, Callable, Dict, List, Literal, Optional, Tuple, Union, cast\n",
    );
    out.push_str("from typing_extensions import TypedDict\n");
    if needs_template {
        out.push_str("\nfrom .render_template import render_template\n");
    }

    if !registry.is_empty() {
        out.push('\n');
        out.push_str(&registry.render());
    }
    for alias in &aliases {
        out.push('\n');
        out.push_str(alias);
        out.push('\n');
    }

    out.push_str("\n\nclass ConfgenClient:\n");
    out.push_str("    def __init__(self, raw: Dict[str, Any]) -> None:\n");
    out.push_str("        self._raw = raw\n");
    for method in &methods {
        out.push('\n');
        out.push_str(method);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::{CollectingDiagnostics, NullDiagnostics};
    use crate::model::ConfigFile;

    fn manifest(source: &str) -> ConfigFile {
        ConfigFile::from_json(source).unwrap()
    }

    fn ts(file: &ConfigFile) -> String {
        generate(
            file,
            &GenerateOptions::new(Target::TypeScript),
            &NullDiagnostics,
        )
        .unwrap()
    }

    fn py(file: &ConfigFile) -> String {
        generate(file, &GenerateOptions::new(Target::Python), &NullDiagnostics).unwrap()
    }

    #[test]
    fn feature_flag_generates_boolean_accessor() {
        let file = manifest(
            r#"{ "configs": [ { "key": "feature.enabled", "configType": "FEATURE_FLAG",
                 "valueType": "BOOL", "rows": [ { "values": [ { "value": { "bool": true } } ] } ] } ] }"#,
        );
        let out = ts(&file);
        assert!(out.starts_with("// Code generated by confgen. DO NOT EDIT.\n"));
        assert!(out.contains("export type FeatureEnabled = boolean;"));
        assert!(out.contains(
            "export function featureEnabled(raw: Record<string, any>): FeatureEnabled {"
        ));
        assert!(out.contains(r#"return raw["feature.enabled"] as boolean;"#));
        assert!(!out.contains("renderTemplate"));
    }

    #[test]
    fn template_config_hoists_params_into_the_signature() {
        let file = manifest(
            r#"{ "configs": [ { "key": "greeting", "valueType": "STRING",
                 "rows": [ { "values": [ { "value": { "string": "Hello {{name}}!" } } ] } ] } ] }"#,
        );
        let out = ts(&file);
        assert!(out.contains("import { renderTemplate } from \"./renderTemplate\";"));
        assert!(out.contains("export type Greeting = (params: { name: string }) => string;"));
        // The params argument is optional; an empty context is a valid call.
        assert!(out.contains(
            "export function greeting(raw: Record<string, any>, params?: { name: string }): string {"
        ));
        assert!(out.contains(r#"return renderTemplate(raw["greeting"] as string, params ?? {});"#));
    }

    #[test]
    fn json_rows_merge_into_one_typed_accessor() {
        let file = manifest(
            r#"{ "configs": [ { "key": "limits", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "{\"max\":10}" } } } ] },
                { "values": [ { "value": { "json": { "json": "{\"max\":20,\"burst\":true}" } } } ] }
            ] } ] }"#,
        );
        let out = ts(&file);
        assert!(out.contains("export type Limits = { max: number; burst?: boolean };"));
        assert!(out.contains(r#"max: (raw["limits"] as any)?.["max"] as number"#));
    }

    #[test]
    fn zero_row_configs_are_skipped_silently() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "ghost", "valueType": "BOOL", "rows": [] },
                { "key": "real", "valueType": "INT", "rows": [ { "values": [ { "value": { "int": 1 } } ] } ] }
            ] }"#,
        );
        let out = ts(&file);
        assert!(!out.contains("ghost"));
        assert!(out.contains("export function real"));
    }

    #[test]
    fn entries_are_sorted_by_key() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "zeta", "valueType": "INT", "rows": [ { "values": [ { "value": { "int": 1 } } ] } ] },
                { "key": "alpha", "valueType": "INT", "rows": [ { "values": [ { "value": { "int": 2 } } ] } ] }
            ] }"#,
        );
        let out = ts(&file);
        assert!(out.find("alpha").unwrap() < out.find("zeta").unwrap());
    }

    #[test]
    fn identifier_collisions_fail_naming_both_keys() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "a.b", "valueType": "INT", "rows": [ { "values": [ { "value": { "int": 1 } } ] } ] },
                { "key": "a-b", "valueType": "INT", "rows": [ { "values": [ { "value": { "int": 2 } } ] } ] }
            ] }"#,
        );
        let err = generate(
            &file,
            &GenerateOptions::new(Target::TypeScript),
            &NullDiagnostics,
        )
        .unwrap_err();
        let GenerateError::IdentifierCollision {
            first_key,
            second_key,
            identifier,
        } = err
        else {
            panic!("expected collision");
        };
        assert_eq!(identifier, "aB");
        assert_eq!(first_key, "a-b");
        assert_eq!(second_key, "a.b");
    }

    #[test]
    fn schema_configs_are_reexported_as_named_types() {
        let file = manifest(
            r#"{ "configs": [ { "key": "user-schema", "configType": "SCHEMA", "rows": [
                { "values": [ { "value": { "schema": { "schema": "z.object({ id: z.number().int() })" } } } ] }
            ] } ] }"#,
        );
        let out = ts(&file);
        assert!(out.contains("export type UserSchema = { id: number };"));
        assert!(!out.contains("export function userSchema"));
    }

    #[test]
    fn broken_schema_config_is_skipped_with_warning() {
        let diag = CollectingDiagnostics::new();
        let file = manifest(
            r#"{ "configs": [ { "key": "bad-schema", "configType": "SCHEMA", "rows": [
                { "values": [ { "value": { "schema": { "schema": "eval('boom')" } } } ] }
            ] } ] }"#,
        );
        let out = generate(
            &file,
            &GenerateOptions::new(Target::TypeScript),
            &diag,
        )
        .unwrap();
        assert!(!out.contains("BadSchema"));
        assert!(diag.contains("bad-schema"));
    }

    #[test]
    fn raw_accessors_surface_a_single_assertion() {
        let file = manifest(
            r#"{ "configs": [ { "key": "limits", "valueType": "JSON", "rows": [
                { "values": [ { "value": { "json": { "json": "{\"max\":10}" } } } ] }
            ] } ] }"#,
        );
        let mut options = GenerateOptions::new(Target::TypeScript);
        options.raw_accessors = true;
        let out = generate(&file, &options, &NullDiagnostics).unwrap();
        assert!(out.contains(r#"return raw["limits"] as { max: number };"#));
    }

    #[test]
    fn python_client_wraps_the_raw_payload() {
        let file = manifest(
            r#"{ "configs": [
                { "key": "feature.enabled", "configType": "FEATURE_FLAG", "valueType": "BOOL",
                  "rows": [ { "values": [ { "value": { "bool": true } } ] } ] },
                { "key": "retries", "valueType": "INT",
                  "rows": [ { "values": [ { "value": { "int": 3 } } ] } ] }
            ] }"#,
        );
        let out = py(&file);
        assert!(out.starts_with("# Code generated by confgen. DO NOT EDIT.\n"));
        assert!(out.contains("class ConfgenClient:"));
        assert!(out.contains("    def __init__(self, raw: Dict[str, Any]) -> None:"));
        assert!(out.contains("    def featureEnabled(self) -> bool:"));
        assert!(out.contains(r#"return cast(bool, self._raw.get("feature.enabled"))"#));
        assert!(out.contains("    def retries(self) -> int:"));
        assert!(!out.contains("render_template"));
    }

    #[test]
    fn python_template_config_gets_a_params_model() {
        let file = manifest(
            r#"{ "configs": [ { "key": "greeting", "valueType": "STRING",
                 "rows": [ { "values": [ { "value": { "string": "Hello {{name}}!" } } ] } ] } ] }"#,
        );
        let out = py(&file);
        assert!(out.contains("from .render_template import render_template"));
        assert!(out.contains("class GreetingParams(TypedDict, total=False):"));
        assert!(out.contains("    name: str"));
        assert!(out.contains(
            "    def greeting(self, params: Optional[\"GreetingParams\"] = None) -> str:"
        ));
        assert!(out.contains(
            r#"return render_template(cast(str, self._raw.get("greeting")), params or {})"#
        ));
    }

    #[test]
    fn python_object_schema_becomes_a_model() {
        let file = manifest(
            r#"{ "configs": [ { "key": "user-schema", "configType": "SCHEMA", "rows": [
                { "values": [ { "value": { "schema": { "schema": "z.object({ id: z.number().int() })" } } } ] }
            ] } ] }"#,
        );
        let out = py(&file);
        assert!(out.contains("class UserSchema(TypedDict, total=False):"));
        assert!(out.contains("    id: int"));
    }
}
