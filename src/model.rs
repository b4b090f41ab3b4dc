//! Wire model for a downloaded config manifest.
//!
//! Field names and the tagged-union shape of [`ConfigValue`] match the
//! download collaborator's JSON byte-for-byte; they are the crate's sole
//! input contract. The manifest is read-only for the span of a generation
//! run.

use serde::{Deserialize, Serialize};

use crate::error::GenerateError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub configs: Vec<Config>,
}

impl ConfigFile {
    /// Parse a manifest document, naming the offending JSON path on failure.
    pub fn from_json(source: &str) -> Result<Self, GenerateError> {
        let mut de = serde_json::Deserializer::from_str(source);
        serde_path_to_error::deserialize(&mut de)
            .map_err(|e| GenerateError::ManifestParse(e.to_string()))
    }

    /// Resolve a `schemaKey` reference to its SCHEMA config, if any.
    pub fn resolve_schema(&self, schema_key: &str) -> Option<&Config> {
        self.configs
            .iter()
            .find(|c| c.config_type == ConfigType::Schema && c.key == schema_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub key: String,
    #[serde(default)]
    pub config_type: ConfigType,
    #[serde(default)]
    pub value_type: ValueType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_key: Option<String>,
    #[serde(default)]
    pub send_to_client_sdk: bool,
    #[serde(default)]
    pub rows: Vec<ConfigRow>,
}

impl Config {
    /// Every value across every row, in order. Rule branches inside a row are
    /// all candidate instances of the same logical type.
    pub fn all_values(&self) -> impl Iterator<Item = &ConfigValue> {
        self.rows
            .iter()
            .flat_map(|row| row.values.iter())
            .filter_map(|rv| rv.value.as_ref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfigType {
    #[default]
    Config,
    FeatureFlag,
    Schema,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    String,
    Bool,
    Int,
    Double,
    Duration,
    Json,
    LogLevel,
    StringList,
    /// Unrecognized or absent valueType. Inference degrades to `Any` so a
    /// newer server cannot block generation for every other config.
    #[default]
    #[serde(other)]
    NotSetValueType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRow {
    #[serde(default)]
    pub values: Vec<ConfigRowValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigRowValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ConfigValue>,
}

/// One concrete value. Exactly one field is set per instance on the wire,
/// which is an externally tagged enum in serde terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Int(i64),
    Double(f64),
    Json(JsonPayload),
    LogLevel(String),
    StringList(StringListPayload),
    Duration(DurationPayload),
    Schema(SchemaPayload),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonPayload {
    pub json: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringListPayload {
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationPayload {
    /// ISO-8601 duration text, e.g. `PT30S`.
    pub definition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaPayload {
    /// Source text for the sandboxed schema evaluator.
    pub schema: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_round_trips_wire_shapes() {
        let source = r#"{
            "configs": [
                {
                    "key": "feature.enabled",
                    "configType": "FEATURE_FLAG",
                    "valueType": "BOOL",
                    "rows": [ { "values": [ { "value": { "bool": true } } ] } ]
                },
                {
                    "key": "greeting",
                    "configType": "CONFIG",
                    "valueType": "STRING",
                    "schemaKey": "greeting-schema",
                    "rows": [ { "values": [ { "value": { "string": "Hello {{name}}!" } } ] } ]
                },
                {
                    "key": "greeting-schema",
                    "configType": "SCHEMA",
                    "valueType": "STRING",
                    "rows": [ { "values": [ { "value": { "schema": { "schema": "z.string()", "schemaType": "ZOD" } } } ] } ]
                }
            ]
        }"#;
        let file = ConfigFile::from_json(source).unwrap();
        assert_eq!(file.configs.len(), 3);
        assert_eq!(file.configs[0].config_type, ConfigType::FeatureFlag);
        assert_eq!(file.configs[0].value_type, ValueType::Bool);
        assert!(matches!(
            file.configs[0].all_values().next(),
            Some(ConfigValue::Bool(true))
        ));
        assert_eq!(
            file.configs[1].schema_key.as_deref(),
            Some("greeting-schema")
        );
        let schema = file.resolve_schema("greeting-schema").unwrap();
        assert!(matches!(
            schema.all_values().next(),
            Some(ConfigValue::Schema(s)) if s.schema == "z.string()"
        ));
    }

    #[test]
    fn unknown_value_type_degrades_to_not_set() {
        let source = r#"{
            "configs": [
                { "key": "mystery", "valueType": "HOLOGRAM", "rows": [] }
            ]
        }"#;
        let file = ConfigFile::from_json(source).unwrap();
        assert_eq!(file.configs[0].value_type, ValueType::NotSetValueType);
        assert_eq!(file.configs[0].config_type, ConfigType::Config);
    }

    #[test]
    fn parse_error_names_the_json_path() {
        let source = r#"{ "configs": [ { "key": 7 } ] }"#;
        let err = ConfigFile::from_json(source).unwrap_err();
        assert!(err.to_string().contains("configs[0].key"));
    }

    #[test]
    fn missing_row_value_is_tolerated() {
        let source = r#"{
            "configs": [
                { "key": "a", "valueType": "INT", "rows": [ { "values": [ {} ] } ] }
            ]
        }"#;
        let file = ConfigFile::from_json(source).unwrap();
        assert_eq!(file.configs[0].all_values().count(), 0);
    }
}
