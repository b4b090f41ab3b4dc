use thiserror::Error;

/// Fatal generation failures. Everything recoverable (bad JSON values, broken
/// explicit schemas) is reported through the diagnostics channel instead.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// Two distinct config keys sanitize to the same accessor identifier.
    /// Silently emitting one of them would shadow the other's data, so the
    /// whole run fails and names both keys.
    #[error(
        "config keys `{first_key}` and `{second_key}` both sanitize to accessor name `{identifier}`"
    )]
    IdentifierCollision {
        first_key: String,
        second_key: String,
        identifier: String,
    },

    #[error("failed to parse config manifest: {0}")]
    ManifestParse(String),
}
