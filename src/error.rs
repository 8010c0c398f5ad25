//! Error types

use thiserror::Error;

/// Errors raised while loading or validating a drawer configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("color `{field}` has channels outside [0, 1]")]
    ColorOutOfRange { field: &'static str },

    #[error("`{field}` must be finite and >= 0 (got {value})")]
    NegativeWidth { field: &'static str, value: f32 },
}
