//! Scroll configuration errors

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::ScrollConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML could not be parsed into a config
    #[error("Failed to parse scroll config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config could not be written as TOML
    #[error("Failed to serialize scroll config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A tuning value is out of range
    #[error("Invalid scroll config field `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Result type for config operations
pub type Result<T> = std::result::Result<T, ConfigError>;
