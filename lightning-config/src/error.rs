// Error types for configuration management

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration key not found: {0}")]
    KeyNotFound(String),

    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid component declaration in {source_name}: {reason}")]
    InvalidComponent { source_name: String, reason: String },

    #[error("Invalid route declaration in {source_name}: {reason}")]
    InvalidRoute { source_name: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Environment variable error: {0}")]
    EnvError(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for lightning_core::Error {
    fn from(err: ConfigError) -> Self {
        lightning_core::Error::Configuration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_converts_to_startup_error() {
        let err: lightning_core::Error = ConfigError::InvalidRoute {
            source_name: "routes.toml".to_string(),
            reason: "route #1 is missing 'url'".to_string(),
        }
        .into();

        assert!(err.is_startup_error());
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid route declaration in routes.toml: route #1 is missing 'url'"
        );
    }
}
