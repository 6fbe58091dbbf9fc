//! Error types for Handlebars view forwarding

use thiserror::Error;

/// Result type for Handlebars operations
pub type Result<T> = std::result::Result<T, HandlebarsError>;

#[derive(Error, Debug)]
pub enum HandlebarsError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template rendering error: {0}")]
    RenderError(String),

    #[error("Template parsing error: {0}")]
    ParseError(String),

    /// IO error when loading templates
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<handlebars::RenderError> for HandlebarsError {
    fn from(err: handlebars::RenderError) -> Self {
        HandlebarsError::RenderError(err.to_string())
    }
}

impl From<handlebars::TemplateError> for HandlebarsError {
    fn from(err: handlebars::TemplateError) -> Self {
        HandlebarsError::ParseError(err.to_string())
    }
}

/// Every forwarding failure is a view that could not be produced
impl From<HandlebarsError> for lightning_core::Error {
    fn from(err: HandlebarsError) -> Self {
        match err {
            HandlebarsError::TemplateNotFound(name) => lightning_core::Error::ViewNotFound(name),
            HandlebarsError::ConfigError(reason) => lightning_core::Error::Configuration(reason),
            other => lightning_core::Error::ViewNotFound(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_core_error() {
        let err: lightning_core::Error = HandlebarsError::TemplateNotFound("users".to_string()).into();
        assert!(matches!(err, lightning_core::Error::ViewNotFound(ref name) if name == "users"));

        let err: lightning_core::Error = HandlebarsError::RenderError("boom".to_string()).into();
        assert!(matches!(err, lightning_core::Error::ViewNotFound(_)));

        let err: lightning_core::Error = HandlebarsError::ConfigError("no dir".to_string()).into();
        assert!(err.is_startup_error());
    }
}
