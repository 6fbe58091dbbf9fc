// Error types for the Lightning framework

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Duplicate component: {0}")]
    DuplicateComponent(String),

    #[error("Component '{component}' refers to unknown type '{type_name}'")]
    UnknownType { component: String, type_name: String },

    #[error("Component not found: {0}")]
    ComponentNotFound(String),

    #[error("Unsatisfied dependency '{slot}' of component '{component}': no component provides {required_type}")]
    UnsatisfiedDependency {
        component: String,
        slot: String,
        required_type: String,
    },

    #[error("Ambiguous dependency '{slot}' of component '{component}': {required_type} is provided by {}", .candidates.join(", "))]
    AmbiguousDependency {
        component: String,
        slot: String,
        required_type: String,
        candidates: Vec<String>,
    },

    #[error("Circular dependency detected: {}", .chain.join(" -> "))]
    CircularDependency { chain: Vec<String> },

    #[error("Failed to instantiate component '{component}': {reason}")]
    Instantiation { component: String, reason: String },

    #[error("Bean not found: {component}")]
    BeanNotFound {
        component: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid controller: '{0}' does not implement Controller")]
    InvalidController(String),

    #[error("View not found: {0}")]
    ViewNotFound(String),

    #[error("Duplicate route: {method} {url}")]
    DuplicateRoute { method: String, url: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Component scan failed: {0}")]
    Scan(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get the HTTP status code for this error (always 500)
    pub fn status_code(&self) -> u16 {
        500
    }

    /// Whether this error means the application is misconfigured and must not
    /// accept traffic, as opposed to a single failed request.
    pub fn is_startup_error(&self) -> bool {
        matches!(
            self,
            Error::DuplicateComponent(_)
                | Error::UnknownType { .. }
                | Error::DuplicateRoute { .. }
                | Error::Configuration(_)
                | Error::Scan(_)
        )
    }

    /// Get the root cause when this error wraps a resolution failure
    pub fn root_cause(&self) -> &Error {
        match self {
            Error::BeanNotFound { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
