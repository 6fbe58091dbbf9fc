// Core traits for the Lightning framework

use crate::{Error, HttpRequest, HttpResponse, Model};

/// Trait for HTTP controllers
///
/// A controller fills the request model and names the view that should
/// render it. Returning `None` is a defect reported as `ViewNotFound`.
pub trait Controller: Send + Sync + 'static {
    fn handle(&self, request: &HttpRequest, model: &mut Model) -> Option<String>;
}

/// Server-side forward of a request to a view
pub trait ViewForwarder: Send + Sync + 'static {
    /// Render `view` for `request`, whose attributes carry the model
    fn forward(&self, view: &str, request: &HttpRequest) -> Result<HttpResponse, Error>;
}

/// HTTP methods
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
    DELETE,
    PATCH,
    HEAD,
    OPTIONS,
}

impl HttpMethod {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "GET" => Some(HttpMethod::GET),
            "POST" => Some(HttpMethod::POST),
            "PUT" => Some(HttpMethod::PUT),
            "DELETE" => Some(HttpMethod::DELETE),
            "PATCH" => Some(HttpMethod::PATCH),
            "HEAD" => Some(HttpMethod::HEAD),
            "OPTIONS" => Some(HttpMethod::OPTIONS),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::GET => "GET",
            HttpMethod::POST => "POST",
            HttpMethod::PUT => "PUT",
            HttpMethod::DELETE => "DELETE",
            HttpMethod::PATCH => "PATCH",
            HttpMethod::HEAD => "HEAD",
            HttpMethod::OPTIONS => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
