// HTTP request and response types

use serde_json::Value;
use std::collections::HashMap;

/// HTTP request wrapper
///
/// `attributes` is the forwarding context: values a controller puts into its
/// model are copied here before the view is rendered.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
    pub query_params: HashMap<String, String>,
    pub attributes: HashMap<String, Value>,
}

impl HttpRequest {
    pub fn new(method: String, path: String) -> Self {
        let query_params = path
            .split_once('?')
            .map(|(_, query)| parse_query_string(query))
            .unwrap_or_default();

        Self {
            method,
            path,
            headers: HashMap::new(),
            body: Vec::new(),
            query_params,
            attributes: HashMap::new(),
        }
    }

    /// The request path without its query string
    pub fn uri_path(&self) -> &str {
        self.path
            .split_once('?')
            .map(|(path, _)| path)
            .unwrap_or(&self.path)
    }

    /// Get a query parameter by name
    pub fn query(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Get a header by name (case-insensitive)
    pub fn header(&self, name: &str) -> Option<&String> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    /// Set a forwarding attribute
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Get a forwarding attribute
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }
}

/// HTTP response wrapper
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn internal_server_error() -> Self {
        Self::new(500)
    }

    /// HTML response with the given body
    pub fn html(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header(
                "Content-Type".to_string(),
                "text/html; charset=utf-8".to_string(),
            )
            .with_body(body.into().into_bytes())
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.headers.insert(key, value);
        self
    }
}

/// Parse a query string into a map of parameters
fn parse_query_string(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut split = part.splitn(2, '=');
            let key = split.next()?;
            let value = split.next().unwrap_or("");
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}
