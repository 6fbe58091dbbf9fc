// Routing table mapping (url, method) to handler components

use crate::logging::{debug, trace};
use crate::{Error, HttpMethod};

/// A rule mapping an HTTP method and exact URL to a handler component
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub url_pattern: String,
    pub method: HttpMethod,
    pub handler: String,
}

impl RouteEntry {
    pub fn new(url_pattern: impl Into<String>, method: HttpMethod, handler: impl Into<String>) -> Self {
        Self {
            url_pattern: url_pattern.into(),
            method,
            handler: handler.into(),
        }
    }
}

/// Ordered, immutable route table.
///
/// Matching is exact: no path parameters, no wildcards. The first entry in
/// registration order whose normalized pattern and method match wins.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build the table from entries in authored order.
    ///
    /// Patterns are normalized the same way request paths are. Two entries
    /// with the same normalized pattern and method fail with `DuplicateRoute`.
    pub fn build<I>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = RouteEntry>,
    {
        let mut routes: Vec<RouteEntry> = Vec::new();

        for mut entry in entries {
            entry.url_pattern = normalize_path(&entry.url_pattern);

            if routes
                .iter()
                .any(|route| route.url_pattern == entry.url_pattern && route.method == entry.method)
            {
                return Err(Error::DuplicateRoute {
                    method: entry.method.to_string(),
                    url: entry.url_pattern,
                });
            }

            debug!(
                method = %entry.method,
                url = %entry.url_pattern,
                handler = %entry.handler,
                "Route registered"
            );
            routes.push(entry);
        }

        debug!(route_count = routes.len(), "Route table built");
        Ok(Self { routes })
    }

    /// Find the handler entry for a request URL and method
    pub fn match_route(&self, url: &str, method: HttpMethod) -> Option<&RouteEntry> {
        let path = normalize_path(url);
        let matched = self
            .routes
            .iter()
            .find(|route| route.method == method && route.url_pattern == path);

        trace!(
            method = %method,
            path = %path,
            matched = matched.is_some(),
            "Route lookup"
        );
        matched
    }

    /// Entries in registration order
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Strip the query string and trailing slashes. The root path stays "/".
pub fn normalize_path(url: &str) -> String {
    let path = url.split_once('?').map_or(url, |(path, _)| path);
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}
