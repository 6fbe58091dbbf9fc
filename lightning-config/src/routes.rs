// Route declaration files

use crate::{ConfigError, ConfigLoader, Result};
use lightning_core::{HttpMethod, RouteEntry};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFile {
    #[serde(default)]
    route: Vec<RawRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRoute {
    url: Option<String>,
    method: Option<String>,
    controller: Option<String>,
}

/// Parsed route declarations, in file order
///
/// ```toml
/// [[route]]
/// url = "/users"
/// method = "GET"
/// controller = "userController"
/// ```
#[derive(Debug, Clone, Default)]
pub struct RouteFile {
    entries: Vec<RouteEntry>,
}

impl RouteFile {
    /// Load a TOML or JSON route file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        Self::from_value(value, &path.display().to_string())
    }

    pub fn from_value(value: Value, source_name: &str) -> Result<Self> {
        let invalid = |reason: String| ConfigError::InvalidRoute {
            source_name: source_name.to_string(),
            reason,
        };

        let raw: RawFile = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

        let mut entries = Vec::with_capacity(raw.route.len());
        for (index, route) in raw.route.into_iter().enumerate() {
            let position = index + 1;
            let field = |value: Option<String>, name: &str| {
                value
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty())
                    .ok_or_else(|| invalid(format!("route #{} is missing '{}'", position, name)))
            };

            let url = field(route.url, "url")?;
            let method_name = field(route.method, "method")?;
            let controller = field(route.controller, "controller")?;

            if !url.starts_with('/') {
                return Err(invalid(format!(
                    "route #{} url '{}' must start with '/'",
                    position, url
                )));
            }
            let method = HttpMethod::from_str(&method_name).ok_or_else(|| {
                invalid(format!(
                    "route #{} has unknown method '{}'",
                    position, method_name
                ))
            })?;

            debug!(method = %method, url = %url, controller = %controller, "Route declared");
            entries.push(RouteEntry::new(url, method, controller));
        }

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<RouteEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileFormat;

    fn parse(toml: &str) -> Result<RouteFile> {
        let value = ConfigLoader::new(FileFormat::Toml).parse(toml)?;
        RouteFile::from_value(value, "routes.toml")
    }

    #[test]
    fn test_parse_routes_in_order() {
        let file = parse(
            r#"
            [[route]]
            url = "/a"
            method = "get"
            controller = "h1"

            [[route]]
            url = "/a"
            method = "POST"
            controller = "h2"
            "#,
        )
        .unwrap();

        assert_eq!(
            file.entries(),
            &[
                RouteEntry::new("/a", HttpMethod::GET, "h1"),
                RouteEntry::new("/a", HttpMethod::POST, "h2"),
            ]
        );
    }

    #[test]
    fn test_unknown_method() {
        let err = parse(
            r#"
            [[route]]
            url = "/a"
            method = "FETCH"
            controller = "h1"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown method 'FETCH'"));
    }

    #[test]
    fn test_missing_controller() {
        let err = parse(
            r#"
            [[route]]
            url = "/a"
            method = "GET"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("route #1 is missing 'controller'"));
    }

    #[test]
    fn test_relative_url() {
        let err = parse(
            r#"
            [[route]]
            url = "users"
            method = "GET"
            controller = "h1"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoute { .. }));
    }
}
