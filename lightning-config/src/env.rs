// Environment variable loading

use crate::{ConfigError, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::env;

/// Prefix of the variables read by [`Settings`](crate::Settings), e.g. `LIGHTNING_PORT`
pub const DEFAULT_PREFIX: &str = "LIGHTNING";

/// Environment variable loader
///
/// With a prefix, only `PREFIX_*` variables are read and the prefix is
/// stripped: `LIGHTNING_VIEW_ROOT` becomes `view_root`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load all matching environment variables, keys lowercased
    pub fn load(&self) -> Result<HashMap<String, String>> {
        Ok(env::vars()
            .filter_map(|(key, value)| self.strip(&key).map(|key| (key, value)))
            .collect())
    }

    fn strip(&self, key: &str) -> Option<String> {
        match &self.prefix {
            Some(prefix) => key
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|rest| !rest.is_empty())
                .map(str::to_lowercase),
            None => Some(key.to_lowercase()),
        }
    }

    /// Load a specific environment variable
    pub fn load_var(&self, key: &str) -> Result<String> {
        let full_key = match &self.prefix {
            Some(prefix) => format!("{}_{}", prefix, key.to_uppercase()),
            None => key.to_uppercase(),
        };

        env::var(&full_key).map_err(ConfigError::EnvError)
    }

    /// Load with default value
    pub fn load_var_or(&self, key: &str, default: &str) -> String {
        self.load_var(key).unwrap_or_else(|_| default.to_string())
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(Some(DEFAULT_PREFIX.to_string()))
    }
}

/// Interpret a raw variable: booleans and integers keep their type so they
/// deserialize into typed settings, anything else stays a string.
pub fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
    }
}
