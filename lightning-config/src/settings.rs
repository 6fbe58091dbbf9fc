// Application settings

use crate::{ConfigManager, ConfigValidator, Result, Validate, env::DEFAULT_PREFIX};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Framework settings.
///
/// Read from an optional settings file, then from `LIGHTNING_*`
/// environment variables, which take precedence. Missing keys keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Component declaration file
    pub components_file: String,
    /// Route declaration file
    pub routes_file: String,
    /// Register annotated types found under `scan_package`
    pub enable_component_scan: bool,
    pub scan_package: String,
    /// Directory holding view templates
    pub view_root: String,
    pub view_extension: String,
    pub port: u16,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            components_file: "config/lightning-config.toml".to_string(),
            routes_file: "config/lightning-url-map.toml".to_string(),
            enable_component_scan: false,
            scan_package: "app".to_string(),
            view_root: "views".to_string(),
            view_extension: "hbs".to_string(),
            port: 3000,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path` (if given) and the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let manager = ConfigManager::with_prefix(DEFAULT_PREFIX.to_string());
        if let Some(path) = path {
            manager.load_file_auto(path)?;
        }
        manager.load_env()?;

        let settings: Settings = manager.load_validated()?;
        debug!(?settings, "Settings loaded");
        Ok(settings)
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::not_empty(&self.components_file, "components_file")?;
        ConfigValidator::not_empty(&self.routes_file, "routes_file")?;
        ConfigValidator::not_empty(&self.view_root, "view_root")?;
        ConfigValidator::not_empty(&self.view_extension, "view_extension")?;
        if self.enable_component_scan {
            ConfigValidator::not_empty(&self.scan_package, "scan_package")?;
        }
        ConfigValidator::is_port(self.port, "port")?;
        ConfigValidator::one_of(
            &self.log_level.to_lowercase().as_str(),
            &["trace", "debug", "info", "warn", "error"],
            "log_level",
        )
    }
}
