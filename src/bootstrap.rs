//! Application assembly.
//!
//! [`Bootstrap`] turns [`Settings`] into a ready [`Application`]:
//!
//! 1. component declarations are read and registered with the container;
//! 2. when enabled, component discovery starts on a background task;
//! 3. route declarations are read into the route table;
//! 4. discovery is awaited and the annotated components it found are
//!    registered;
//! 5. the Handlebars forwarder is loaded from the view root.
//!
//! Any failure aborts startup before a single request is served.
//!
//! ```no_run
//! use lightning::Bootstrap;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), lightning::core::Error> {
//! let app = Bootstrap::from_file(Some(Path::new("lightning.toml")))?
//!     .build()
//!     .await?;
//! app.listen(3000).await
//! # }
//! ```

use lightning_config::{ComponentFile, RouteFile, Settings};
use lightning_core::logging::{LogConfig, LogLevel};
use lightning_core::{
    Application, ComponentScanner, ComponentType, Container, Dispatcher, Error, RouteTable,
    TypeRegistry,
};
use lightning_handlebars::{HandlebarsConfig, HandlebarsForwarder};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Builds an [`Application`] from settings and declaration files
pub struct Bootstrap {
    settings: Settings,
    base_dir: PathBuf,
    types: TypeRegistry,
}

impl Bootstrap {
    /// Start from `settings` with every type submitted through
    /// `register_type!`. Relative paths resolve against the working directory.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            base_dir: PathBuf::from("."),
            types: TypeRegistry::collect(),
        }
    }

    /// Load settings from `path` (if given) and the environment.
    /// Relative paths resolve against the settings file's directory.
    pub fn from_file(path: Option<&Path>) -> Result<Self, Error> {
        let settings = Settings::load(path)?;
        let base_dir = path
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(settings).with_base_dir(base_dir))
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Add a type on top of the submitted ones
    pub fn with_type(mut self, component_type: ComponentType) -> Self {
        self.types.register(component_type);
        self
    }

    /// Add every type of `types` on top of the submitted ones
    pub fn with_types(mut self, types: &TypeRegistry) -> Self {
        self.types.merge(types);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Logging configuration at the configured level
    pub fn log_config(&self) -> LogConfig {
        let level = LogLevel::from_str(&self.settings.log_level).unwrap_or(LogLevel::Info);
        LogConfig::new().level(level)
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    /// Assemble the application. Must be awaited inside a Tokio runtime.
    pub async fn build(self) -> Result<Application, Error> {
        let container = Container::new(self.types.clone());

        let components_path = self.resolve_path(&self.settings.components_file);
        if components_path.is_file() {
            let file = ComponentFile::load(&components_path)?;
            debug!(
                path = %components_path.display(),
                components = file.len(),
                "Component declarations loaded"
            );
            container.register(file.into_descriptors())?;
        } else if self.settings.enable_component_scan {
            debug!(path = %components_path.display(), "No component declarations, relying on scan");
        } else {
            warn!(path = %components_path.display(), "Component declaration file not found");
        }

        let scan = self
            .settings
            .enable_component_scan
            .then(|| ComponentScanner::start(&self.types, &self.settings.scan_package));

        let routes_path = self.resolve_path(&self.settings.routes_file);
        let routes = RouteTable::build(RouteFile::load(&routes_path)?.into_entries())?;

        if let Some(scan) = scan {
            let found = scan.collect().await?;
            let descriptors = ComponentScanner::descriptors(&self.types, &found);
            debug!(
                package = %self.settings.scan_package,
                found = found.len(),
                annotated = descriptors.len(),
                "Scanned components"
            );
            container.register(descriptors)?;
        }

        let views = HandlebarsConfig::new(self.resolve_path(&self.settings.view_root))
            .with_extension(self.settings.view_extension.as_str());
        let forwarder = HandlebarsForwarder::new(views)?;

        info!(
            components = container.len(),
            routes = routes.len(),
            "Application assembled"
        );
        Ok(Application::new(Dispatcher::new(
            container,
            routes,
            Arc::new(forwarder),
        )))
    }

    /// Assemble the application and serve it on the configured port
    pub async fn run(self) -> Result<(), Error> {
        let port = self.settings.port;
        self.build().await?.listen(port).await
    }
}

impl std::fmt::Debug for Bootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bootstrap")
            .field("settings", &self.settings)
            .field("base_dir", &self.base_dir)
            .field("types", &self.types)
            .finish()
    }
}
