//! Handlebars template engine wrapper

use crate::{Result, config::HandlebarsConfig, error::HandlebarsError};
use handlebars::Handlebars;
use parking_lot::RwLock;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Handlebars templates loaded from the view root
#[derive(Clone)]
pub struct HandlebarsEngine {
    handlebars: Arc<RwLock<Handlebars<'static>>>,
    config: HandlebarsConfig,
}

#[derive(Clone, Copy)]
enum Registration {
    Template,
    Partial,
}

impl HandlebarsEngine {
    /// Create the engine and load every template under the view root
    pub fn new(config: HandlebarsConfig) -> Result<Self> {
        let handlebars = load_registry(&config)?;
        Ok(Self {
            handlebars: Arc::new(RwLock::new(handlebars)),
            config,
        })
    }

    /// Template name for a view identifier: leading slashes and the
    /// template extension are optional
    pub fn template_name<'a>(&self, view: &'a str) -> &'a str {
        let view = view.trim_start_matches('/');
        view.strip_suffix(self.config.template_extension.as_str())
            .unwrap_or(view)
    }

    /// Render the template for `view` with data
    pub fn render<T: Serialize>(&self, view: &str, data: &T) -> Result<String> {
        if self.config.dev_mode {
            self.reload_templates()?;
        }

        let name = self.template_name(view);
        let handlebars = self.handlebars.read();
        if !handlebars.has_template(name) {
            return Err(HandlebarsError::TemplateNotFound(name.to_string()));
        }
        handlebars.render(name, data).map_err(HandlebarsError::from)
    }

    /// Render a template string (not from file)
    pub fn render_template<T: Serialize>(&self, template_str: &str, data: &T) -> Result<String> {
        self.handlebars
            .read()
            .render_template(template_str, data)
            .map_err(HandlebarsError::from)
    }

    /// Register a template from string
    pub fn register_template(&self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .write()
            .register_template_string(name, template)
            .map_err(HandlebarsError::from)
    }

    pub fn has_template(&self, view: &str) -> bool {
        self.handlebars.read().has_template(self.template_name(view))
    }

    /// Registered template names, sorted
    pub fn get_templates(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlebars.read().get_templates().keys().cloned().collect();
        names.sort();
        names
    }

    /// Reload all templates from disk.
    ///
    /// The new registry is built without holding the lock and swapped in
    /// whole, so concurrent renders see either the old or the new set.
    pub fn reload_templates(&self) -> Result<()> {
        let fresh = load_registry(&self.config)?;
        *self.handlebars.write() = fresh;
        Ok(())
    }

    pub fn config(&self) -> &HandlebarsConfig {
        &self.config
    }
}

/// A registry holding every template and partial found under the
/// configured directories
fn load_registry(config: &HandlebarsConfig) -> Result<Handlebars<'static>> {
    if !config.template_dir.is_dir() {
        return Err(HandlebarsError::ConfigError(format!(
            "View root not found: {}",
            config.template_dir.display()
        )));
    }

    let mut handlebars = Handlebars::new();
    handlebars.set_strict_mode(config.strict_mode);
    if !config.escape_html {
        handlebars.register_escape_fn(handlebars::no_escape);
    }

    let extension = config.template_extension.trim_start_matches('.');
    let root = &config.template_dir;
    load_dir(&mut handlebars, extension, root, root, Registration::Template)?;

    if let Some(partials_dir) = &config.partials_dir {
        if partials_dir.is_dir() {
            load_dir(&mut handlebars, extension, partials_dir, partials_dir, Registration::Partial)?;
        }
    }

    debug!(
        view_root = %config.template_dir.display(),
        templates = handlebars.get_templates().len(),
        "Templates loaded"
    );
    Ok(handlebars)
}

/// Register every file with `extension` below `dir`, named by its path
/// relative to `root` without the extension
fn load_dir(
    handlebars: &mut Handlebars<'static>,
    extension: &str,
    root: &Path,
    dir: &Path,
    registration: Registration,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();

        if path.is_dir() {
            load_dir(handlebars, extension, root, &path, registration)?;
            continue;
        }
        if path.extension().is_none_or(|ext| ext != extension) {
            continue;
        }

        let name = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .with_extension("")
            .to_string_lossy()
            .replace('\\', "/");
        let content = fs::read_to_string(&path)?;

        trace!(template = %name, path = %path.display(), "Registering template");
        match registration {
            Registration::Template => handlebars.register_template_string(&name, content)?,
            Registration::Partial => handlebars.register_partial(&name, content)?,
        }
    }

    Ok(())
}
