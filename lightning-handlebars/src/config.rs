//! Configuration for the Handlebars view forwarder

use std::path::PathBuf;

/// Where views live and how they are rendered
#[derive(Debug, Clone)]
pub struct HandlebarsConfig {
    /// View root; template names are paths relative to it
    pub template_dir: PathBuf,

    /// Template file extension (default: ".hbs")
    pub template_extension: String,

    /// Re-read templates from disk before every render
    pub dev_mode: bool,

    /// Error on missing variables
    pub strict_mode: bool,

    /// Extra directory registered as partials
    pub partials_dir: Option<PathBuf>,

    /// Enable HTML escaping (default: true)
    pub escape_html: bool,
}

impl HandlebarsConfig {
    pub fn new(template_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_dir: template_dir.into(),
            template_extension: ".hbs".to_string(),
            dev_mode: false,
            strict_mode: false,
            partials_dir: None,
            escape_html: true,
        }
    }

    /// Set template file extension, with or without the leading dot
    pub fn with_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.template_extension = if ext.starts_with('.') {
            ext
        } else {
            format!(".{}", ext)
        };
        self
    }

    pub fn with_dev_mode(mut self, enable: bool) -> Self {
        self.dev_mode = enable;
        self
    }

    pub fn with_strict_mode(mut self, enable: bool) -> Self {
        self.strict_mode = enable;
        self
    }

    pub fn with_partials_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.partials_dir = Some(dir.into());
        self
    }

    pub fn with_escape_html(mut self, enable: bool) -> Self {
        self.escape_html = enable;
        self
    }
}

impl Default for HandlebarsConfig {
    fn default() -> Self {
        Self::new("views")
    }
}
