//! Handlebars view forwarding for Lightning MVC
//!
//! Controllers name a view; the dispatcher copies the controller's model
//! into the request attributes and forwards here. The forwarder renders the
//! template of that name from the view root with the attributes as data.
//!
//! ## Example
//!
//! ```no_run
//! use lightning_handlebars::{HandlebarsConfig, HandlebarsForwarder};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HandlebarsConfig::new("views").with_extension("hbs");
//! let forwarder = HandlebarsForwarder::new(config)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Template data
//!
//! Every request attribute is available at the top level. The request
//! itself is exposed as `request`:
//!
//! ```handlebars
//! <h1>{{title}}</h1>
//! <p>{{request.method}} {{request.path}}</p>
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::HandlebarsConfig;
pub use engine::HandlebarsEngine;
pub use error::{HandlebarsError, Result};

use lightning_core::{HttpRequest, HttpResponse, ViewForwarder};
use serde_json::{Map, Value, json};
use tracing::debug;

/// Renders forwarded requests with Handlebars templates
#[derive(Clone)]
pub struct HandlebarsForwarder {
    engine: HandlebarsEngine,
}

impl HandlebarsForwarder {
    pub fn new(config: HandlebarsConfig) -> Result<Self> {
        Ok(Self {
            engine: HandlebarsEngine::new(config)?,
        })
    }

    pub fn from_engine(engine: HandlebarsEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &HandlebarsEngine {
        &self.engine
    }

    /// Render `view` for `request` into an HTML string
    pub fn render(&self, view: &str, request: &HttpRequest) -> Result<String> {
        self.engine.render(view, &template_data(request))
    }
}

impl ViewForwarder for HandlebarsForwarder {
    fn forward(
        &self,
        view: &str,
        request: &HttpRequest,
    ) -> std::result::Result<HttpResponse, lightning_core::Error> {
        let html = self.render(view, request)?;
        debug!(view, bytes = html.len(), "View rendered");
        Ok(HttpResponse::html(html))
    }
}

/// Request attributes at the top level plus a `request` summary.
/// An attribute named `request` wins over the summary.
fn template_data(request: &HttpRequest) -> Value {
    let mut data = Map::new();
    data.insert(
        "request".to_string(),
        json!({
            "method": request.method,
            "path": request.uri_path(),
            "query": request.query_params,
        }),
    );
    for (key, value) in &request.attributes {
        data.insert(key.clone(), value.clone());
    }
    Value::Object(data)
}
