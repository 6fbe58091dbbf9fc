// Lightning - a small MVC web framework for Rust
//
// Components are declared in configuration or discovered by package, wired
// by type through the container, and reached through the front dispatcher,
// which routes requests to controllers and forwards their models to views.

pub mod bootstrap;

pub use bootstrap::Bootstrap;

// Re-export the framework crates
pub use lightning_config as config;
pub use lightning_core as core;
pub use lightning_handlebars as handlebars;

pub use lightning_core::register_type;

// Prelude for common imports
pub mod prelude {
    pub use crate::Bootstrap;
    pub use lightning_config::Settings;
    pub use lightning_core::logging::{LogConfig, LogFormat, LogLevel};
    pub use lightning_core::{
        Application, ComponentDescriptor, ComponentType, Container, Controller, Dispatch,
        Dispatcher, Error, HttpMethod, HttpRequest, HttpResponse, Injections, Model, RouteEntry,
        RouteTable, TypeRegistry, ViewForwarder, register_type,
    };
    pub use lightning_handlebars::{HandlebarsConfig, HandlebarsForwarder};
}
