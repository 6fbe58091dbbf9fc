// Core library for the Lightning MVC framework
// Dependency injection container, route table, front dispatcher and HTTP server

pub mod application;
pub mod container;
pub mod descriptor;
pub mod dispatcher;
pub mod error;
pub mod http;
pub mod logging;
pub mod model;
pub mod routing;
pub mod scan;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use application::*;
pub use container::*;
pub use descriptor::*;
pub use dispatcher::*;
pub use error::*;
pub use http::*;
pub use model::*;
pub use routing::*;
pub use scan::*;
pub use traits::*;
pub use types::{ComponentAnnotation, ComponentType, Injections, Instance, TypeBuilder, TypeRegistry};

// Used by `register_type!`
pub use inventory;
