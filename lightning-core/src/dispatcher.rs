//! Front dispatcher.
//!
//! Turns one inbound request into a routed, resolved, invoked and forwarded
//! response. The sequence is linear and runs synchronously on the calling
//! thread:
//!
//! 1. **Receive**: read the method and path.
//! 2. **Route**: look up the route table; no match ends the request.
//! 3. **Resolve**: obtain the handler from the container.
//! 4. **TypeCheck**: the handler must expose the controller capability.
//! 5. **Invoke**: call it with a fresh, empty [`Model`].
//! 6. **Propagate**: copy the model into the request attributes.
//! 7. **Forward**: hand the request to the view forwarder.

use crate::logging::{debug, info, trace, warn};
use crate::{Container, Error, HttpMethod, HttpRequest, HttpResponse, Model, RouteTable, ViewForwarder};
use std::sync::Arc;

/// Outcome of a dispatched request
#[derive(Debug)]
pub enum Dispatch {
    /// The handler ran and its view was rendered
    Forwarded(HttpResponse),
    /// No route matched; nothing is sent back but an empty response
    Unmatched,
}

impl Dispatch {
    pub fn is_unmatched(&self) -> bool {
        matches!(self, Dispatch::Unmatched)
    }

    /// Convert to a response, using an empty 200 for unmatched requests
    pub fn into_response(self) -> HttpResponse {
        match self {
            Dispatch::Forwarded(response) => response,
            Dispatch::Unmatched => HttpResponse::ok(),
        }
    }
}

/// Front controller tying the route table, container and view forwarder together
#[derive(Clone)]
pub struct Dispatcher {
    container: Container,
    routes: Arc<RouteTable>,
    forwarder: Arc<dyn ViewForwarder>,
}

impl Dispatcher {
    pub fn new(container: Container, routes: RouteTable, forwarder: Arc<dyn ViewForwarder>) -> Self {
        debug!(route_count = routes.len(), "Creating front dispatcher");
        Self {
            container,
            routes: Arc::new(routes),
            forwarder,
        }
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Dispatch one request.
    ///
    /// Resolution failures surface as `BeanNotFound`, a handler without the
    /// controller capability as `InvalidController`, and a missing view name
    /// or failed forward as `ViewNotFound`. Nothing is retried.
    pub fn dispatch(&self, request: &mut HttpRequest) -> Result<Dispatch, Error> {
        // Receive
        trace!(method = %request.method, path = %request.path, "Received request");

        // Route
        let Some(method) = HttpMethod::from_str(&request.method) else {
            info!(method = %request.method, path = %request.path, "Unsupported method, no route");
            return Ok(Dispatch::Unmatched);
        };
        let Some(route) = self.routes.match_route(request.uri_path(), method) else {
            info!(method = %method, path = %request.uri_path(), "No route matched");
            return Ok(Dispatch::Unmatched);
        };
        debug!(
            method = %method,
            url = %route.url_pattern,
            handler = %route.handler,
            "Route matched"
        );

        // Resolve
        let component = self.container.resolve(&route.handler).map_err(|source| {
            warn!(handler = %route.handler, error = %source, "Handler resolution failed");
            Error::BeanNotFound {
                component: route.handler.clone(),
                source: Box::new(source),
            }
        })?;

        // TypeCheck
        let controller = component
            .as_controller()
            .ok_or_else(|| Error::InvalidController(route.handler.clone()))?;

        // Invoke
        let mut model = Model::new();
        let view = controller.handle(request, &mut model);
        trace!(
            handler = %route.handler,
            view = ?view,
            attributes = model.len(),
            "Handler invoked"
        );

        // Propagate
        for (key, value) in model {
            request.set_attribute(key, value);
        }

        // Forward
        let view = view
            .filter(|view| !view.is_empty())
            .ok_or_else(|| Error::ViewNotFound(format!("{} returned no view", route.handler)))?;

        let response = self.forwarder.forward(&view, request).map_err(|err| match err {
            Error::ViewNotFound(_) => err,
            other => Error::ViewNotFound(format!("{}: {}", view, other)),
        })?;

        debug!(handler = %route.handler, view = %view, status = response.status, "Forwarded to view");
        Ok(Dispatch::Forwarded(response))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("container", &self.container)
            .field("routes", &self.routes)
            .finish()
    }
}
