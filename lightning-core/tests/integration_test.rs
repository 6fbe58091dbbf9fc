// Dispatcher tests running requests through routing, resolution and forwarding

use lightning_core::{
    ComponentDescriptor, ComponentType, Container, Dispatch, Dispatcher, Error, HttpMethod,
    HttpRequest, HttpResponse, Model, RouteEntry, RouteTable, TypeRegistry, ViewForwarder,
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

/// Records every forward and renders "view:<name>"
#[derive(Default)]
struct RecordingForwarder {
    forwards: Mutex<Vec<(String, HashMap<String, Value>)>>,
}

impl ViewForwarder for RecordingForwarder {
    fn forward(&self, view: &str, request: &HttpRequest) -> Result<HttpResponse, Error> {
        if view == "missing" {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no such template",
            )));
        }
        self.forwards
            .lock()
            .push((view.to_string(), request.attributes.clone()));
        Ok(HttpResponse::html(format!("view:{}", view)))
    }
}

struct Counter;

impl lightning_core::Controller for Counter {
    fn handle(&self, _request: &HttpRequest, model: &mut Model) -> Option<String> {
        model.set("x", 1);
        Some("counter".to_string())
    }
}

struct Silent;

impl lightning_core::Controller for Silent {
    fn handle(&self, _request: &HttpRequest, _model: &mut Model) -> Option<String> {
        None
    }
}

struct Broken;

impl lightning_core::Controller for Broken {
    fn handle(&self, _request: &HttpRequest, _model: &mut Model) -> Option<String> {
        Some("missing".to_string())
    }
}

struct NotAController;

fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with(ComponentType::define("test.Counter", |_| Ok(Counter)).controller().build())
        .with(ComponentType::define("test.Silent", |_| Ok(Silent)).controller().build())
        .with(ComponentType::define("test.Broken", |_| Ok(Broken)).controller().build())
        .with(ComponentType::define("test.Plain", |_| Ok(NotAController)).build())
}

fn dispatcher(forwarder: Arc<RecordingForwarder>) -> Dispatcher {
    let container = Container::new(registry());
    container
        .register(vec![
            ComponentDescriptor::new("counter", "test.Counter"),
            ComponentDescriptor::new("silent", "test.Silent"),
            ComponentDescriptor::new("broken", "test.Broken"),
            ComponentDescriptor::new("plain", "test.Plain"),
            ComponentDescriptor::new("needy", "test.Counter").with_dependency("svc", "test.Nothing"),
        ])
        .unwrap();

    let routes = RouteTable::build(vec![
        RouteEntry::new("/count", HttpMethod::GET, "counter"),
        RouteEntry::new("/silent", HttpMethod::GET, "silent"),
        RouteEntry::new("/broken", HttpMethod::GET, "broken"),
        RouteEntry::new("/plain", HttpMethod::GET, "plain"),
        RouteEntry::new("/needy", HttpMethod::GET, "needy"),
        RouteEntry::new("/ghost", HttpMethod::GET, "ghost"),
    ])
    .unwrap();

    Dispatcher::new(container, routes, forwarder)
}

fn get(path: &str) -> HttpRequest {
    HttpRequest::new("GET".to_string(), path.to_string())
}

#[test]
fn test_model_is_propagated_to_view() {
    let forwarder = Arc::new(RecordingForwarder::default());
    let dispatcher = dispatcher(forwarder.clone());

    let mut request = get("/count");
    let outcome = dispatcher.dispatch(&mut request).unwrap();

    match outcome {
        Dispatch::Forwarded(response) => assert_eq!(response.body, b"view:counter".to_vec()),
        Dispatch::Unmatched => panic!("expected a forward"),
    }
    assert_eq!(request.attribute("x"), Some(&json!(1)));

    let forwards = forwarder.forwards.lock();
    assert_eq!(forwards.len(), 1);
    assert_eq!(forwards[0].0, "counter");
    assert_eq!(forwards[0].1.get("x"), Some(&json!(1)));
}

#[test]
fn test_unmatched_route_is_silent() {
    let forwarder = Arc::new(RecordingForwarder::default());
    let dispatcher = dispatcher(forwarder.clone());

    let mut request = get("/nowhere");
    assert!(dispatcher.dispatch(&mut request).unwrap().is_unmatched());

    let mut request = HttpRequest::new("POST".to_string(), "/count".to_string());
    assert!(dispatcher.dispatch(&mut request).unwrap().is_unmatched());

    assert!(forwarder.forwards.lock().is_empty());
}

#[test]
fn test_no_view_is_view_not_found() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));
    let err = dispatcher.dispatch(&mut get("/silent")).unwrap_err();
    assert!(matches!(err, Error::ViewNotFound(_)));
}

#[test]
fn test_failed_forward_is_view_not_found() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));
    let err = dispatcher.dispatch(&mut get("/broken")).unwrap_err();

    match err {
        Error::ViewNotFound(message) => assert!(message.starts_with("missing")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_handler_without_capability() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));
    let err = dispatcher.dispatch(&mut get("/plain")).unwrap_err();
    assert!(matches!(err, Error::InvalidController(ref name) if name == "plain"));
}

#[test]
fn test_unknown_handler_is_bean_not_found() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));
    let err = dispatcher.dispatch(&mut get("/ghost")).unwrap_err();

    assert!(matches!(err, Error::BeanNotFound { ref component, .. } if component == "ghost"));
    assert!(matches!(err.root_cause(), Error::ComponentNotFound(_)));
    assert_eq!(err.status_code(), 500);
}

#[test]
fn test_resolution_failure_is_bean_not_found() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));
    let err = dispatcher.dispatch(&mut get("/needy")).unwrap_err();

    assert!(matches!(err, Error::BeanNotFound { .. }));
    assert!(matches!(
        err.root_cause(),
        Error::UnsatisfiedDependency { .. }
    ));
}

#[test]
fn test_handler_is_resolved_once() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));

    dispatcher.dispatch(&mut get("/count")).unwrap();
    let first = dispatcher.container().resolve("counter").unwrap();
    dispatcher.dispatch(&mut get("/count/")).unwrap();
    let second = dispatcher.container().resolve("counter").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn test_application_handle() {
    let dispatcher = dispatcher(Arc::new(RecordingForwarder::default()));
    let app = lightning_core::Application::new(dispatcher);

    let ok = app.handle(get("/count")).await;
    assert_eq!(ok.status, 200);
    assert_eq!(ok.body, b"view:counter".to_vec());

    let unmatched = app.handle(get("/nowhere")).await;
    assert_eq!(unmatched.status, 200);
    assert!(unmatched.body.is_empty());

    let failed = app.handle(get("/plain")).await;
    assert_eq!(failed.status, 500);
    assert!(String::from_utf8(failed.body).unwrap().contains("Invalid controller"));
}
