// Container registration and introspection tests

use lightning_core::{ComponentDescriptor, ComponentType, Container, Error, TypeRegistry};

struct Plain;

fn container() -> Container {
    Container::new(
        TypeRegistry::new()
            .with(ComponentType::define("test.Plain", |_| Ok(Plain)).build())
            .with(ComponentType::define("test.Other", |_| Ok(Plain)).build()),
    )
}

fn descriptors() -> Vec<ComponentDescriptor> {
    vec![
        ComponentDescriptor::new("first", "test.Plain"),
        ComponentDescriptor::new("second", "test.Other").with_dependency("plain", "test.Plain"),
    ]
}

#[test]
fn test_register_keeps_order() {
    let container = container();
    container.register(descriptors()).unwrap();

    assert_eq!(container.len(), 2);
    assert_eq!(container.names(), vec!["first", "second"]);
    assert!(container.contains("first"));
    assert!(!container.contains("third"));
}

#[test]
fn test_register_same_set_twice_fails() {
    let container = container();
    container.register(descriptors()).unwrap();

    let err = container.register(descriptors()).unwrap_err();
    assert!(matches!(err, Error::DuplicateComponent(ref name) if name == "first"));
    assert_eq!(container.len(), 2);

    // Deterministic: the same failure every time
    let err = container.register(descriptors()).unwrap_err();
    assert!(matches!(err, Error::DuplicateComponent(ref name) if name == "first"));
}

#[test]
fn test_duplicate_within_batch() {
    let container = container();
    let err = container
        .register(vec![
            ComponentDescriptor::new("same", "test.Plain"),
            ComponentDescriptor::new("same", "test.Other"),
        ])
        .unwrap_err();

    assert!(matches!(err, Error::DuplicateComponent(_)));
    assert!(err.is_startup_error());
    assert!(container.is_empty());
}

#[test]
fn test_unknown_type() {
    let container = container();
    let err = container
        .register(vec![ComponentDescriptor::new("ghost", "test.Missing")])
        .unwrap_err();

    match err {
        Error::UnknownType {
            component,
            type_name,
        } => {
            assert_eq!(component, "ghost");
            assert_eq!(type_name, "test.Missing");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_get_dependencies() {
    let container = container();
    container.register(descriptors()).unwrap();

    let deps = container.get_dependencies("second").unwrap();
    assert_eq!(deps.len(), 1);
    assert_eq!(deps.get("plain"), Some(&"test.Plain".to_string()));

    assert!(container.get_dependencies("first").unwrap().is_empty());
    assert!(matches!(
        container.get_dependencies("missing"),
        Err(Error::ComponentNotFound(_))
    ));

    // Introspection never builds anything
    assert!(!container.is_resolved("second"));
}

#[test]
fn test_resolve_unknown_name() {
    let container = container();
    assert!(matches!(
        container.resolve("nobody"),
        Err(Error::ComponentNotFound(ref name)) if name == "nobody"
    ));
}

#[test]
fn test_clones_share_state() {
    let container = container();
    let clone = container.clone();
    container.register(descriptors()).unwrap();

    let a = container.resolve("first").unwrap();
    let b = clone.resolve("first").unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
    assert_eq!(clone.len(), 2);
}

#[test]
fn test_factory_error_surfaces() {
    let container = Container::new(TypeRegistry::new().with(
        ComponentType::define("test.Broken", |injections| -> Result<Plain, Error> {
            Err(Error::Instantiation {
                component: injections.component().to_string(),
                reason: "no database".to_string(),
            })
        })
        .build(),
    ));
    container
        .register(vec![ComponentDescriptor::new("broken", "test.Broken")])
        .unwrap();

    let err = container.resolve("broken").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to instantiate component 'broken': no database"
    );
    assert!(!container.is_resolved("broken"));
}
