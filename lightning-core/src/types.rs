//! Type registry.
//!
//! Component descriptors refer to implementation types by qualified name.
//! The registry maps those names to a factory plus the list of type names an
//! instance can be injected as (itself and every interface it provides).
//! Types are registered explicitly or submitted at build time with
//! [`register_type!`](crate::register_type) and gathered by
//! [`TypeRegistry::collect`].
//!
//! ```
//! use lightning_core::{ComponentType, TypeRegistry};
//! use std::sync::Arc;
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String {
//!         "hello".to_string()
//!     }
//! }
//!
//! let mut types = TypeRegistry::new();
//! types.register(
//!     ComponentType::define("app.English", |_| Ok(English))
//!         .provides::<dyn Greeter>("app.Greeter", |english| english)
//!         .build(),
//! );
//!
//! let english = types.get("app.English").unwrap();
//! assert!(english.is_assignable_to("app.Greeter"));
//! assert!(english.is_assignable_to("app.English"));
//! ```

use crate::logging::{debug, warn};
use crate::{Controller, Dependency, Error};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::marker::PhantomData;
use std::sync::Arc;

/// A type-erased component object
pub type Instance = Arc<dyn Any + Send + Sync>;

type Factory = Arc<dyn Fn(&Injections) -> Result<Instance, Error> + Send + Sync>;
type Upcast = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;
type ControllerCast = Arc<dyn Fn(&Instance) -> Option<Arc<dyn Controller>> + Send + Sync>;

/// Component metadata carried by a type, picked up by the component scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentAnnotation {
    /// Component name registered for the annotated type
    pub name: String,
    /// Slots to inject, in declaration order
    pub dependencies: Vec<Dependency>,
}

/// A registered implementation type
#[derive(Clone)]
pub struct ComponentType {
    name: String,
    factory: Factory,
    provides: Vec<(String, Upcast)>,
    controller: Option<ControllerCast>,
    annotation: Option<ComponentAnnotation>,
}

impl ComponentType {
    /// Start defining a type named `name` built by `factory`
    pub fn define<T, F>(name: impl Into<String>, factory: F) -> TypeBuilder<T>
    where
        T: Send + Sync + 'static,
        F: Fn(&Injections) -> Result<T, Error> + Send + Sync + 'static,
    {
        let name = name.into();
        let identity: Upcast = Arc::new(|instance: &Instance| {
            instance
                .clone()
                .downcast::<T>()
                .ok()
                .map(|concrete| Arc::new(concrete) as Instance)
        });

        TypeBuilder {
            provides: vec![(name.clone(), identity)],
            name,
            factory: Arc::new(move |injections: &Injections| {
                factory(injections).map(|value| Arc::new(value) as Instance)
            }),
            controller: None,
            annotation: None,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether an instance of this type satisfies a slot requiring `required_type`
    pub fn is_assignable_to(&self, required_type: &str) -> bool {
        self.provides.iter().any(|(name, _)| name == required_type)
    }

    /// Type names this type can be injected as, itself first
    pub fn provided_types(&self) -> impl Iterator<Item = &str> {
        self.provides.iter().map(|(name, _)| name.as_str())
    }

    pub fn is_controller(&self) -> bool {
        self.controller.is_some()
    }

    pub fn annotation(&self) -> Option<&ComponentAnnotation> {
        self.annotation.as_ref()
    }

    pub(crate) fn instantiate(&self, injections: &Injections) -> Result<Instance, Error> {
        (self.factory)(injections)
    }

    /// Wrap `instance` as the value injected into a `required_type` slot
    pub(crate) fn inject_as(&self, required_type: &str, instance: &Instance) -> Option<Instance> {
        self.provides
            .iter()
            .find(|(name, _)| name == required_type)
            .and_then(|(_, upcast)| upcast(instance))
    }

    pub(crate) fn as_controller(&self, instance: &Instance) -> Option<Arc<dyn Controller>> {
        self.controller.as_ref().and_then(|cast| cast(instance))
    }
}

impl std::fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentType")
            .field("name", &self.name)
            .field("provides", &self.provided_types().collect::<Vec<_>>())
            .field("controller", &self.is_controller())
            .field("annotation", &self.annotation)
            .finish()
    }
}

/// Builder returned by [`ComponentType::define`]
pub struct TypeBuilder<T> {
    name: String,
    factory: Factory,
    provides: Vec<(String, Upcast)>,
    controller: Option<ControllerCast>,
    annotation: Option<ComponentAnnotation>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> TypeBuilder<T> {
    /// Declare that `T` can be injected where `interface` is required
    pub fn provides<I>(mut self, interface: impl Into<String>, upcast: fn(Arc<T>) -> Arc<I>) -> Self
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let upcast: Upcast = Arc::new(move |instance: &Instance| {
            instance
                .clone()
                .downcast::<T>()
                .ok()
                .map(|concrete| Arc::new(upcast(concrete)) as Instance)
        });
        self.provides.push((interface.into(), upcast));
        self
    }

    /// Annotate the type as a component named `name` for the scanner
    pub fn component(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match self.annotation.as_mut() {
            Some(annotation) => annotation.name = name,
            None => {
                self.annotation = Some(ComponentAnnotation {
                    name,
                    dependencies: Vec::new(),
                })
            }
        }
        self
    }

    /// Annotate an injected slot. Only meaningful together with `component`.
    pub fn inject(mut self, slot: impl Into<String>, required_type: impl Into<String>) -> Self {
        let dependency = Dependency {
            slot: slot.into(),
            required_type: required_type.into(),
        };
        let annotation = self.annotation.get_or_insert_with(|| ComponentAnnotation {
            name: String::new(),
            dependencies: Vec::new(),
        });
        annotation.dependencies.retain(|dep| dep.slot != dependency.slot);
        annotation.dependencies.push(dependency);
        self
    }

    pub fn build(self) -> ComponentType {
        let annotation = self.annotation.filter(|annotation| !annotation.name.is_empty());
        ComponentType {
            name: self.name,
            factory: self.factory,
            provides: self.provides,
            controller: self.controller,
            annotation,
        }
    }
}

impl<T: Controller> TypeBuilder<T> {
    /// Expose the request-handling capability of `T` to the dispatcher
    pub fn controller(mut self) -> Self {
        self.controller = Some(Arc::new(|instance: &Instance| {
            instance
                .clone()
                .downcast::<T>()
                .ok()
                .map(|controller| controller as Arc<dyn Controller>)
        }));
        self
    }
}

/// Resolved dependency values handed to a factory, keyed by slot
pub struct Injections {
    component: String,
    values: HashMap<String, Instance>,
}

impl Injections {
    pub(crate) fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            values: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, slot: impl Into<String>, value: Instance) {
        self.values.insert(slot.into(), value);
    }

    /// Name of the component being built
    pub fn component(&self) -> &str {
        &self.component
    }

    pub fn contains(&self, slot: &str) -> bool {
        self.values.contains_key(slot)
    }

    /// Get the value injected into `slot` as `Arc<I>`.
    ///
    /// `I` is either the concrete type of the dependency or an interface it
    /// was registered to provide.
    pub fn get<I>(&self, slot: &str) -> Result<Arc<I>, Error>
    where
        I: ?Sized + Send + Sync + 'static,
    {
        let value = self.values.get(slot).ok_or_else(|| Error::Instantiation {
            component: self.component.clone(),
            reason: format!("slot '{}' was not injected", slot),
        })?;

        value
            .downcast_ref::<Arc<I>>()
            .cloned()
            .ok_or_else(|| Error::Instantiation {
                component: self.component.clone(),
                reason: format!(
                    "slot '{}' does not hold a {}",
                    slot,
                    std::any::type_name::<I>()
                ),
            })
    }
}

/// Build-time type submission collected via inventory
pub struct TypeEntry {
    build: fn() -> ComponentType,
}

inventory::collect!(TypeEntry);

impl TypeEntry {
    pub const fn new(build: fn() -> ComponentType) -> Self {
        Self { build }
    }

    pub fn build(&self) -> ComponentType {
        (self.build)()
    }
}

/// Submit a type to the build-time registry.
///
/// Takes a `fn() -> ComponentType`; every submitted type is returned by
/// [`TypeRegistry::collect`].
#[macro_export]
macro_rules! register_type {
    ($build:path) => {
        $crate::inventory::submit! {
            $crate::types::TypeEntry::new($build)
        }
    };
}

/// Registry of implementation types keyed by qualified name
#[derive(Clone, Default)]
pub struct TypeRegistry {
    types: BTreeMap<String, Arc<ComponentType>>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gather every type submitted with `register_type!`
    pub fn collect() -> Self {
        let mut registry = Self::new();
        for entry in inventory::iter::<TypeEntry>.into_iter() {
            registry.register(entry.build());
        }
        debug!(type_count = registry.len(), "Collected submitted component types");
        registry
    }

    /// Register a type, replacing any previous type with the same name
    pub fn register(&mut self, component_type: ComponentType) -> &mut Self {
        let name = component_type.name().to_string();
        if self
            .types
            .insert(name.clone(), Arc::new(component_type))
            .is_some()
        {
            warn!(type_name = %name, "Component type registered twice, keeping the latest");
        }
        self
    }

    /// Builder-style `register`
    pub fn with(mut self, component_type: ComponentType) -> Self {
        self.register(component_type);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ComponentType>> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Registered type names in lexical order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Copy every type of `other` into this registry
    pub fn merge(&mut self, other: &TypeRegistry) {
        for (name, component_type) in &other.types {
            self.types.insert(name.clone(), Arc::clone(component_type));
        }
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.types.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HttpRequest, Model};

    trait Store: Send + Sync {
        fn label(&self) -> &'static str;
    }

    #[derive(Debug)]
    struct MemoryStore;

    impl Store for MemoryStore {
        fn label(&self) -> &'static str {
            "memory"
        }
    }

    struct Page;

    impl Controller for Page {
        fn handle(&self, _request: &HttpRequest, _model: &mut Model) -> Option<String> {
            Some("page".to_string())
        }
    }

    fn memory_store() -> ComponentType {
        ComponentType::define("test.MemoryStore", |_| Ok(MemoryStore))
            .provides::<dyn Store>("test.Store", |store| store)
            .build()
    }

    #[test]
    fn test_assignability() {
        let store = memory_store();
        assert!(store.is_assignable_to("test.MemoryStore"));
        assert!(store.is_assignable_to("test.Store"));
        assert!(!store.is_assignable_to("test.Other"));
        assert_eq!(
            store.provided_types().collect::<Vec<_>>(),
            vec!["test.MemoryStore", "test.Store"]
        );
    }

    #[test]
    fn test_inject_as_interface() {
        let store = memory_store();
        let instance = store.instantiate(&Injections::new("store")).unwrap();

        let mut injections = Injections::new("consumer");
        injections.insert("store", store.inject_as("test.Store", &instance).unwrap());

        let resolved = injections.get::<dyn Store>("store").unwrap();
        assert_eq!(resolved.label(), "memory");
    }

    #[test]
    fn test_inject_as_concrete() {
        let store = memory_store();
        let instance = store.instantiate(&Injections::new("store")).unwrap();

        let mut injections = Injections::new("consumer");
        injections.insert(
            "store",
            store.inject_as("test.MemoryStore", &instance).unwrap(),
        );

        assert!(injections.get::<MemoryStore>("store").is_ok());
        assert!(injections.get::<dyn Store>("store").is_err());
    }

    #[test]
    fn test_missing_slot_is_instantiation_error() {
        let injections = Injections::new("consumer");
        let err = injections.get::<MemoryStore>("store").unwrap_err();
        assert!(matches!(err, Error::Instantiation { .. }));
    }

    #[test]
    fn test_controller_capability() {
        let page = ComponentType::define("test.Page", |_| Ok(Page))
            .controller()
            .build();
        let instance = page.instantiate(&Injections::new("page")).unwrap();

        assert!(page.is_controller());
        assert!(page.as_controller(&instance).is_some());
        assert!(!memory_store().is_controller());
    }

    #[test]
    fn test_annotation_requires_name() {
        let unnamed = ComponentType::define("test.Page", |_| Ok(Page))
            .inject("store", "test.Store")
            .build();
        assert!(unnamed.annotation().is_none());

        let named = ComponentType::define("test.Page", |_| Ok(Page))
            .inject("store", "test.Store")
            .component("page")
            .build();
        let annotation = named.annotation().unwrap();
        assert_eq!(annotation.name, "page");
        assert_eq!(annotation.dependencies.len(), 1);
    }

    #[test]
    fn test_registry_names_sorted() {
        let registry = TypeRegistry::new()
            .with(ComponentType::define("b.Type", |_| Ok(Page)).build())
            .with(ComponentType::define("a.Type", |_| Ok(Page)).build());

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a.Type", "b.Type"]);
        assert!(registry.contains("a.Type"));
        assert_eq!(registry.len(), 2);
    }
}
