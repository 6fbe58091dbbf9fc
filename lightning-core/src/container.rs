// Dependency injection container

use crate::logging::{debug, trace};
use crate::types::{Injections, Instance};
use crate::{ComponentDescriptor, ComponentType, Controller, Error, TypeRegistry};
use parking_lot::{ReentrantMutex, RwLock};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// A resolved singleton: the constructed object plus the components injected
/// into its slots.
pub struct Component {
    descriptor: Arc<ComponentDescriptor>,
    component_type: Arc<ComponentType>,
    object: Instance,
    dependencies: Vec<(String, Arc<Component>)>,
}

impl Component {
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &ComponentDescriptor {
        &self.descriptor
    }

    /// The constructed object as its concrete type
    pub fn downcast<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.object.clone().downcast::<T>().ok()
    }

    /// The request-handling capability, if the type declared one
    pub fn as_controller(&self) -> Option<Arc<dyn Controller>> {
        self.component_type.as_controller(&self.object)
    }

    /// The component injected into `slot`
    pub fn dependency(&self, slot: &str) -> Option<&Arc<Component>> {
        self.dependencies
            .iter()
            .find(|(name, _)| name == slot)
            .map(|(_, component)| component)
    }

    /// Injected components in slot declaration order
    pub fn dependencies(&self) -> impl Iterator<Item = (&str, &Arc<Component>)> {
        self.dependencies
            .iter()
            .map(|(slot, component)| (slot.as_str(), component))
    }
}

impl std::fmt::Debug for Component {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name())
            .field("type", &self.descriptor.type_name())
            .field(
                "dependencies",
                &self
                    .dependencies
                    .iter()
                    .map(|(slot, component)| (slot.as_str(), component.name()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[derive(Default)]
struct Descriptors {
    ordered: Vec<Arc<ComponentDescriptor>>,
    index: HashMap<String, usize>,
}

impl Descriptors {
    fn get(&self, name: &str) -> Option<&Arc<ComponentDescriptor>> {
        self.index.get(name).map(|&position| &self.ordered[position])
    }
}

/// Bookkeeping of the resolution in progress
#[derive(Default)]
struct BuildState {
    /// Names on the current resolution path, outermost first
    chain: Vec<String>,
    /// Components built so far; cached only once the outermost resolve succeeds
    pending: HashMap<String, Arc<Component>>,
}

type Build = RefCell<BuildState>;

/// Marks a component as in progress for the lifetime of the guard
struct ResolutionGuard<'a> {
    state: &'a Build,
}

impl<'a> ResolutionGuard<'a> {
    fn enter(state: &'a Build, name: &str) -> Result<Self, Error> {
        let mut current = state.borrow_mut();
        if current.chain.iter().any(|entry| entry == name) {
            let mut cycle = current.chain.clone();
            cycle.push(name.to_string());
            return Err(Error::CircularDependency { chain: cycle });
        }
        current.chain.push(name.to_string());
        Ok(Self { state })
    }
}

impl Drop for ResolutionGuard<'_> {
    fn drop(&mut self) {
        self.state.borrow_mut().chain.pop();
    }
}

struct Inner {
    types: TypeRegistry,
    descriptors: RwLock<Descriptors>,
    instances: RwLock<HashMap<String, Arc<Component>>>,
    // Serializes the build path; re-entrant so a build can resolve its dependencies
    building: ReentrantMutex<Build>,
}

/// The dependency injection container
///
/// Holds component descriptors in registration order and builds each
/// component at most once, on first `resolve`. Clones share the same state.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Container {
    pub fn new(types: TypeRegistry) -> Self {
        debug!(type_count = types.len(), "Creating new DI container");
        Self {
            inner: Arc::new(Inner {
                types,
                descriptors: RwLock::new(Descriptors::default()),
                instances: RwLock::new(HashMap::new()),
                building: ReentrantMutex::new(RefCell::new(BuildState::default())),
            }),
        }
    }

    pub fn types(&self) -> &TypeRegistry {
        &self.inner.types
    }

    /// Register a batch of descriptors.
    ///
    /// The whole batch is checked first: a name already registered or
    /// repeated within the batch fails with `DuplicateComponent`, a type
    /// missing from the type registry with `UnknownType`. Nothing is
    /// registered when any check fails.
    pub fn register<I>(&self, descriptors: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = ComponentDescriptor>,
    {
        let batch: Vec<ComponentDescriptor> = descriptors.into_iter().collect();

        trace!(count = batch.len(), "Acquiring write lock for registration");
        let mut registered = self.inner.descriptors.write();

        for (position, descriptor) in batch.iter().enumerate() {
            let repeated = batch[..position]
                .iter()
                .any(|earlier| earlier.name() == descriptor.name());
            if repeated || registered.index.contains_key(descriptor.name()) {
                return Err(Error::DuplicateComponent(descriptor.name().to_string()));
            }
            if !self.inner.types.contains(descriptor.type_name()) {
                return Err(Error::UnknownType {
                    component: descriptor.name().to_string(),
                    type_name: descriptor.type_name().to_string(),
                });
            }
        }

        let count = batch.len();
        for descriptor in batch {
            debug!(component = %descriptor, "Component registered in DI container");
            let position = registered.ordered.len();
            registered
                .index
                .insert(descriptor.name().to_string(), position);
            registered.ordered.push(Arc::new(descriptor));
        }

        debug!(
            registered = count,
            total = registered.ordered.len(),
            "Registration complete"
        );
        Ok(())
    }

    /// Resolve a component by name, building it and its dependencies on
    /// first use. Repeated calls return the same instance.
    pub fn resolve(&self, name: &str) -> Result<Arc<Component>, Error> {
        if let Some(component) = self.cached(name) {
            trace!(component = name, "Resolved from instance cache");
            return Ok(component);
        }

        let state = self.inner.building.lock();
        let outermost = state.borrow().chain.is_empty();
        let result = self.build(name, &state);

        if outermost {
            let pending = std::mem::take(&mut state.borrow_mut().pending);
            match &result {
                Ok(_) => {
                    debug!(component = name, built = pending.len(), "Resolution committed to instance cache");
                    self.inner.instances.write().extend(pending);
                }
                Err(err) => {
                    debug!(component = name, discarded = pending.len(), error = %err, "Resolution failed, nothing cached");
                }
            }
        }

        result
    }

    fn cached(&self, name: &str) -> Option<Arc<Component>> {
        self.inner.instances.read().get(name).cloned()
    }

    /// A cached component or one already built by the running resolution
    fn built(&self, name: &str, state: &Build) -> Option<Arc<Component>> {
        self.cached(name)
            .or_else(|| state.borrow().pending.get(name).cloned())
    }

    fn build(&self, name: &str, state: &Build) -> Result<Arc<Component>, Error> {
        // Another thread may have finished this component while we waited
        if let Some(component) = self.built(name, state) {
            return Ok(component);
        }

        let _guard = ResolutionGuard::enter(state, name)?;

        let descriptor = self
            .inner
            .descriptors
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::ComponentNotFound(name.to_string()))?;
        let component_type = self
            .inner
            .types
            .get(descriptor.type_name())
            .cloned()
            .ok_or_else(|| Error::UnknownType {
                component: name.to_string(),
                type_name: descriptor.type_name().to_string(),
            })?;

        debug!(component = %descriptor, "Building component");

        let mut injections = Injections::new(name);
        let mut dependencies = Vec::with_capacity(descriptor.dependencies().len());

        // Match every slot before building anything, so a later slot's
        // failure leaves no dependency cached
        let candidates = descriptor
            .dependencies()
            .iter()
            .map(|dependency| {
                self.candidate_for(&descriptor, &dependency.slot, &dependency.required_type)
            })
            .collect::<Result<Vec<_>, Error>>()?;

        for (dependency, candidate) in descriptor.dependencies().iter().zip(candidates) {
            let resolved = match self.built(&candidate, state) {
                Some(component) => component,
                None => self.build(&candidate, state)?,
            };

            let value = resolved
                .component_type
                .inject_as(&dependency.required_type, &resolved.object)
                .ok_or_else(|| Error::Instantiation {
                    component: name.to_string(),
                    reason: format!(
                        "'{}' cannot be injected as {}",
                        resolved.name(),
                        dependency.required_type
                    ),
                })?;

            trace!(
                component = name,
                slot = %dependency.slot,
                dependency = resolved.name(),
                "Injecting dependency"
            );
            injections.insert(dependency.slot.clone(), value);
            dependencies.push((dependency.slot.clone(), resolved));
        }

        let object = component_type.instantiate(&injections)?;
        let component = Arc::new(Component {
            descriptor,
            component_type,
            object,
            dependencies,
        });

        state
            .borrow_mut()
            .pending
            .insert(name.to_string(), Arc::clone(&component));
        debug!(component = name, "Component built");

        Ok(component)
    }

    /// The single other registered component assignable to `required_type`
    fn candidate_for(
        &self,
        dependent: &ComponentDescriptor,
        slot: &str,
        required_type: &str,
    ) -> Result<String, Error> {
        let descriptors = self.inner.descriptors.read();
        let mut candidates: Vec<String> = descriptors
            .ordered
            .iter()
            .filter(|candidate| candidate.name() != dependent.name())
            .filter(|candidate| {
                self.inner
                    .types
                    .get(candidate.type_name())
                    .is_some_and(|component_type| component_type.is_assignable_to(required_type))
            })
            .map(|candidate| candidate.name().to_string())
            .collect();

        match candidates.len() {
            0 => Err(Error::UnsatisfiedDependency {
                component: dependent.name().to_string(),
                slot: slot.to_string(),
                required_type: required_type.to_string(),
            }),
            1 => Ok(candidates.remove(0)),
            _ => Err(Error::AmbiguousDependency {
                component: dependent.name().to_string(),
                slot: slot.to_string(),
                required_type: required_type.to_string(),
                candidates,
            }),
        }
    }

    /// Declared dependency slots of a component, slot -> required type
    pub fn get_dependencies(&self, name: &str) -> Result<HashMap<String, String>, Error> {
        self.inner
            .descriptors
            .read()
            .get(name)
            .map(|descriptor| descriptor.dependency_map())
            .ok_or_else(|| Error::ComponentNotFound(name.to_string()))
    }

    pub fn descriptor(&self, name: &str) -> Option<Arc<ComponentDescriptor>> {
        self.inner.descriptors.read().get(name).cloned()
    }

    /// Check if a component is registered
    pub fn contains(&self, name: &str) -> bool {
        self.inner.descriptors.read().index.contains_key(name)
    }

    /// Check if a component has already been built
    pub fn is_resolved(&self, name: &str) -> bool {
        self.inner.instances.read().contains_key(name)
    }

    /// Registered component names in registration order
    pub fn names(&self) -> Vec<String> {
        self.inner
            .descriptors
            .read()
            .ordered
            .iter()
            .map(|descriptor| descriptor.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.descriptors.read().ordered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new(TypeRegistry::new())
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("components", &self.names())
            .field("resolved", &self.inner.instances.read().len())
            .finish()
    }
}
