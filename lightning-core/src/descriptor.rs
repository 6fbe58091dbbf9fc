//! Component descriptors.
//!
//! A descriptor is the immutable blueprint of a named component: which
//! registered type implements it and which typed slots must be injected.
//! Descriptors come from declaration files or from annotated types found by
//! the component scanner.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// A named dependency slot and the qualified type name it requires
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub slot: String,
    pub required_type: String,
}

/// Immutable blueprint of a named component.
///
/// Equality and hashing consider `name` only: two descriptors with the same
/// name describe the same logical component, whatever their type or slots.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    name: String,
    type_name: String,
    dependencies: Vec<Dependency>,
}

impl ComponentDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            dependencies: Vec::new(),
        }
    }

    /// Declare a dependency slot. Declaring the same slot twice keeps the
    /// last required type.
    pub fn with_dependency(
        mut self,
        slot: impl Into<String>,
        required_type: impl Into<String>,
    ) -> Self {
        let slot = slot.into();
        let required_type = required_type.into();
        match self.dependencies.iter_mut().find(|dep| dep.slot == slot) {
            Some(existing) => existing.required_type = required_type,
            None => self.dependencies.push(Dependency {
                slot,
                required_type,
            }),
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Qualified name of the implementation type
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Dependency slots in declaration order
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Dependency slots as a slot -> required type map
    pub fn dependency_map(&self) -> HashMap<String, String> {
        self.dependencies
            .iter()
            .map(|dep| (dep.slot.clone(), dep.required_type.clone()))
            .collect()
    }
}

impl PartialEq for ComponentDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ComponentDescriptor {}

impl Hash for ComponentDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl std::fmt::Display for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.type_name)
    }
}
