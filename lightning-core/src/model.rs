// Per-request model filled by controllers

use serde_json::Value;
use std::collections::HashMap;

/// Key/value data a controller hands to its view.
///
/// A fresh, empty model is created for every dispatched request and dropped
/// once its entries have been copied into the request attributes.
#[derive(Debug, Clone, Default)]
pub struct Model {
    attributes: HashMap<String, Value>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute, replacing any previous value under `key`
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }
}

impl IntoIterator for Model {
    type Item = (String, Value);
    type IntoIter = std::collections::hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.into_iter()
    }
}
