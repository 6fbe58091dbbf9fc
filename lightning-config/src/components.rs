//! Component declaration files.
//!
//! A declaration file lists components in order, each with an id, its
//! implementation type and the slots to inject:
//!
//! ```toml
//! [[component]]
//! id = "userService"
//! class = "app.UserServiceImpl"
//!
//! [[component]]
//! id = "userController"
//! class = "app.web.UserController"
//!
//!   [[component.prop]]
//!   name = "svc"
//!   ref-class = "app.UserService"
//! ```
//!
//! The same layout is accepted as JSON. Any malformed entry fails the whole
//! file, so nothing is registered from a half-valid declaration.

use crate::{ConfigError, ConfigLoader, ConfigValidator, Result};
use lightning_core::ComponentDescriptor;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFile {
    #[serde(default)]
    component: Vec<RawComponent>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawComponent {
    id: Option<String>,
    class: Option<String>,
    #[serde(default)]
    prop: Vec<RawProp>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProp {
    name: Option<String>,
    #[serde(rename = "ref-class")]
    ref_class: Option<String>,
}

/// Parsed component declarations, in file order
#[derive(Debug, Clone, Default)]
pub struct ComponentFile {
    descriptors: Vec<ComponentDescriptor>,
}

impl ComponentFile {
    /// Load a TOML or JSON declaration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let value = ConfigLoader::auto(path)?.load_file(path)?;
        Self::from_value(value, &path.display().to_string())
    }

    /// Parse declarations already loaded into a JSON value
    pub fn from_value(value: Value, source_name: &str) -> Result<Self> {
        let invalid = |reason: String| ConfigError::InvalidComponent {
            source_name: source_name.to_string(),
            reason,
        };

        let raw: RawFile = serde_json::from_value(value).map_err(|e| invalid(e.to_string()))?;

        let mut ids = HashSet::new();
        let mut descriptors = Vec::with_capacity(raw.component.len());

        for (index, component) in raw.component.into_iter().enumerate() {
            let position = index + 1;
            let id = required(component.id, "id", position).map_err(invalid)?;
            let class = required(component.class, "class", position).map_err(invalid)?;
            ConfigValidator::is_qualified_name(&class, "class")
                .map_err(|e| invalid(format!("component '{}': {}", id, e)))?;

            if !ids.insert(id.clone()) {
                return Err(invalid(format!("component id '{}' is declared twice", id)));
            }

            let mut slots = HashSet::new();
            let mut descriptor = ComponentDescriptor::new(id.clone(), class);
            for (prop_index, prop) in component.prop.into_iter().enumerate() {
                let context = format!("prop #{} of component '{}'", prop_index + 1, id);
                let name = prop
                    .name
                    .filter(|name| !name.trim().is_empty())
                    .ok_or_else(|| invalid(format!("{} is missing 'name'", context)))?;
                let ref_class = prop
                    .ref_class
                    .filter(|class| !class.trim().is_empty())
                    .ok_or_else(|| invalid(format!("{} is missing 'ref-class'", context)))?;

                if !slots.insert(name.clone()) {
                    return Err(invalid(format!(
                        "component '{}' declares prop '{}' twice",
                        id, name
                    )));
                }
                descriptor = descriptor.with_dependency(name, ref_class);
            }

            debug!(component = %descriptor, source = source_name, "Component declared");
            descriptors.push(descriptor);
        }

        Ok(Self { descriptors })
    }

    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    pub fn into_descriptors(self) -> Vec<ComponentDescriptor> {
        self.descriptors
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

fn required(value: Option<String>, field: &str, position: usize) -> std::result::Result<String, String> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| format!("component #{} is missing '{}'", position, field))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FileFormat;

    fn parse(toml: &str) -> Result<ComponentFile> {
        let value = ConfigLoader::new(FileFormat::Toml).parse(toml)?;
        ComponentFile::from_value(value, "test.toml")
    }

    #[test]
    fn test_parse_components() {
        let file = parse(
            r#"
            [[component]]
            id = "userService"
            class = "app.UserServiceImpl"

            [[component]]
            id = "userController"
            class = "app.web.UserController"

              [[component.prop]]
              name = "svc"
              ref-class = "app.UserService"
            "#,
        )
        .unwrap();

        assert_eq!(file.len(), 2);
        let controller = &file.descriptors()[1];
        assert_eq!(controller.name(), "userController");
        assert_eq!(controller.type_name(), "app.web.UserController");
        assert_eq!(
            controller.dependency_map().get("svc"),
            Some(&"app.UserService".to_string())
        );
    }

    #[test]
    fn test_empty_file() {
        assert!(parse("").unwrap().is_empty());
    }

    #[test]
    fn test_missing_id() {
        let err = parse(
            r#"
            [[component]]
            class = "app.UserServiceImpl"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("component #1 is missing 'id'"));
    }

    #[test]
    fn test_empty_class() {
        let err = parse(
            r#"
            [[component]]
            id = "userService"
            class = ""
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing 'class'"));
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = parse(
            r#"
            [[component]]
            id = "userService"
            class = "app.UserServiceImpl"
            scope = "prototype"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidComponent { .. }));
    }

    #[test]
    fn test_malformed_prop() {
        let err = parse(
            r#"
            [[component]]
            id = "userController"
            class = "app.web.UserController"

              [[component.prop]]
              name = "svc"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing 'ref-class'"));
    }

    #[test]
    fn test_duplicate_prop() {
        let err = parse(
            r#"
            [[component]]
            id = "userController"
            class = "app.web.UserController"

              [[component.prop]]
              name = "svc"
              ref-class = "app.A"

              [[component.prop]]
              name = "svc"
              ref-class = "app.B"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declares prop 'svc' twice"));
    }

    #[test]
    fn test_duplicate_id() {
        let err = parse(
            r#"
            [[component]]
            id = "a"
            class = "app.A"

            [[component]]
            id = "a"
            class = "app.B"
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("declared twice"));
    }

    #[test]
    fn test_json_layout() {
        let value = serde_json::json!({
            "component": [
                {"id": "svc", "class": "app.Service", "prop": [{"name": "repo", "ref-class": "app.Repo"}]}
            ]
        });
        let file = ComponentFile::from_value(value, "inline").unwrap();
        assert_eq!(file.descriptors()[0].dependencies().len(), 1);
    }
}
