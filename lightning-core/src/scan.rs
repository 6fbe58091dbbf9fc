//! Component discovery.
//!
//! The scanner walks the type registry on a background task and streams the
//! qualified names found under a base package. Completion is signalled by a
//! single [`ScanEvent::Complete`]; consumers never have to infer it from the
//! stream going quiet.
//!
//! ```no_run
//! # async fn example(types: lightning_core::TypeRegistry) -> Result<(), lightning_core::Error> {
//! use lightning_core::ComponentScanner;
//!
//! let handle = ComponentScanner::start(&types, "app");
//! let found = handle.collect().await?;
//! let descriptors = ComponentScanner::descriptors(&types, &found);
//! # Ok(())
//! # }
//! ```

use crate::logging::{debug, trace};
use crate::{ComponentDescriptor, Error, TypeRegistry};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Progress of a running scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    /// A type under the base package
    Found(String),
    /// The scan is over; `found` names were sent before this event
    Complete { found: usize },
}

/// Discovers component types by package
pub struct ComponentScanner;

impl ComponentScanner {
    /// Start scanning `types` for names under `base_package` on a background
    /// task. Must be called from within a Tokio runtime.
    pub fn start(types: &TypeRegistry, base_package: &str) -> ScanHandle {
        let (sender, receiver) = mpsc::unbounded_channel();
        let types = types.clone();
        let base_package = base_package.to_string();

        let task = tokio::spawn(async move {
            debug!(package = %base_package, "Component scan started");
            let mut found = 0;
            for name in types.names().filter(|name| in_package(name, &base_package)) {
                trace!(type_name = name, "Scanned type");
                if sender.send(ScanEvent::Found(name.to_string())).is_err() {
                    return;
                }
                found += 1;
                tokio::task::yield_now().await;
            }
            debug!(package = %base_package, found, "Component scan complete");
            let _ = sender.send(ScanEvent::Complete { found });
        });

        ScanHandle { receiver, task }
    }

    /// Synchronous scan, in lexical order
    pub fn scan(types: &TypeRegistry, base_package: &str) -> Vec<String> {
        types
            .names()
            .filter(|name| in_package(name, base_package))
            .map(str::to_string)
            .collect()
    }

    /// Descriptors for the annotated types among `names`.
    ///
    /// Names without a registered type or without a component annotation
    /// are skipped.
    pub fn descriptors(types: &TypeRegistry, names: &[String]) -> Vec<ComponentDescriptor> {
        names
            .iter()
            .filter_map(|name| {
                let annotation = types.get(name)?.annotation()?;
                let descriptor = annotation.dependencies.iter().fold(
                    ComponentDescriptor::new(annotation.name.clone(), name.clone()),
                    |descriptor, dependency| {
                        descriptor.with_dependency(
                            dependency.slot.clone(),
                            dependency.required_type.clone(),
                        )
                    },
                );
                trace!(component = %descriptor, "Annotated component discovered");
                Some(descriptor)
            })
            .collect()
    }
}

/// Receiving end of a running scan
pub struct ScanHandle {
    receiver: mpsc::UnboundedReceiver<ScanEvent>,
    task: JoinHandle<()>,
}

impl ScanHandle {
    /// Next event, or `None` once the scan task has gone away
    pub async fn next_event(&mut self) -> Option<ScanEvent> {
        self.receiver.recv().await
    }

    /// Wait for completion and return every name found, in scan order
    pub async fn collect(mut self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                ScanEvent::Found(name) => names.push(name),
                ScanEvent::Complete { found } if found == names.len() => return Ok(names),
                ScanEvent::Complete { found } => {
                    return Err(Error::Scan(format!(
                        "scan reported {} types but {} were received",
                        found,
                        names.len()
                    )));
                }
            }
        }

        let reason = match (&mut self.task).await {
            Err(err) => format!("scan task failed: {}", err),
            Ok(()) => "scan ended without completing".to_string(),
        };
        Err(Error::Scan(reason))
    }
}

fn in_package(name: &str, base_package: &str) -> bool {
    base_package.is_empty()
        || name == base_package
        || name
            .strip_prefix(base_package)
            .is_some_and(|rest| rest.starts_with('.'))
}
