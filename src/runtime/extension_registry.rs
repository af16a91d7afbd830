// CLASSIFICATION: COMMUNITY
// Filename: extension_registry.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Per-context registry of named service extension handlers.
//!
//! Each [`ExecutionContext`](super::context::ExecutionContext) owns exactly
//! one registry and only mutates it from its own thread, so the map needs no
//! locking. The service-context isolation policy lives in
//! [`Developer::register_handler`](crate::developer::Developer::register_handler).

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use log::debug;

/// Callback invoked by external tooling through the service protocol.
pub trait ExtensionHandler: Send + Sync {
    /// Handle `method` with string `params`; returns a JSON result string
    /// or an error detail.
    fn call(&self, method: &str, params: &BTreeMap<String, String>) -> Result<String, String>;
}

impl<F> ExtensionHandler for F
where
    F: Fn(&str, &BTreeMap<String, String>) -> Result<String, String> + Send + Sync,
{
    fn call(&self, method: &str, params: &BTreeMap<String, String>) -> Result<String, String> {
        self(method, params)
    }
}

/// Shared reference to a handler owned by the registering context.
pub type HandlerRef = Arc<dyn ExtensionHandler>;

#[derive(Default)]
pub struct ExtensionRegistry {
    handlers: HashMap<String, HandlerRef>,
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the handler for `name`.
    pub fn register(&mut self, name: &str, handler: HandlerRef) {
        if self.handlers.insert(name.to_string(), handler).is_some() {
            debug!("extension {:?} replaced", name);
        } else {
            debug!("extension {:?} registered", name);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<HandlerRef> {
        self.handlers.get(name).cloned()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
