// CLASSIFICATION: COMMUNITY
// Filename: context.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Execution contexts, their groups, and the ancestry table.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::{DevError, DevResult};
use crate::runtime::extension_registry::ExtensionRegistry;
use crate::runtime::heap::Heap;
use crate::runtime::port::{Message, PortId, PortReceiver};

/// Stable identity of an execution context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextId(pub u64);

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// Debugger hook used to pause a context on demand.
pub trait PauseHook: Send + Sync {
    fn pause_developer(&self, context: ContextId, message: Option<&str>);
}

/// Contexts sharing one heap.
#[derive(Debug)]
pub struct ContextGroup {
    id: u64,
    heap: Heap,
    build_id: Option<Vec<u8>>,
    members: Mutex<Vec<ContextId>>,
}

impl ContextGroup {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            heap: Heap::new(),
            build_id: None,
            members: Mutex::new(Vec::new()),
        }
    }

    /// Attach the build id of the loaded ahead-of-time instructions.
    pub fn with_build_id(mut self, build_id: Vec<u8>) -> Self {
        self.build_id = Some(build_id);
        self
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn build_id(&self) -> Option<&[u8]> {
        self.build_id.as_deref()
    }

    pub fn members(&self) -> Vec<ContextId> {
        self.members.lock().map(|m| m.clone()).unwrap_or_default()
    }

    fn add_member(&self, id: ContextId) {
        if let Ok(mut m) = self.members.lock() {
            m.push(id);
        }
    }

    fn remove_member(&self, id: ContextId) {
        if let Ok(mut m) = self.members.lock() {
            m.retain(|c| *c != id);
        }
    }
}

/// Process-wide record of which context spawned which.
///
/// Records are kept after a context exits so descendants can still be
/// traced to their root.
#[derive(Debug)]
pub struct ContextTable {
    next_id: AtomicU64,
    parents: Mutex<HashMap<ContextId, Option<ContextId>>>,
}

impl Default for ContextTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ContextTable {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            parents: Mutex::new(HashMap::new()),
        }
    }

    /// Allocate an id for a context spawned from `parent`.
    pub fn register(&self, parent: Option<ContextId>) -> DevResult<ContextId> {
        let mut parents = self.parents.lock().map_err(|_| DevError::LockPoisoned)?;
        if let Some(p) = parent {
            if !parents.contains_key(&p) {
                return Err(DevError::UnknownContext(p));
            }
        }
        let id = ContextId(self.next_id.fetch_add(1, Ordering::Relaxed));
        parents.insert(id, parent);
        Ok(id)
    }

    pub fn parent_of(&self, id: ContextId) -> DevResult<Option<ContextId>> {
        let parents = self.parents.lock().map_err(|_| DevError::LockPoisoned)?;
        parents.get(&id).copied().ok_or(DevError::UnknownContext(id))
    }

    /// Whether `ctx` is `ancestor` or was spawned from it, directly or not.
    pub fn is_same_or_descendant(&self, ctx: ContextId, ancestor: ContextId) -> bool {
        let parents = match self.parents.lock() {
            Ok(p) => p,
            Err(_) => return false,
        };
        let mut cursor = Some(ctx);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = parents.get(&current).copied().flatten();
        }
        false
    }
}

/// Independently scheduled unit with its own inbox and extension registry.
pub struct ExecutionContext {
    id: ContextId,
    parent: Option<ContextId>,
    group: Arc<ContextGroup>,
    port: PortId,
    inbox: PortReceiver,
    registry: ExtensionRegistry,
    debugger: Option<Arc<dyn PauseHook>>,
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .field("group", &self.group.id())
            .field("port", &self.port)
            .field("registry", &self.registry)
            .finish()
    }
}

impl ExecutionContext {
    pub(crate) fn new(
        id: ContextId,
        parent: Option<ContextId>,
        group: Arc<ContextGroup>,
        inbox: PortReceiver,
    ) -> Self {
        group.add_member(id);
        info!("context {} started in group {} (parent {:?})", id, group.id(), parent);
        Self {
            id,
            parent,
            group,
            port: inbox.id(),
            inbox,
            registry: ExtensionRegistry::new(),
            debugger: None,
        }
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn parent(&self) -> Option<ContextId> {
        self.parent
    }

    pub fn group(&self) -> &Arc<ContextGroup> {
        &self.group
    }

    pub fn port(&self) -> PortId {
        self.port
    }

    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ExtensionRegistry {
        &mut self.registry
    }

    pub fn debugger(&self) -> Option<&Arc<dyn PauseHook>> {
        self.debugger.as_ref()
    }

    pub fn attach_debugger(&mut self, hook: Arc<dyn PauseHook>) {
        self.debugger = Some(hook);
    }

    /// Wait up to `timeout` for the next message on this context's inbox.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Message> {
        self.inbox.recv_timeout(timeout).ok()
    }
}

// The inbox port closes when `inbox` drops after this.
impl Drop for ExecutionContext {
    fn drop(&mut self) {
        self.group.remove_member(self.id);
        info!("context {} shut down", self.id);
    }
}
