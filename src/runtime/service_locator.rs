// CLASSIFICATION: COMMUNITY
// Filename: service_locator.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Tracks the singleton service context and its lazy startup.
//!
//! The first caller of [`ServiceLocator::wait_for_startup`] runs the
//! configured [`ServiceLauncher`]; every concurrent caller blocks on the same
//! condition variable and observes the same final state.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::config::Capabilities;
use crate::error::{DevError, DevResult};
use crate::runtime::context::{ContextId, ContextTable};
use crate::runtime::port::PortId;

/// Lifecycle of the service context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ServiceContextState {
    NotStarted,
    Starting,
    Running,
    /// Startup failed or the service context is not part of this build.
    PermanentlyUnavailable,
}

/// Where a running service context can be reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub context: ContextId,
    pub port: PortId,
}

/// Brings up the service context.
pub trait ServiceLauncher: Send + Sync {
    /// Start the service context already registered as `context` and
    /// return the port of its inbox.
    fn launch(&self, context: ContextId) -> DevResult<PortId>;
}

/// Launcher for builds that ship without a service context.
#[derive(Debug, Default)]
pub struct DisabledServiceLauncher;

impl ServiceLauncher for DisabledServiceLauncher {
    fn launch(&self, _context: ContextId) -> DevResult<PortId> {
        Err(DevError::ServiceUnavailable(
            "service context not included in this build".into(),
        ))
    }
}

pub struct ServiceLocator {
    capabilities: Capabilities,
    contexts: Arc<ContextTable>,
    launcher: Box<dyn ServiceLauncher>,
    state: Mutex<ServiceContextState>,
    state_changed: Condvar,
    service_context: OnceCell<ContextId>,
    endpoint: OnceCell<ServiceEndpoint>,
}

impl fmt::Debug for ServiceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceLocator")
            .field("state", &self.state())
            .field("service_context", &self.service_context.get())
            .field("endpoint", &self.endpoint.get())
            .finish()
    }
}

impl ServiceLocator {
    pub fn new(
        capabilities: Capabilities,
        contexts: Arc<ContextTable>,
        launcher: Box<dyn ServiceLauncher>,
    ) -> Self {
        Self {
            capabilities,
            contexts,
            launcher,
            state: Mutex::new(ServiceContextState::NotStarted),
            state_changed: Condvar::new(),
            service_context: OnceCell::new(),
            endpoint: OnceCell::new(),
        }
    }

    // The state is a plain enum, so a poisoned lock still holds a valid value.
    fn lock_state(&self) -> MutexGuard<'_, ServiceContextState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> ServiceContextState {
        *self.lock_state()
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServiceContextState::Running
    }

    /// Id reserved for the service context, recorded before its launcher runs.
    pub fn service_context(&self) -> Option<ContextId> {
        self.service_context.get().copied()
    }

    /// Endpoint of the service context once it is running.
    pub fn endpoint(&self) -> Option<ServiceEndpoint> {
        if self.is_running() {
            self.endpoint.get().copied()
        } else {
            None
        }
    }

    /// Block until startup has settled, starting it on first demand.
    pub fn wait_for_startup(&self) -> ServiceContextState {
        let mut state = self.lock_state();
        if *state == ServiceContextState::NotStarted {
            *state = ServiceContextState::Starting;
            drop(state);
            let outcome = self.run_launcher();

            let mut state = self.lock_state();
            *state = match outcome {
                Ok(endpoint) => {
                    // Only the first caller reaches here, so the cell is empty.
                    let _ = self.endpoint.set(endpoint);
                    info!(
                        "service context {} running on port {}",
                        endpoint.context, endpoint.port
                    );
                    ServiceContextState::Running
                }
                Err(e) => {
                    warn!("service context unavailable: {}", e);
                    ServiceContextState::PermanentlyUnavailable
                }
            };
            self.state_changed.notify_all();
            return *state;
        }
        let state = self
            .state_changed
            .wait_while(state, |s| *s == ServiceContextState::Starting)
            .unwrap_or_else(PoisonError::into_inner);
        *state
    }

    fn run_launcher(&self) -> DevResult<ServiceEndpoint> {
        if !self.capabilities.contains(Capabilities::DIAGNOSTICS) {
            return Err(DevError::ServiceUnavailable(
                "diagnostics are compiled out".into(),
            ));
        }
        // Recorded before launching so the isolation policy already covers
        // the service context while it is still starting.
        let context = self.contexts.register(None)?;
        let _ = self.service_context.set(context);
        let port = panic::catch_unwind(AssertUnwindSafe(|| self.launcher.launch(context)))
            .unwrap_or_else(|_| {
                Err(DevError::ServiceUnavailable(
                    "service launcher panicked".into(),
                ))
            })?;
        Ok(ServiceEndpoint { context, port })
    }

    /// Whether `context` is the service context or was spawned from it,
    /// in any state once an id has been reserved.
    pub fn is_descendant(&self, context: ContextId) -> bool {
        match self.service_context.get() {
            Some(service) => self.contexts.is_same_or_descendant(context, *service),
            None => false,
        }
    }
}
