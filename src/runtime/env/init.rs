// CLASSIFICATION: COMMUNITY
// Filename: init.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Runtime environment initialization.
//!
//! Builds the process-wide collaborators once and hands shared references to
//! every consumer instead of exposing them as globals.

use std::sync::Arc;

use log::info;

use crate::config::RuntimeConfig;
use crate::developer::Developer;
use crate::error::DevResult;
use crate::runtime::context::{ContextGroup, ContextId, ContextTable, ExecutionContext};
use crate::runtime::port::{PortMap, PortReceiver, PortTransport, ReplyChannel};
use crate::runtime::service_locator::{ServiceLauncher, ServiceLocator};
use crate::runtime::snapshot::FileHeapSnapshotWriter;
use crate::services::control::ControlDispatcher;
use crate::services::events::{EventForwarder, ServiceInboxObserver};
use crate::services::service_host::{ServiceHostHandle, ThreadedServiceLauncher};

pub struct Runtime {
    config: RuntimeConfig,
    ports: Arc<PortMap>,
    contexts: Arc<ContextTable>,
    locator: Arc<ServiceLocator>,
    forwarder: Arc<EventForwarder>,
    developer: Developer,
    service_host: Option<ServiceHostHandle>,
}

/// Initialize the runtime with the in-process service host.
pub fn initialize_runtime_env(config: RuntimeConfig) -> Runtime {
    let mut handle = None;
    let mut runtime = Runtime::with_launcher(config.clone(), |ports, _| {
        let launcher = ThreadedServiceLauncher::new(&config, Arc::clone(ports));
        handle = Some(launcher.handle());
        let launcher: Box<dyn ServiceLauncher> = Box::new(launcher);
        launcher
    });
    runtime.service_host = handle;
    runtime
}

impl Runtime {
    /// Build a runtime whose service context is brought up by the launcher
    /// returned from `make_launcher`.
    pub fn with_launcher<F>(config: RuntimeConfig, make_launcher: F) -> Self
    where
        F: FnOnce(&Arc<PortMap>, &Arc<ContextTable>) -> Box<dyn ServiceLauncher>,
    {
        let capabilities = config.capabilities();
        let ports = Arc::new(PortMap::new());
        let contexts = Arc::new(ContextTable::new());
        let transport: Arc<dyn PortTransport> = ports.clone();

        let locator = Arc::new(ServiceLocator::new(
            capabilities,
            Arc::clone(&contexts),
            make_launcher(&ports, &contexts),
        ));
        let forwarder = Arc::new(EventForwarder::new(capabilities));
        forwarder.attach(Arc::new(ServiceInboxObserver::new(
            Arc::clone(&locator),
            Arc::clone(&transport),
        )));
        let dispatcher = ControlDispatcher::new(capabilities, Arc::clone(&locator), transport);
        let developer = Developer::new(
            capabilities,
            Arc::clone(&locator),
            dispatcher,
            Arc::clone(&forwarder),
            Box::new(FileHeapSnapshotWriter),
        );
        info!("runtime initialized with capabilities {:?}", capabilities);

        Self {
            config,
            ports,
            contexts,
            locator,
            forwarder,
            developer,
            service_host: None,
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn ports(&self) -> &Arc<PortMap> {
        &self.ports
    }

    pub fn contexts(&self) -> &Arc<ContextTable> {
        &self.contexts
    }

    pub fn locator(&self) -> &Arc<ServiceLocator> {
        &self.locator
    }

    pub fn forwarder(&self) -> &Arc<EventForwarder> {
        &self.forwarder
    }

    pub fn developer(&self) -> &Developer {
        &self.developer
    }

    /// Handle on the in-process service host, when one is configured.
    pub fn service_host(&self) -> Option<&ServiceHostHandle> {
        self.service_host.as_ref()
    }

    /// Spawn an execution context in `group`, recording `parent` as its origin.
    pub fn spawn_context(
        &self,
        group: &Arc<ContextGroup>,
        parent: Option<ContextId>,
    ) -> DevResult<ExecutionContext> {
        let id = self.contexts.register(parent)?;
        let (_, inbox) = self.ports.open_port()?;
        Ok(ExecutionContext::new(id, parent, Arc::clone(group), inbox))
    }

    /// Open a fresh port to receive the reply to one control request.
    ///
    /// The port closes when the returned receiver drops.
    pub fn open_reply_channel(&self) -> DevResult<(ReplyChannel, PortReceiver)> {
        let (port, rx) = self.ports.open_port()?;
        Ok((ReplyChannel(port), rx))
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if let Some(endpoint) = self.locator.endpoint() {
            self.ports.close_port(endpoint.port);
        }
    }
}
