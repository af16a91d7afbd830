// CLASSIFICATION: COMMUNITY
// Filename: service_host.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! In-process service context.
//!
//! The host drains its inbox on a dedicated thread, answers control requests
//! on their reply channels, and keeps a bounded history of forwarded events.
//! It exits once its inbox port is closed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::thread;

use log::{debug, info, warn};

use crate::config::{RuntimeConfig, WebServerConfig};
use crate::error::{DevError, DevResult};
use crate::runtime::context::ContextId;
use crate::runtime::port::{Message, PortId, PortMap, PortReceiver, PortTransport, ReplyChannel};
use crate::runtime::service_locator::ServiceLauncher;
use crate::services::control::{
    format_context_id, ControlRequest, ServerInfo, SERVICE_PROTOCOL_MAJOR_VERSION,
    SERVICE_PROTOCOL_MINOR_VERSION,
};
use crate::services::events::ServiceEvent;
use crate::services::ServiceMessage;

/// Number of forwarded events retained by the host.
pub const EVENT_HISTORY_LIMIT: usize = 256;

#[derive(Debug, Default)]
struct HostState {
    web_server_enabled: bool,
    events: VecDeque<ServiceEvent>,
    requests_served: u64,
}

/// Read-only view of a running host, shared with the runtime.
#[derive(Clone, Debug, Default)]
pub struct ServiceHostHandle {
    state: Arc<Mutex<HostState>>,
}

impl ServiceHostHandle {
    pub fn web_server_enabled(&self) -> bool {
        self.state.lock().map(|s| s.web_server_enabled).unwrap_or(false)
    }

    pub fn events(&self) -> Vec<ServiceEvent> {
        self.state
            .lock()
            .map(|s| s.events.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn requests_served(&self) -> u64 {
        self.state.lock().map(|s| s.requests_served).unwrap_or(0)
    }
}

struct ServiceHost {
    state: Arc<Mutex<HostState>>,
    transport: Arc<dyn PortTransport>,
    web: WebServerConfig,
    silence_output: bool,
}

impl ServiceHost {
    fn run(self, inbox: PortReceiver) {
        for msg in inbox.iter() {
            let value = match msg {
                Message::Json(v) => v,
                Message::Null => continue,
            };
            match serde_json::from_value::<ServiceMessage>(value) {
                Ok(ServiceMessage::Control(req)) => self.handle_control(req),
                Ok(ServiceMessage::Event(event)) => self.record_event(event),
                Err(e) => warn!("service host ignoring malformed message: {}", e),
            }
        }
        info!("service host inbox {} closed, exiting", inbox.id());
    }

    fn server_info(&self, enabled: bool) -> ServerInfo {
        ServerInfo {
            enabled,
            uri: enabled.then(|| format!("http://{}:{}/", self.web.host, self.web.port)),
            major: SERVICE_PROTOCOL_MAJOR_VERSION,
            minor: SERVICE_PROTOCOL_MINOR_VERSION,
        }
    }

    fn reply_info(&self, reply: ReplyChannel, info: &ServerInfo) {
        match serde_json::to_value(info) {
            Ok(v) => {
                self.transport.post(reply.port(), Message::Json(v));
            }
            Err(e) => {
                warn!("server info not serializable: {}", e);
                self.transport.post(reply.port(), Message::Null);
            }
        }
    }

    fn handle_control(&self, req: ControlRequest) {
        let mut state = match self.state.lock() {
            Ok(s) => s,
            Err(_) => {
                self.transport.post(req.reply_channel().port(), Message::Null);
                return;
            }
        };
        state.requests_served += 1;
        match req {
            ControlRequest::ServerInfo { reply } => {
                let info = self.server_info(state.web_server_enabled);
                drop(state);
                self.reply_info(reply, &info);
            }
            ControlRequest::WebServerControl {
                reply,
                enable,
                silence_output,
            } => {
                let changed = state.web_server_enabled != enable;
                state.web_server_enabled = enable;
                drop(state);
                let info = self.server_info(enable);
                if changed && !silence_output.unwrap_or(self.silence_output) {
                    match &info.uri {
                        Some(uri) => info!("service protocol listening on {}", uri),
                        None => info!("service protocol no longer listening"),
                    }
                }
                self.reply_info(reply, &info);
            }
            ControlRequest::IdLookup { reply, port_id } => {
                drop(state);
                self.transport.post(
                    reply.port(),
                    Message::Json(serde_json::Value::String(format_context_id(port_id))),
                );
            }
        }
    }

    fn record_event(&self, event: ServiceEvent) {
        debug!("service host received {:?}", event);
        if let Ok(mut state) = self.state.lock() {
            if state.events.len() == EVENT_HISTORY_LIMIT {
                state.events.pop_front();
            }
            state.events.push_back(event);
        }
    }
}

/// Launches a [`ServiceHost`] on its own thread for the reserved service context.
pub struct ThreadedServiceLauncher {
    ports: Arc<PortMap>,
    web: WebServerConfig,
    silence_output: bool,
    handle: ServiceHostHandle,
}

impl ThreadedServiceLauncher {
    pub fn new(config: &RuntimeConfig, ports: Arc<PortMap>) -> Self {
        let handle = ServiceHostHandle::default();
        if let Ok(mut state) = handle.state.lock() {
            state.web_server_enabled = config.web_server.enabled_at_startup;
        }
        Self {
            ports,
            web: config.web_server.clone(),
            silence_output: config.silence_output,
            handle,
        }
    }

    pub fn handle(&self) -> ServiceHostHandle {
        self.handle.clone()
    }
}

impl ServiceLauncher for ThreadedServiceLauncher {
    fn launch(&self, context: ContextId) -> DevResult<PortId> {
        let (port, inbox) = self.ports.open_port()?;
        let transport: Arc<dyn PortTransport> = self.ports.clone();
        let host = ServiceHost {
            state: Arc::clone(&self.handle.state),
            transport,
            web: self.web.clone(),
            silence_output: self.silence_output,
        };
        // A failed spawn drops the closure and with it the inbox, closing the port.
        thread::Builder::new()
            .name(format!("devsvc-service-{}", context))
            .spawn(move || host.run(inbox))
            .map_err(|e| DevError::ServiceUnavailable(e.to_string()))?;
        Ok(port)
    }
}
