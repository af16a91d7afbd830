// CLASSIFICATION: COMMUNITY
// Filename: events.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Fire-and-forget diagnostic events.
//!
//! Events go to every attached [`EventObserver`]. With no observers, or with
//! diagnostics compiled out, forwarding does nothing.

use std::sync::{Arc, RwLock};

use log::{debug, log, Level};
use serde::{Deserialize, Serialize};

use crate::config::Capabilities;
use crate::runtime::context::ContextId;
use crate::runtime::port::{Message, PortTransport};
use crate::runtime::service_locator::ServiceLocator;
use crate::services::ServiceMessage;

/// Log target used when mirroring forwarded log records.
pub const DEVELOPER_LOG_TARGET: &str = "devsvc::developer";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub context: ContextId,
    pub sequence: i64,
    pub timestamp: i64,
    pub level: i32,
    pub name: String,
    pub message: String,
    pub zone: Option<String>,
    pub error: Option<String>,
    pub stack_trace: Option<String>,
}

impl LogRecord {
    /// Map the numeric severity onto the `log` crate's levels.
    pub fn log_level(&self) -> Level {
        match self.level {
            l if l >= 1000 => Level::Error,
            l if l >= 900 => Level::Warn,
            l if l >= 800 => Level::Info,
            l if l >= 500 => Level::Debug,
            _ => Level::Trace,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ServiceEvent {
    Log(LogRecord),
    Inspect {
        context: ContextId,
        value: serde_json::Value,
    },
    Extension {
        context: ContextId,
        kind: String,
        data: String,
    },
}

pub trait EventObserver: Send + Sync {
    fn observe(&self, event: &ServiceEvent);
}

/// Posts events into the service context's inbox while it is running.
///
/// Never triggers startup: events raised before the service context exists
/// are dropped.
pub struct ServiceInboxObserver {
    locator: Arc<ServiceLocator>,
    transport: Arc<dyn PortTransport>,
}

impl ServiceInboxObserver {
    pub fn new(locator: Arc<ServiceLocator>, transport: Arc<dyn PortTransport>) -> Self {
        Self { locator, transport }
    }
}

impl EventObserver for ServiceInboxObserver {
    fn observe(&self, event: &ServiceEvent) {
        let endpoint = match self.locator.endpoint() {
            Some(endpoint) => endpoint,
            None => return,
        };
        match serde_json::to_value(ServiceMessage::Event(event.clone())) {
            Ok(payload) => {
                self.transport.post(endpoint.port, Message::Json(payload));
            }
            Err(e) => debug!("dropping unserializable event: {}", e),
        }
    }
}

pub struct EventForwarder {
    capabilities: Capabilities,
    observers: RwLock<Vec<Arc<dyn EventObserver>>>,
}

impl EventForwarder {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            observers: RwLock::new(Vec::new()),
        }
    }

    pub fn attach(&self, observer: Arc<dyn EventObserver>) {
        if let Ok(mut observers) = self.observers.write() {
            observers.push(observer);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.read().map(|o| o.len()).unwrap_or(0)
    }

    fn enabled(&self) -> bool {
        self.capabilities.contains(Capabilities::DIAGNOSTICS)
    }

    fn notify(&self, event: ServiceEvent) {
        let observers = match self.observers.read() {
            Ok(o) => o,
            Err(_) => return,
        };
        for observer in observers.iter() {
            observer.observe(&event);
        }
    }

    pub fn forward_log(&self, record: LogRecord) {
        if !self.enabled() {
            return;
        }
        log!(
            target: DEVELOPER_LOG_TARGET,
            record.log_level(),
            "[{}] {}: {}",
            record.context,
            record.name,
            record.message
        );
        self.notify(ServiceEvent::Log(record));
    }

    /// Announce `value` as an inspection target and hand it back unchanged.
    pub fn forward_inspect<T: Serialize>(&self, context: ContextId, value: T) -> T {
        if self.enabled() {
            let snapshot = serde_json::to_value(&value).unwrap_or_else(|e| {
                debug!("inspect target not serializable: {}", e);
                serde_json::Value::Null
            });
            self.notify(ServiceEvent::Inspect {
                context,
                value: snapshot,
            });
        }
        value
    }

    pub fn forward_event(&self, context: ContextId, kind: &str, data: &str) {
        if !self.enabled() {
            return;
        }
        self.notify(ServiceEvent::Extension {
            context,
            kind: kind.to_string(),
            data: data.to_string(),
        });
    }
}
