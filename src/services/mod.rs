// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Services Module
//!
//! Control dispatch toward the service context, diagnostic event forwarding,
//! and the in-process service host that answers both.

use serde::{Deserialize, Serialize};

pub mod control;
pub mod events;
pub mod service_host;

pub use control::{ControlDispatcher, ControlRequest, DispatchOutcome, ServerInfo};
pub use events::{EventForwarder, EventObserver, LogRecord, ServiceEvent, ServiceInboxObserver};
pub use service_host::{ServiceHostHandle, ThreadedServiceLauncher};

/// Envelope for everything posted into the service context's inbox.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceMessage {
    Control(ControlRequest),
    Event(ServiceEvent),
}
