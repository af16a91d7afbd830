// CLASSIFICATION: COMMUNITY
// Filename: control.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Control requests addressed to the service context.
//!
//! Every request ends in exactly one reply on its [`ReplyChannel`]: either the
//! service context answers it, or the dispatcher posts [`Message::Null`]
//! itself when no service context can take the request.

use std::sync::Arc;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::config::Capabilities;
use crate::runtime::port::{Message, PortId, PortTransport, ReplyChannel};
use crate::runtime::service_locator::{ServiceContextState, ServiceLocator};
use crate::services::ServiceMessage;

pub const SERVICE_PROTOCOL_MAJOR_VERSION: u32 = 4;
pub const SERVICE_PROTOCOL_MINOR_VERSION: u32 = 16;

/// Prefix of the service-protocol id derived from a port.
pub const CONTEXT_ID_PREFIX: &str = "contexts/";

/// Format the service-protocol id of the context listening on `port`.
pub fn format_context_id(port: PortId) -> String {
    format!("{}{}", CONTEXT_ID_PREFIX, port.0)
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlRequest {
    ServerInfo {
        reply: ReplyChannel,
    },
    WebServerControl {
        reply: ReplyChannel,
        enable: bool,
        silence_output: Option<bool>,
    },
    IdLookup {
        reply: ReplyChannel,
        port_id: PortId,
    },
}

impl ControlRequest {
    pub fn reply_channel(&self) -> ReplyChannel {
        match self {
            ControlRequest::ServerInfo { reply }
            | ControlRequest::WebServerControl { reply, .. }
            | ControlRequest::IdLookup { reply, .. } => *reply,
        }
    }
}

/// Reply payload for server-info and web-server requests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub enabled: bool,
    pub uri: Option<String>,
    pub major: u32,
    pub minor: u32,
}

/// How the dispatcher discharged a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Handed to the service context, which owns the reply.
    Forwarded,
    /// Answered locally with a computed value.
    Answered,
    /// Fallback `Null` posted because no service context could take it.
    NullReply,
}

pub struct ControlDispatcher {
    capabilities: Capabilities,
    locator: Arc<ServiceLocator>,
    transport: Arc<dyn PortTransport>,
}

impl ControlDispatcher {
    pub fn new(
        capabilities: Capabilities,
        locator: Arc<ServiceLocator>,
        transport: Arc<dyn PortTransport>,
    ) -> Self {
        Self {
            capabilities,
            locator,
            transport,
        }
    }

    /// Discharge `request`. May block while the service context starts.
    pub fn dispatch(&self, request: ControlRequest) -> DispatchOutcome {
        let reply = request.reply_channel();
        if let ControlRequest::IdLookup { port_id, .. } = request {
            return match self.context_id_from_port(port_id) {
                Some(id) => {
                    self.transport
                        .post(reply.port(), Message::Json(serde_json::Value::String(id)));
                    DispatchOutcome::Answered
                }
                None => self.send_null(reply),
            };
        }
        if !self.capabilities.contains(Capabilities::DIAGNOSTICS) {
            return self.send_null(reply);
        }
        if self.locator.wait_for_startup() != ServiceContextState::Running {
            return self.send_null(reply);
        }
        let endpoint = match self.locator.endpoint() {
            Some(endpoint) => endpoint,
            None => return self.send_null(reply),
        };
        let payload = match serde_json::to_value(ServiceMessage::Control(request)) {
            Ok(v) => v,
            Err(e) => {
                debug!("control request not serializable: {}", e);
                return self.send_null(reply);
            }
        };
        if self.transport.post(endpoint.port, Message::Json(payload)) {
            debug!("control request forwarded to {}", endpoint.context);
            DispatchOutcome::Forwarded
        } else {
            info!("service context inbox closed; answering with null");
            self.send_null(reply)
        }
    }

    pub fn query_server_info(&self, reply: ReplyChannel) -> DispatchOutcome {
        self.dispatch(ControlRequest::ServerInfo { reply })
    }

    pub fn control_web_server(
        &self,
        reply: ReplyChannel,
        enable: bool,
        silence_output: Option<bool>,
    ) -> DispatchOutcome {
        self.dispatch(ControlRequest::WebServerControl {
            reply,
            enable,
            silence_output,
        })
    }

    /// Local id lookup; no round trip to the service context.
    pub fn context_id_from_port(&self, port: PortId) -> Option<String> {
        if self.capabilities.contains(Capabilities::DIAGNOSTICS) {
            Some(format_context_id(port))
        } else {
            None
        }
    }

    fn send_null(&self, reply: ReplyChannel) -> DispatchOutcome {
        self.transport.post(reply.port(), Message::Null);
        DispatchOutcome::NullReply
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::context::ContextTable;
    use crate::runtime::port::PortMap;
    use crate::runtime::service_locator::DisabledServiceLauncher;

    fn dispatcher(caps: Capabilities) -> (ControlDispatcher, Arc<PortMap>) {
        let ports = Arc::new(PortMap::new());
        let locator = Arc::new(ServiceLocator::new(
            caps,
            Arc::new(ContextTable::new()),
            Box::new(DisabledServiceLauncher),
        ));
        let transport: Arc<dyn PortTransport> = ports.clone();
        (ControlDispatcher::new(caps, locator, transport), ports)
    }

    #[test]
    fn context_id_embeds_port() {
        assert_eq!(format_context_id(PortId(42)), "contexts/42");
    }

    #[test]
    fn id_lookup_answers_locally() {
        let (d, ports) = dispatcher(Capabilities::all());
        let (port, rx) = ports.open_port().unwrap();
        let outcome = d.dispatch(ControlRequest::IdLookup {
            reply: ReplyChannel(port),
            port_id: PortId(42),
        });
        assert_eq!(outcome, DispatchOutcome::Answered);
        assert_eq!(
            rx.try_recv().unwrap(),
            Message::Json(serde_json::json!("contexts/42"))
        );
    }

    #[test]
    fn product_build_replies_null() {
        let (d, ports) = dispatcher(Capabilities::empty());
        let (port, rx) = ports.open_port().unwrap();
        assert_eq!(d.query_server_info(ReplyChannel(port)), DispatchOutcome::NullReply);
        assert_eq!(rx.try_recv().unwrap(), Message::Null);
        assert!(rx.try_recv().is_err());
        assert_eq!(d.context_id_from_port(PortId(1)), None);
    }

    #[test]
    fn request_serializes_with_kind_tag() {
        let req = ControlRequest::WebServerControl {
            reply: ReplyChannel(PortId(3)),
            enable: true,
            silence_output: None,
        };
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["kind"], "web_server_control");
        assert_eq!(v["reply"], 3);
        assert_eq!(serde_json::from_value::<ControlRequest>(v).unwrap(), req);
    }
}
