// CLASSIFICATION: COMMUNITY
// Filename: developer.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Developer-facing entry points.
//!
//! Each call runs synchronously on behalf of the calling
//! [`ExecutionContext`]. Degraded builds never raise errors here; they
//! return the documented fallback instead. The only visible failure is
//! [`DevError::UnsupportedOperation`] from [`Developer::write_heap_snapshot`].

use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use serde::Serialize;

use crate::config::Capabilities;
use crate::error::{DevError, DevResult};
use crate::runtime::context::ExecutionContext;
use crate::runtime::extension_registry::HandlerRef;
use crate::runtime::port::{PortId, ReplyChannel};
use crate::runtime::service_locator::ServiceLocator;
use crate::runtime::snapshot::{HeapSnapshotSummary, HeapSnapshotWriter};
use crate::services::control::{
    ControlDispatcher, SERVICE_PROTOCOL_MAJOR_VERSION, SERVICE_PROTOCOL_MINOR_VERSION,
};
use crate::services::events::{EventForwarder, LogRecord};

const SNAPSHOT_COMPILED_OUT: &str = "Heap snapshots are only supported in non-product mode.";
const SNAPSHOT_WRITE_FAILED: &str =
    "Could not create & write heapsnapshot to disc. Possibly due to missing embedder functionality.";

/// Fields of a structured log call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFields<'a> {
    pub message: &'a str,
    pub timestamp: i64,
    pub sequence: i64,
    pub level: i32,
    pub name: &'a str,
    pub zone: Option<&'a str>,
    pub error: Option<&'a str>,
    pub stack_trace: Option<&'a str>,
}

pub struct Developer {
    capabilities: Capabilities,
    locator: Arc<ServiceLocator>,
    dispatcher: ControlDispatcher,
    forwarder: Arc<EventForwarder>,
    snapshots: Box<dyn HeapSnapshotWriter>,
}

impl Developer {
    pub fn new(
        capabilities: Capabilities,
        locator: Arc<ServiceLocator>,
        dispatcher: ControlDispatcher,
        forwarder: Arc<EventForwarder>,
        snapshots: Box<dyn HeapSnapshotWriter>,
    ) -> Self {
        Self {
            capabilities,
            locator,
            dispatcher,
            forwarder,
            snapshots,
        }
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Pause `ctx` in the debugger when `enable` is set. Echoes `enable`.
    pub fn set_breakpoint_on_next_pause(
        &self,
        ctx: &ExecutionContext,
        enable: bool,
        message: Option<&str>,
    ) -> bool {
        if !enable || !self.capabilities.debugger() {
            return enable;
        }
        if let Some(debugger) = ctx.debugger() {
            debugger.pause_developer(ctx.id(), message);
        }
        enable
    }

    pub fn notify_inspect<T: Serialize>(&self, ctx: &ExecutionContext, value: T) -> T {
        self.forwarder.forward_inspect(ctx.id(), value)
    }

    pub fn emit_log(&self, ctx: &ExecutionContext, fields: LogFields<'_>) {
        self.forwarder.forward_log(LogRecord {
            context: ctx.id(),
            sequence: fields.sequence,
            timestamp: fields.timestamp,
            level: fields.level,
            name: fields.name.to_string(),
            message: fields.message.to_string(),
            zone: fields.zone.map(str::to_string),
            error: fields.error.map(str::to_string),
            stack_trace: fields.stack_trace.map(str::to_string),
        });
    }

    pub fn emit_event(&self, ctx: &ExecutionContext, kind: &str, data: &str) {
        self.forwarder.forward_event(ctx.id(), kind, data);
    }

    pub fn lookup_handler(&self, ctx: &ExecutionContext, name: &str) -> Option<HandlerRef> {
        if !self.capabilities.contains(Capabilities::DIAGNOSTICS) {
            return None;
        }
        ctx.registry().lookup(name)
    }

    /// Register `handler` under `name` for `ctx`.
    ///
    /// Silently ignored for the service context and anything spawned from
    /// it, and when diagnostics are compiled out.
    pub fn register_handler(&self, ctx: &mut ExecutionContext, name: &str, handler: HandlerRef) {
        if !self.capabilities.contains(Capabilities::DIAGNOSTICS) {
            return;
        }
        if self.locator.is_descendant(ctx.id()) {
            debug!("ignoring extension {:?} from service context {}", name, ctx.id());
            return;
        }
        ctx.registry_mut().register(name, handler);
    }

    /// `(major, minor)`, or `(0, 0)` when diagnostics are compiled out.
    pub fn service_protocol_version(&self) -> (u32, u32) {
        if self.capabilities.contains(Capabilities::DIAGNOSTICS) {
            (SERVICE_PROTOCOL_MAJOR_VERSION, SERVICE_PROTOCOL_MINOR_VERSION)
        } else {
            (0, 0)
        }
    }

    /// Ask for server info; the answer arrives on `reply`.
    pub fn query_server_info(&self, reply: ReplyChannel) {
        self.dispatcher.query_server_info(reply);
    }

    pub fn control_web_server(&self, reply: ReplyChannel, enable: bool, silence_output: Option<bool>) {
        self.dispatcher.control_web_server(reply, enable, silence_output);
    }

    pub fn context_id_from_port(&self, port: PortId) -> Option<String> {
        self.dispatcher.context_id_from_port(port)
    }

    pub fn current_heap_epoch(&self, ctx: &ExecutionContext) -> u64 {
        ctx.group().heap().reachability_barrier()
    }

    /// Hex build id of the loaded ahead-of-time instructions.
    pub fn build_identifier(&self, ctx: &ExecutionContext) -> Option<String> {
        if !self.capabilities.contains(Capabilities::PRECOMPILED) {
            return None;
        }
        ctx.group().build_id().map(hex::encode)
    }

    pub fn write_heap_snapshot(&self, ctx: &ExecutionContext, path: &Path) -> DevResult<()> {
        if !self.capabilities.contains(Capabilities::HEAP_SNAPSHOT_WRITER) {
            return Err(DevError::UnsupportedOperation(SNAPSHOT_COMPILED_OUT.into()));
        }
        if !self.capabilities.contains(Capabilities::FILE_WRITE) {
            return Err(DevError::UnsupportedOperation(SNAPSHOT_WRITE_FAILED.into()));
        }
        let summary = HeapSnapshotSummary::capture(ctx.group());
        self.snapshots
            .write(&summary, path)
            .map_err(|_| DevError::UnsupportedOperation(SNAPSHOT_WRITE_FAILED.into()))?;
        info!("heap snapshot of group {} written to {}", summary.group, path.display());
        Ok(())
    }
}
