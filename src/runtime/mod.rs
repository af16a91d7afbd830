// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Runtime subsystem modules

pub mod context;

pub mod env;

pub mod extension_registry;

pub mod heap;

pub mod port;

pub mod service_locator;

pub mod snapshot;

pub use context::{ContextGroup, ContextId, ContextTable, ExecutionContext, PauseHook};
pub use env::init::{initialize_runtime_env, Runtime};
pub use extension_registry::{ExtensionHandler, ExtensionRegistry, HandlerRef};
pub use port::{Message, PortId, PortMap, PortReceiver, PortTransport, ReplyChannel};
pub use service_locator::{ServiceContextState, ServiceEndpoint, ServiceLauncher, ServiceLocator};
