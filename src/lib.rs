// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.1
// Date Modified: 2026-10-19
// Author: Lukas Bower

//! Service control and extension dispatch for multi-context runtimes.
//!
//! Execution contexts register named extension handlers, forward diagnostic
//! events toward a singleton service context, and send it control requests
//! that are answered asynchronously on one-shot reply channels.

/// Build and embedding configuration
pub mod config;

/// Developer-facing entry points
pub mod developer;

/// Shared error type
pub mod error;

/// Execution contexts, ports, heap epochs and the service locator
pub mod runtime;

/// Control dispatch, event forwarding and the service host
pub mod services;

pub use config::{Capabilities, RuntimeConfig};
pub use developer::{Developer, LogFields};
pub use error::{DevError, DevResult};
pub use runtime::{initialize_runtime_env, Runtime};
