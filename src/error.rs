// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-19

//! Error type shared by the developer service subsystem.

use thiserror::Error;

use crate::runtime::context::ContextId;

/// Errors produced by runtime and developer-service operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DevError {
    /// The embedding or build cannot perform the requested operation.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    #[error("runtime table lock poisoned")]
    LockPoisoned,
    /// Raised by service launchers. Never surfaced to developer callers.
    #[error("service context unavailable: {0}")]
    ServiceUnavailable(String),
    #[error("unknown execution context {0}")]
    UnknownContext(ContextId),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type DevResult<T> = Result<T, DevError>;
