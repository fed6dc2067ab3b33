//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and configuration stores so
//! clients can bubble them up with consistent context. Execution failures
//! have their own type because they never involve the workers.

use attribute_core::StatusType;
use thiserror::Error;
use tokio::sync::oneshot;

pub use crate::config::ConfigError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("worker command channel closed")]
    CommandChannelClosed,

    #[error("worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("attribute {name:?} is not registered")]
    UnknownAttribute { name: String },
}

/// Failure of a single attribute execution.
///
/// Fatal to that execution only; dispatch records it and moves on to the
/// next attribute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecuteError {
    #[error("attribute {attribute} handles {expected} events but was given {actual}")]
    DispatchMismatch {
        attribute: String,
        expected: StatusType,
        actual: StatusType,
    },
}
