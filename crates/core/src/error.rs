//! Error taxonomy for order processing.

use thiserror::Error;

use crate::id::WarehouseId;

/// Result type used across the processing pipeline.
pub type ProcessResult<T> = Result<T, ProcessError>;

/// Failure kinds a single order-processing run can surface.
///
/// The split matters to the caller: `BadTrigger` and `NotFound` are client
/// errors and must not be retried; `Transient` is safe to re-trigger for the
/// same order id; `Mutation` needs an operator (the decision was computed
/// but could not be applied or verified).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// Inbound event was malformed or carried no usable order reference.
    #[error("bad trigger: {0}")]
    BadTrigger(String),

    /// The referenced order does not exist on the backend.
    #[error("order not found")]
    NotFound,

    /// Network/timeout/5xx from the order or inventory backend.
    #[error("backend unavailable: {0}")]
    Transient(String),

    /// The warehouse write failed, or read-after-write did not confirm it.
    #[error("warehouse write to {target} failed: {message}")]
    Mutation {
        target: WarehouseId,
        message: String,
    },
}

impl ProcessError {
    pub fn bad_trigger(msg: impl Into<String>) -> Self {
        Self::BadTrigger(msg.into())
    }

    pub fn transient(msg: impl Into<String>) -> Self {
        Self::Transient(msg.into())
    }

    pub fn mutation(target: WarehouseId, msg: impl Into<String>) -> Self {
        Self::Mutation {
            target,
            message: msg.into(),
        }
    }

    /// Client-class failure (caller's trigger is at fault, retry is useless).
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::BadTrigger(_) | Self::NotFound)
    }
}
