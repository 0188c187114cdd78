//! Error types for the gateway crate

use thiserror::Error;

/// Transport-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("event queue is closed")]
    QueueClosed,

    #[error("queue capacity must be greater than zero")]
    ZeroCapacity,
}
