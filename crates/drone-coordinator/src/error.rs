//! Coordinator-level error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("failed to bind coordinator transport: {0}")]
    TransportBind(#[source] std::io::Error),

    #[error("no known address for drone id '{0}'")]
    UnknownDroneAddress(String),

    #[error("network send failed: {0}")]
    Send(#[source] std::io::Error),
}

pub type CoordinatorResult<T> = std::result::Result<T, CoordinatorError>;
