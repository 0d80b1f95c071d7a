//! Wire codec and transport error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("datagram too short: expected at least {expected} tokens, got {got}")]
    TooShort { expected: usize, got: usize },

    #[error("invalid token '{token}' in field '{field}'")]
    InvalidToken { field: &'static str, token: String },

    #[error("trailing coordinates are not integers: {0}")]
    InvalidCoordinates(String),

    #[error("datagram is not valid UTF-8")]
    NotUtf8,
}

pub type ProtocolResult<T> = std::result::Result<T, ProtocolError>;
