//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding wire structures.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Device token hex string has the wrong length.
    #[error("invalid device token length: {len} characters (expected 64)")]
    InvalidTokenLength { len: usize },

    /// Device token is not valid hex.
    #[error("invalid device token hex: {0}")]
    InvalidTokenHex(#[from] hex::FromHexError),

    /// Serialized JSON payload exceeds the protocol ceiling.
    #[error("payload too large: {size} bytes (max: {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Failed to serialize the notification payload to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Gateway response shorter than the fixed tuple size.
    #[error("truncated error response: expected {expected} bytes, got {received}")]
    TruncatedResponse { expected: usize, received: usize },

    /// Feedback record shorter than the fixed tuple size.
    #[error("truncated feedback tuple: expected {expected} bytes, got {received}")]
    TruncatedTuple { expected: usize, received: usize },

    /// Message carries a command byte this protocol does not define.
    #[error("unexpected command byte: {command}")]
    UnexpectedCommand { command: u8 },

    /// Frame body does not match the declared item layout.
    #[error("malformed frame: {0}")]
    MalformedFrame(String),
}
