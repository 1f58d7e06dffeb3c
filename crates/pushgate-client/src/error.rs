//! Client error types.

use std::fmt;

use pushgate_protocol::ProtocolError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Failed to load the PKCS#12 client identity.
    Identity(String),
    /// TCP connection to the gateway failed.
    Connection(String),
    /// TLS handshake or stream error.
    Tls(String),
    /// IO error on the established stream.
    Io(std::io::Error),
    /// Wire encoding or decoding error.
    Protocol(ProtocolError),
    /// Operation attempted on a disconnected session.
    NotConnected,
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity(msg) => write!(f, "identity error: {}", msg),
            Self::Connection(msg) => write!(f, "connection error: {}", msg),
            Self::Tls(msg) => write!(f, "TLS error: {}", msg),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Protocol(err) => write!(f, "protocol error: {}", err),
            Self::NotConnected => write!(f, "session is not connected"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Protocol(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        Self::Protocol(err)
    }
}
