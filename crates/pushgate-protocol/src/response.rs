//! Gateway error-response tuple.
//!
//! The gateway stays silent while sends succeed. When it rejects a
//! notification it writes one 6-byte tuple and severs the connection.

use crate::error::{ProtocolError, ProtocolResult};
use crate::{ERROR_COMMAND, ERROR_RESPONSE_LEN};

/// A parsed gateway rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Status code; see [`status_description`].
    pub status: u8,
    /// Sequence id of the rejected notification, big-endian on the wire.
    pub sequence_id: u32,
}

impl ErrorResponse {
    /// Parses the fixed 6-byte tuple: `command | status | sequence id`.
    pub fn parse(data: &[u8]) -> ProtocolResult<Self> {
        if data.len() < ERROR_RESPONSE_LEN {
            return Err(ProtocolError::TruncatedResponse {
                expected: ERROR_RESPONSE_LEN,
                received: data.len(),
            });
        }
        if data[0] != ERROR_COMMAND {
            return Err(ProtocolError::UnexpectedCommand { command: data[0] });
        }
        Ok(Self {
            status: data[1],
            sequence_id: u32::from_be_bytes([data[2], data[3], data[4], data[5]]),
        })
    }

    /// Human-readable meaning of this status code.
    pub fn description(&self) -> &'static str {
        status_description(self.status)
    }
}

/// Returns the documented meaning of a gateway status code.
///
/// Unknown codes map to a fallback string rather than failing lookup.
pub fn status_description(status: u8) -> &'static str {
    match status {
        0 => "No errors encountered",
        1 => "Processing error",
        2 => "Missing device token",
        3 => "Missing topic",
        4 => "Missing payload",
        5 => "Invalid token size",
        6 => "Invalid topic size",
        7 => "Invalid payload size",
        8 => "Invalid token",
        10 => "Shutdown",
        255 => "None (unknown)",
        _ => "Unrecognized status",
    }
}
