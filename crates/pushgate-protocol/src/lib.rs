//! Wire codecs for the legacy APNs binary push protocol.
//!
//! This crate defines the three byte-level structures the gateway
//! speaks, with no I/O of its own:
//!
//! # Send frame (client -> gateway)
//!
//! A frame is a command byte, a 4-byte big-endian length, and five
//! typed items in fixed order:
//!
//! ```text
//! +-----------+----------------+-------------------------------+
//! | cmd (=2)  | length (4 BE)  | items 1..5                    |
//! +-----------+----------------+-------------------------------+
//!
//! item: | type (1) | length (2 BE) | payload bytes |
//!
//!   1: device token (32 raw bytes)
//!   2: JSON payload
//!   3: sequence id (u32 BE)
//!   4: expiry (u32 BE, seconds since epoch)
//!   5: priority (1 byte)
//! ```
//!
//! # Error response (gateway -> client)
//!
//! Exactly 6 bytes: `cmd (=8) | status | sequence id (u32 BE)`. The
//! gateway only speaks when something went wrong; silence within the
//! read deadline is the success signal.
//!
//! # Feedback tuple (feedback service -> client)
//!
//! Repeated 38-byte records: `timestamp (u32 BE) | token length
//! (u16 BE, informational) | token (32 raw bytes)`.

mod error;
mod feedback;
mod frame;
mod notification;
mod response;

pub use error::{ProtocolError, ProtocolResult};
pub use feedback::FeedbackRecord;
pub use frame::{DecodedFrame, decode_frame, encode_frame, encode_frame_with_expiry};
pub use notification::{Alert, Notification};
pub use response::{ErrorResponse, status_description};

/// Command byte prefixing every send frame.
pub const SEND_COMMAND: u8 = 2;

/// Command byte prefixing every gateway error response.
pub const ERROR_COMMAND: u8 = 8;

/// Maximum serialized JSON payload per notification (2 KB).
pub const MAX_PAYLOAD_SIZE: u16 = 2048;

/// Raw device token length in bytes.
pub const DEVICE_TOKEN_LEN: usize = 32;

/// Device token length as a hex string.
pub const DEVICE_TOKEN_HEX_LEN: usize = 64;

/// Size of the gateway error response tuple.
pub const ERROR_RESPONSE_LEN: usize = 6;

/// Size of one feedback service record.
pub const FEEDBACK_TUPLE_LEN: usize = 38;

/// Priority written in item 5 of every frame.
pub const DEFAULT_PRIORITY: u8 = 5;
