//! Feedback service tuple.
//!
//! The feedback service streams fixed 38-byte records naming device
//! tokens that should stop receiving notifications, then goes idle.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::FEEDBACK_TUPLE_LEN;
use crate::error::{ProtocolError, ProtocolResult};

/// Entries older than this are treated as stale garbage.
const STALE_AFTER_DAYS: i64 = 365;

/// One feedback record: when the token last failed, and which token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackRecord {
    /// When the feedback service recorded the failure.
    pub timestamp: DateTime<Utc>,
    /// Device token as lowercase hex.
    pub device_token: String,
}

impl FeedbackRecord {
    /// Parses one fixed-size tuple:
    /// `timestamp (u32 BE) | token length (u16 BE) | token (32 bytes)`.
    ///
    /// The length field is informational and not validated against the
    /// token, which is always 32 bytes in this tuple layout.
    pub fn parse(data: &[u8]) -> ProtocolResult<Self> {
        if data.len() < FEEDBACK_TUPLE_LEN {
            return Err(ProtocolError::TruncatedTuple {
                expected: FEEDBACK_TUPLE_LEN,
                received: data.len(),
            });
        }
        let secs = u32::from_be_bytes([data[0], data[1], data[2], data[3]]);
        let timestamp = Utc
            .timestamp_opt(i64::from(secs), 0)
            .single()
            .unwrap_or_default();
        Ok(Self {
            timestamp,
            device_token: hex::encode(&data[6..FEEDBACK_TUPLE_LEN]),
        })
    }

    /// Returns true when this record is older than one year.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.timestamp <= now - Duration::days(STALE_AFTER_DAYS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuple(timestamp: u32, token_byte: u8) -> Vec<u8> {
        let mut data = Vec::with_capacity(FEEDBACK_TUPLE_LEN);
        data.extend_from_slice(&timestamp.to_be_bytes());
        data.extend_from_slice(&32u16.to_be_bytes());
        data.extend_from_slice(&[token_byte; 32]);
        data
    }

    #[test]
    fn parse_valid_tuple() {
        let record = FeedbackRecord::parse(&tuple(1_700_000_000, 0xab)).unwrap();
        assert_eq!(record.timestamp.timestamp(), 1_700_000_000);
        assert_eq!(record.device_token, "ab".repeat(32));
        assert_eq!(record.device_token.len(), 64);
    }

    #[test]
    fn parse_truncated_tuple() {
        let result = FeedbackRecord::parse(&tuple(0, 0)[..20]);
        assert!(matches!(
            result,
            Err(ProtocolError::TruncatedTuple {
                expected: 38,
                received: 20
            })
        ));
    }

    #[test]
    fn staleness_window() {
        let now = Utc::now();
        let yesterday = FeedbackRecord {
            timestamp: now - Duration::days(1),
            device_token: "ab".repeat(32),
        };
        let two_years_ago = FeedbackRecord {
            timestamp: now - Duration::days(730),
            device_token: "cd".repeat(32),
        };
        assert!(!yesterday.is_stale(now));
        assert!(two_years_ago.is_stale(now));
    }
}
