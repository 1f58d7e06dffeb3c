//! Send-frame encoding and decoding.
//!
//! A frame carries one notification as five typed items behind a
//! command byte and a 4-byte big-endian body length. All multi-byte
//! integers on the wire are big-endian.

use chrono::{DateTime, Months, TimeZone, Utc};
use serde_json::Value;

use crate::error::{ProtocolError, ProtocolResult};
use crate::notification::Notification;
use crate::{DEVICE_TOKEN_HEX_LEN, DEVICE_TOKEN_LEN, MAX_PAYLOAD_SIZE, SEND_COMMAND};

const ITEM_DEVICE_TOKEN: u8 = 1;
const ITEM_PAYLOAD: u8 = 2;
const ITEM_SEQUENCE_ID: u8 = 3;
const ITEM_EXPIRY: u8 = 4;
const ITEM_PRIORITY: u8 = 5;

/// Encodes a notification into a complete frame ready to write.
///
/// The expiry is set to one month from now, matching the gateway's
/// store-and-forward window.
pub fn encode_frame(notification: &Notification, sequence_id: u32) -> ProtocolResult<Vec<u8>> {
    let expiry = Utc::now() + Months::new(1);
    encode_frame_with_expiry(notification, sequence_id, expiry)
}

/// Encodes a notification with an explicit expiry timestamp.
///
/// Fails on a malformed device token or an oversize JSON payload;
/// neither condition is ever written to the wire.
pub fn encode_frame_with_expiry(
    notification: &Notification,
    sequence_id: u32,
    expiry: DateTime<Utc>,
) -> ProtocolResult<Vec<u8>> {
    if notification.device_token.len() != DEVICE_TOKEN_HEX_LEN {
        return Err(ProtocolError::InvalidTokenLength {
            len: notification.device_token.len(),
        });
    }
    let token = hex::decode(&notification.device_token)?;

    let payload = notification.to_json()?;
    if payload.len() > MAX_PAYLOAD_SIZE as usize {
        return Err(ProtocolError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD_SIZE as usize,
        });
    }

    let mut body = Vec::with_capacity(DEVICE_TOKEN_LEN + payload.len() + 30);
    push_item(&mut body, ITEM_DEVICE_TOKEN, &token);
    push_item(&mut body, ITEM_PAYLOAD, payload.as_bytes());
    push_item(&mut body, ITEM_SEQUENCE_ID, &sequence_id.to_be_bytes());
    push_item(
        &mut body,
        ITEM_EXPIRY,
        &(expiry.timestamp() as u32).to_be_bytes(),
    );
    push_item(&mut body, ITEM_PRIORITY, &[crate::DEFAULT_PRIORITY]);

    let mut frame = Vec::with_capacity(5 + body.len());
    frame.push(SEND_COMMAND);
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

fn push_item(buffer: &mut Vec<u8>, item_type: u8, payload: &[u8]) {
    buffer.push(item_type);
    buffer.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    buffer.extend_from_slice(payload);
}

/// A frame decoded back into its constituent items.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Device token as lowercase hex.
    pub device_token: String,
    /// Parsed JSON payload.
    pub payload: Value,
    /// Sequence id (item 3).
    pub sequence_id: u32,
    /// Expiry timestamp (item 4).
    pub expiry: DateTime<Utc>,
    /// Priority byte (item 5).
    pub priority: u8,
}

/// Decodes a complete frame produced by [`encode_frame`].
pub fn decode_frame(data: &[u8]) -> ProtocolResult<DecodedFrame> {
    if data.len() < 5 {
        return Err(ProtocolError::MalformedFrame(format!(
            "frame header needs 5 bytes, got {}",
            data.len()
        )));
    }
    if data[0] != SEND_COMMAND {
        return Err(ProtocolError::UnexpectedCommand { command: data[0] });
    }

    let body_len = u32::from_be_bytes(data[1..5].try_into().expect("4-byte slice")) as usize;
    let body = &data[5..];
    if body.len() != body_len {
        return Err(ProtocolError::MalformedFrame(format!(
            "declared body length {body_len}, got {} bytes",
            body.len()
        )));
    }

    let mut device_token = None;
    let mut payload = None;
    let mut sequence_id = None;
    let mut expiry = None;
    let mut priority = None;

    let mut rest = body;
    while !rest.is_empty() {
        if rest.len() < 3 {
            return Err(ProtocolError::MalformedFrame(
                "truncated item header".to_string(),
            ));
        }
        let item_type = rest[0];
        let len = u16::from_be_bytes([rest[1], rest[2]]) as usize;
        rest = &rest[3..];
        if rest.len() < len {
            return Err(ProtocolError::MalformedFrame(format!(
                "item {item_type} declares {len} bytes, {} remain",
                rest.len()
            )));
        }
        let (bytes, tail) = rest.split_at(len);
        rest = tail;

        match item_type {
            ITEM_DEVICE_TOKEN => device_token = Some(hex::encode(bytes)),
            ITEM_PAYLOAD => payload = Some(serde_json::from_slice(bytes)?),
            ITEM_SEQUENCE_ID => {
                sequence_id = Some(u32::from_be_bytes(fixed(bytes, ITEM_SEQUENCE_ID)?));
            }
            ITEM_EXPIRY => {
                let secs = u32::from_be_bytes(fixed(bytes, ITEM_EXPIRY)?);
                expiry = Utc.timestamp_opt(i64::from(secs), 0).single();
            }
            ITEM_PRIORITY => priority = bytes.first().copied(),
            other => {
                return Err(ProtocolError::MalformedFrame(format!(
                    "unknown item type {other}"
                )));
            }
        }
    }

    let missing = |name: &str| ProtocolError::MalformedFrame(format!("missing item: {name}"));
    Ok(DecodedFrame {
        device_token: device_token.ok_or_else(|| missing("device token"))?,
        payload: payload.ok_or_else(|| missing("payload"))?,
        sequence_id: sequence_id.ok_or_else(|| missing("sequence id"))?,
        expiry: expiry.ok_or_else(|| missing("expiry"))?,
        priority: priority.ok_or_else(|| missing("priority"))?,
    })
}

fn fixed(bytes: &[u8], item_type: u8) -> ProtocolResult<[u8; 4]> {
    bytes.try_into().map_err(|_| {
        ProtocolError::MalformedFrame(format!(
            "item {item_type} expects 4 bytes, got {}",
            bytes.len()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    const TOKEN: &str = "334b1ddfc30c4582c497c058c0d94ccfad6409b27fa1ffbf6f3724277ba33e54";

    fn sample() -> Notification {
        Notification::new(TOKEN)
            .alert("hello")
            .badge(2)
            .custom("kind", json!("greeting"))
    }

    #[test]
    fn encode_decode_roundtrip() {
        let before = Utc::now();
        let frame = encode_frame(&sample(), 1042).unwrap();
        let decoded = decode_frame(&frame).unwrap();

        assert_eq!(decoded.device_token, TOKEN);
        assert_eq!(decoded.sequence_id, 1042);
        assert_eq!(decoded.priority, crate::DEFAULT_PRIORITY);
        assert_eq!(decoded.payload["aps"]["alert"]["body"], json!("hello"));
        assert_eq!(decoded.payload["kind"], json!("greeting"));

        // Expiry lands within the one-month window from encode time.
        assert!(decoded.expiry > before + Duration::days(27));
        assert!(decoded.expiry <= before + Duration::days(32));
    }

    #[test]
    fn frame_header_layout() {
        let frame = encode_frame(&sample(), 1000).unwrap();
        assert_eq!(frame[0], SEND_COMMAND);

        let body_len = u32::from_be_bytes([frame[1], frame[2], frame[3], frame[4]]) as usize;
        assert_eq!(body_len, frame.len() - 5);

        // Item 1 opens the body: type 1, length 32, raw token.
        assert_eq!(frame[5], ITEM_DEVICE_TOKEN);
        assert_eq!(u16::from_be_bytes([frame[6], frame[7]]), 32);
        assert_eq!(&frame[8..40], hex::decode(TOKEN).unwrap().as_slice());
    }

    #[test]
    fn items_appear_in_wire_order() {
        let frame = encode_frame(&sample(), 1000).unwrap();
        let mut types = Vec::new();
        let mut rest = &frame[5..];
        while !rest.is_empty() {
            types.push(rest[0]);
            let len = u16::from_be_bytes([rest[1], rest[2]]) as usize;
            rest = &rest[3 + len..];
        }
        assert_eq!(types, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sequence_id_is_big_endian_binary() {
        let frame = encode_frame(&sample(), 0x0102_0304).unwrap();
        // Locate item 3 and check the raw bytes.
        let mut rest = &frame[5..];
        loop {
            let item_type = rest[0];
            let len = u16::from_be_bytes([rest[1], rest[2]]) as usize;
            if item_type == ITEM_SEQUENCE_ID {
                assert_eq!(&rest[3..7], &[1, 2, 3, 4]);
                break;
            }
            rest = &rest[3 + len..];
        }
    }

    #[test]
    fn short_token_is_refused() {
        let result = encode_frame(&Notification::new("deadbeef").alert("hi"), 1000);
        assert!(matches!(
            result,
            Err(ProtocolError::InvalidTokenLength { len: 8 })
        ));
    }

    #[test]
    fn non_hex_token_is_refused() {
        let result = encode_frame(&Notification::new("z".repeat(64)).alert("hi"), 1000);
        assert!(matches!(result, Err(ProtocolError::InvalidTokenHex(_))));
    }

    #[test]
    fn oversize_payload_is_refused() {
        let notification = Notification::new(TOKEN).alert("x".repeat(3000));
        let result = encode_frame(&notification, 1000);
        assert!(matches!(result, Err(ProtocolError::PayloadTooLarge { .. })));
    }

    #[test]
    fn decode_rejects_wrong_command() {
        let mut frame = encode_frame(&sample(), 1000).unwrap();
        frame[0] = 9;
        assert!(matches!(
            decode_frame(&frame),
            Err(ProtocolError::UnexpectedCommand { command: 9 })
        ));
    }

    #[test]
    fn decode_rejects_truncated_body() {
        let frame = encode_frame(&sample(), 1000).unwrap();
        let result = decode_frame(&frame[..frame.len() - 3]);
        assert!(matches!(result, Err(ProtocolError::MalformedFrame(_))));
    }
}
