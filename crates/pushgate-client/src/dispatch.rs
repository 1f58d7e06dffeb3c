//! The send/paging loop.
//!
//! Pages the caller's queue into protocol-sized chunks, writes one
//! frame per notification, and consults the response reader after
//! every write. A gateway rejection terminates the whole run; local
//! failures are scoped to a single notification or chunk.

use std::collections::HashMap;

use pushgate_protocol::{Notification, encode_frame};
use tracing::{debug, error, info, warn};

use crate::ack::{GatewayAck, await_response};
use crate::transport::Transport;

/// Maximum pending unacknowledged sends per connection generation.
pub const PAGE_SIZE: usize = 8999;

/// First sequence id of every chunk.
pub const SEQUENCE_BASE: u32 = 1000;

enum ChunkOutcome {
    /// All notifications in the chunk were processed.
    Completed,
    /// The connection dropped mid-chunk; the next chunk reconnects.
    Aborted,
    /// The gateway rejected a notification; the run is over.
    Terminal,
}

/// Sends the queue and returns the device tokens the gateway rejected.
///
/// Processing is sequential: chunks of at most [`PAGE_SIZE`], one
/// in-flight write at a time, the session reused or lazily
/// re-established across chunk boundaries. The session is always
/// disconnected before returning.
pub async fn send<T: Transport>(transport: &mut T, notifications: &[Notification]) -> Vec<String> {
    info!(count = notifications.len(), "notification queue received");

    let mut rejected = Vec::new();
    for chunk in notifications.chunks(PAGE_SIZE) {
        if let ChunkOutcome::Terminal = send_chunk(transport, chunk, &mut rejected).await {
            break;
        }
    }

    transport.disconnect().await;
    rejected
}

async fn send_chunk<T: Transport>(
    transport: &mut T,
    chunk: &[Notification],
    rejected: &mut Vec<String>,
) -> ChunkOutcome {
    // Sequence ids restart at the base each chunk; the map resolves a
    // gateway error tuple back to the offending token.
    let mut sequence_id = SEQUENCE_BASE;
    let mut sent: HashMap<u32, String> = HashMap::new();

    for notification in chunk {
        if !notification.has_valid_token() {
            warn!(
                token = %notification.device_token,
                "invalid device token length, possible simulator entry; skipping"
            );
            continue;
        }

        if !transport.is_connected() {
            if let Err(e) = transport.connect().await {
                error!(error = %e, "connect failed; skipping notification");
                continue;
            }
        }

        let id = sequence_id;
        sequence_id += 1;

        let frame = match encode_frame(notification, id) {
            Ok(frame) => frame,
            Err(e) => {
                error!(
                    token = %notification.device_token,
                    error = %e,
                    "unable to encode notification; skipping"
                );
                continue;
            }
        };
        sent.insert(id, notification.device_token.clone());

        if let Err(e) = transport.write_all(&frame).await {
            error!(
                token = %notification.device_token,
                error = %e,
                "error sending notification"
            );
            transport.disconnect().await;
            continue;
        }

        match await_response(transport, &sent).await {
            GatewayAck::Accepted => {
                debug!(token = %notification.device_token, "notification sent");
            }
            GatewayAck::ConnectionClosed => return ChunkOutcome::Aborted,
            GatewayAck::ReadFailed => {
                // Session already dropped; the next iteration reconnects.
            }
            GatewayAck::Rejected { device_token, .. } => {
                if let Some(token) = device_token {
                    rejected.push(token);
                }
                return ChunkOutcome::Terminal;
            }
        }
    }

    ChunkOutcome::Completed
}
