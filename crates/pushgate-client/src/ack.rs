//! Gateway response reader.
//!
//! The gateway never acknowledges success; it only reports failure,
//! and may do so at any point after a send. The reader waits a
//! bounded 750 ms for an error tuple and treats silence as the
//! success signal for everything sent since the last check.

use std::collections::HashMap;

use pushgate_protocol::{ERROR_RESPONSE_LEN, ErrorResponse};
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::error::ClientResult;
use crate::session::RESPONSE_DEADLINE;
use crate::transport::{ReadOutcome, Transport};

/// What the gateway had to say within the response deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayAck {
    /// No response within the deadline; prior writes succeeded.
    Accepted,
    /// The peer closed the connection; fatal for this session.
    ConnectionClosed,
    /// Reading the response failed; the session was dropped but the
    /// caller may carry on over a fresh connection.
    ReadFailed,
    /// The gateway rejected a notification and severed the connection.
    Rejected {
        /// Raw status code from the tuple.
        status: u8,
        /// Sequence id of the rejected notification.
        sequence_id: u32,
        /// Token resolved through the run's id map, if the id is known.
        device_token: Option<String>,
    },
}

/// Polls the session for an error tuple.
///
/// On a rejection or a closed connection the session is disconnected
/// before returning, matching the gateway's behavior of severing the
/// connection after reporting an error.
pub async fn await_response<T: Transport>(
    transport: &mut T,
    sent: &HashMap<u32, String>,
) -> GatewayAck {
    let mut buf = [0u8; ERROR_RESPONSE_LEN];

    let received = match read_tuple(transport, &mut buf).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "failed reading gateway response");
            transport.disconnect().await;
            return GatewayAck::ReadFailed;
        }
    };

    match received {
        ReadOutcome::TimedOut => {
            debug!("no gateway response within deadline");
            GatewayAck::Accepted
        }
        ReadOutcome::Closed => {
            info!("gateway closed the connection");
            transport.disconnect().await;
            GatewayAck::ConnectionClosed
        }
        ReadOutcome::Data(_) => match ErrorResponse::parse(&buf) {
            Ok(response) => {
                let device_token = sent.get(&response.sequence_id).cloned();
                error!(
                    status = response.status,
                    meaning = response.description(),
                    sequence_id = response.sequence_id,
                    token = device_token.as_deref().unwrap_or("<unknown>"),
                    "gateway rejected notification"
                );
                transport.disconnect().await;
                GatewayAck::Rejected {
                    status: response.status,
                    sequence_id: response.sequence_id,
                    device_token,
                }
            }
            Err(e) => {
                error!(error = %e, "malformed gateway response");
                transport.disconnect().await;
                GatewayAck::ConnectionClosed
            }
        },
    }
}

/// Reads the fixed tuple, finishing a partial first read within the
/// same overall deadline.
///
/// A peer that delivers part of a tuple and then stalls must not pin
/// the dispatch loop; once the deadline is spent, a partial tuple is
/// treated the same as a severed connection.
async fn read_tuple<T: Transport>(
    transport: &mut T,
    buf: &mut [u8; ERROR_RESPONSE_LEN],
) -> ClientResult<ReadOutcome> {
    let start = Instant::now();
    let mut filled = 0;

    while filled < ERROR_RESPONSE_LEN {
        let remaining = RESPONSE_DEADLINE.saturating_sub(start.elapsed());
        match transport
            .read_with_deadline(&mut buf[filled..], remaining)
            .await?
        {
            ReadOutcome::TimedOut if filled == 0 => return Ok(ReadOutcome::TimedOut),
            ReadOutcome::TimedOut | ReadOutcome::Closed => return Ok(ReadOutcome::Closed),
            ReadOutcome::Data(n) => filled += n,
        }
    }

    Ok(ReadOutcome::Data(ERROR_RESPONSE_LEN))
}
