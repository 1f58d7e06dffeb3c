//! Feedback service reader.
//!
//! The feedback service delivers its backlog of dead tokens as a
//! steady run of fixed-size tuples and then goes idle. Only the first
//! read is deadline-bounded; once data flows, plain reads drain the
//! stream until it ends.

use chrono::Utc;
use pushgate_protocol::{FEEDBACK_TUPLE_LEN, FeedbackRecord};
use tracing::{debug, error, info};

use crate::error::ClientResult;
use crate::session::RESPONSE_DEADLINE;
use crate::transport::{ReadOutcome, Transport};

/// Reads and filters the feedback backlog.
///
/// Connects if needed (a connect failure is fatal for this call),
/// drains tuples until the stream ends, drops entries older than a
/// year, and disconnects on every exit path. Normal exhaustion always
/// yields a list, possibly empty.
pub async fn read_feedback<T: Transport>(transport: &mut T) -> ClientResult<Vec<FeedbackRecord>> {
    info!("connecting to feedback service");
    if !transport.is_connected() {
        if let Err(e) = transport.connect().await {
            error!(error = %e, "failed to connect to feedback service");
            return Err(e);
        }
    }

    let result = drain(transport).await;
    transport.disconnect().await;

    match &result {
        Ok(records) if records.is_empty() => info!("feedback response is empty"),
        Ok(records) => info!(count = records.len(), "feedback records received"),
        Err(e) => error!(error = %e, "error receiving feedback"),
    }
    result
}

async fn drain<T: Transport>(transport: &mut T) -> ClientResult<Vec<FeedbackRecord>> {
    let now = Utc::now();
    let mut records = Vec::new();
    let mut buf = [0u8; FEEDBACK_TUPLE_LEN];

    // The service may have nothing to say; bound the first read the
    // same way the gateway response read is bounded.
    let received = match transport
        .read_with_deadline(&mut buf, RESPONSE_DEADLINE)
        .await?
    {
        ReadOutcome::TimedOut | ReadOutcome::Closed => return Ok(records),
        ReadOutcome::Data(n) => n,
    };
    if received < FEEDBACK_TUPLE_LEN && transport.read_exact(&mut buf[received..]).await? == 0 {
        return Ok(records);
    }

    loop {
        let record = FeedbackRecord::parse(&buf)?;
        if record.is_stale(now) {
            debug!(
                token = %record.device_token,
                timestamp = %record.timestamp,
                "dropping stale feedback entry"
            );
        } else {
            records.push(record);
        }

        if transport.read_exact(&mut buf).await? == 0 {
            return Ok(records);
        }
    }
}
