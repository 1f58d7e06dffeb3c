//! The transport seam between the protocol loops and the TLS session.
//!
//! The dispatch and feedback loops only need a handful of operations
//! from the session, expressed here as a trait so the loops can be
//! exercised against a scripted peer in tests.

use std::time::Duration;

use crate::error::ClientResult;

/// Outcome of a deadline-bounded read.
///
/// The protocol has no positive acknowledgment, so "no data within the
/// deadline" is a first-class outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// N bytes were read into the buffer.
    Data(usize),
    /// The deadline elapsed with no bytes available.
    TimedOut,
    /// The peer closed the connection (zero-length read).
    Closed,
}

/// Operations the dispatch and feedback loops need from a session.
///
/// Single-writer, single-reader discipline: one outstanding connect,
/// write or read at a time.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Returns true when a live stream is held.
    fn is_connected(&self) -> bool;

    /// Establishes the connection; no-op when already connected.
    async fn connect(&mut self) -> ClientResult<()>;

    /// Releases the connection; idempotent, never fails.
    async fn disconnect(&mut self);

    /// Writes the whole buffer to the stream.
    async fn write_all(&mut self, buf: &[u8]) -> ClientResult<()>;

    /// Reads available bytes, waiting at most `deadline`.
    async fn read_with_deadline(
        &mut self,
        buf: &mut [u8],
        deadline: Duration,
    ) -> ClientResult<ReadOutcome>;

    /// Fills the buffer from the stream; returns 0 on clean EOF.
    async fn read_exact(&mut self, buf: &mut [u8]) -> ClientResult<usize>;
}

#[cfg(test)]
mod tests {
    use super::Transport;
    use super::testing::ScriptedTransport;

    #[tokio::test]
    async fn disconnect_is_idempotent() {
        let mut transport = ScriptedTransport::new();
        transport.connect().await.unwrap();

        transport.disconnect().await;
        transport.disconnect().await;

        assert!(!transport.is_connected());
        assert_eq!(transport.disconnects, 1);
    }
}
