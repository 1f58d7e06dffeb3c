//! Mutual-TLS transport session.
//!
//! A session owns the TCP socket and the encrypted stream together:
//! both come up atomically in `connect` and are released together in
//! `disconnect`. The gateway trust model is mutual authentication via
//! the client certificate; the server certificate chain is
//! intentionally not verified.

use std::time::Duration;

use native_tls::TlsConnector as NativeTlsConnector;
use socket2::{SockRef, TcpKeepalive};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_native_tls::{TlsConnector, TlsStream};
use tracing::{debug, error, info, warn};

use crate::endpoint::Endpoint;
use crate::error::{ClientError, ClientResult};
use crate::identity::ClientIdentity;
use crate::transport::{ReadOutcome, Transport};

/// How long a read waits for a gateway response before treating
/// silence as success.
pub const RESPONSE_DEADLINE: Duration = Duration::from_millis(750);

/// TCP keepalive idle time and probe interval.
const KEEPALIVE_TIME: Duration = Duration::from_secs(5);
const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(5);

/// A connection to one gateway or feedback endpoint.
///
/// Created unconnected; may be reconnected after a disconnect. Not
/// shared across concurrent dispatch loops.
pub struct Session {
    endpoint: Endpoint,
    identity: ClientIdentity,
    stream: Option<TlsStream<TcpStream>>,
}

impl Session {
    /// Creates an unconnected session for the given endpoint.
    pub fn new(endpoint: Endpoint, identity: ClientIdentity) -> Self {
        Self {
            endpoint,
            identity,
            stream: None,
        }
    }

    /// Returns the endpoint this session talks to.
    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    async fn open_stream(&self) -> ClientResult<TlsStream<TcpStream>> {
        info!(endpoint = %self.endpoint, "connecting to gateway");

        let tcp = TcpStream::connect((self.endpoint.host(), self.endpoint.port()))
            .await
            .map_err(|e| {
                ClientError::Connection(format!("failed to connect to {}: {}", self.endpoint, e))
            })?;

        // Keepalive helps detect a silently dropped line; failing to
        // set it is never fatal.
        let keepalive = TcpKeepalive::new()
            .with_time(KEEPALIVE_TIME)
            .with_interval(KEEPALIVE_INTERVAL);
        if let Err(e) = SockRef::from(&tcp).set_tcp_keepalive(&keepalive) {
            warn!(error = %e, "failed to set TCP keepalive");
        }

        let connector = NativeTlsConnector::builder()
            .identity(self.identity.as_tls_identity().clone())
            .danger_accept_invalid_certs(true)
            .danger_accept_invalid_hostnames(true)
            .build()
            .map_err(|e| ClientError::Tls(format!("failed to build TLS connector: {}", e)))?;

        let stream = TlsConnector::from(connector)
            .connect(self.endpoint.host(), tcp)
            .await
            .map_err(|e| ClientError::Tls(format!("TLS handshake failed: {}", e)))?;

        info!(endpoint = %self.endpoint, "connected");
        Ok(stream)
    }

    fn stream(&mut self) -> ClientResult<&mut TlsStream<TcpStream>> {
        self.stream.as_mut().ok_or(ClientError::NotConnected)
    }
}

impl Transport for Session {
    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    async fn connect(&mut self) -> ClientResult<()> {
        if self.stream.is_some() {
            return Ok(());
        }
        match self.open_stream().await {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                error!(endpoint = %self.endpoint, error = %e, "connect failed");
                Err(e)
            }
        }
    }

    async fn disconnect(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            // Socket and stream are released together; a failed
            // shutdown is logged and otherwise ignored.
            if let Err(e) = stream.shutdown().await {
                debug!(error = %e, "stream shutdown failed");
            }
            info!(endpoint = %self.endpoint, "disconnected");
        }
    }

    async fn write_all(&mut self, buf: &[u8]) -> ClientResult<()> {
        let stream = self.stream()?;
        stream.write_all(buf).await?;
        stream.flush().await?;
        Ok(())
    }

    async fn read_with_deadline(
        &mut self,
        buf: &mut [u8],
        deadline: Duration,
    ) -> ClientResult<ReadOutcome> {
        let stream = self.stream()?;
        timed_read(stream, buf, deadline).await
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> ClientResult<usize> {
        let stream = self.stream()?;
        read_full(stream, buf).await
    }
}

/// Reads available bytes, waiting at most `deadline`.
///
/// A cancellable timed wait over the async read; absence of data
/// within the deadline is an outcome, not an error, because the
/// gateway only speaks on failure.
async fn timed_read<S>(
    stream: &mut S,
    buf: &mut [u8],
    deadline: Duration,
) -> ClientResult<ReadOutcome>
where
    S: AsyncRead + Unpin,
{
    match tokio::time::timeout(deadline, stream.read(buf)).await {
        Err(_) => Ok(ReadOutcome::TimedOut),
        Ok(Ok(0)) => Ok(ReadOutcome::Closed),
        Ok(Ok(n)) => Ok(ReadOutcome::Data(n)),
        Ok(Err(e)) => Err(e.into()),
    }
}

/// Fills the buffer completely; returns 0 if the stream ends first.
async fn read_full<S>(stream: &mut S, buf: &mut [u8]) -> ClientResult<usize>
where
    S: AsyncRead + Unpin,
{
    match stream.read_exact(buf).await {
        Ok(n) => Ok(n),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(0),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn timed_read_times_out_on_silence() {
        let (_tx, mut rx) = tokio::io::duplex(64);
        let mut buf = [0u8; 6];
        let outcome = timed_read(&mut rx, &mut buf, RESPONSE_DEADLINE)
            .await
            .unwrap();
        assert_eq!(outcome, ReadOutcome::TimedOut);
    }

    #[tokio::test]
    async fn timed_read_returns_available_data() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tx.write_all(&[8, 8, 0, 0, 3, 233]).await.unwrap();

        let mut buf = [0u8; 6];
        let outcome = timed_read(&mut rx, &mut buf, RESPONSE_DEADLINE)
            .await
            .unwrap();
        assert_eq!(outcome, ReadOutcome::Data(6));
        assert_eq!(buf, [8, 8, 0, 0, 3, 233]);
    }

    #[tokio::test]
    async fn timed_read_reports_peer_close() {
        let (tx, mut rx) = tokio::io::duplex(64);
        drop(tx);

        let mut buf = [0u8; 6];
        let outcome = timed_read(&mut rx, &mut buf, RESPONSE_DEADLINE)
            .await
            .unwrap();
        assert_eq!(outcome, ReadOutcome::Closed);
    }

    #[tokio::test]
    async fn read_full_returns_zero_on_eof() {
        let (tx, mut rx) = tokio::io::duplex(64);
        drop(tx);

        let mut buf = [0u8; 38];
        assert_eq!(read_full(&mut rx, &mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn read_full_fills_buffer_across_writes() {
        let (mut tx, mut rx) = tokio::io::duplex(64);
        tokio::spawn(async move {
            tx.write_all(&[1u8; 20]).await.unwrap();
            tx.write_all(&[2u8; 18]).await.unwrap();
        });

        let mut buf = [0u8; 38];
        assert_eq!(read_full(&mut rx, &mut buf).await.unwrap(), 38);
        assert_eq!(&buf[..20], &[1u8; 20]);
        assert_eq!(&buf[20..], &[2u8; 18]);
    }
}
