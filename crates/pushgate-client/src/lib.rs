//! Gateway client for the legacy APNs binary push protocol.
//!
//! This crate owns the networking side: the mutual-TLS session, the
//! send/paging loop, the timeout-bounded error-response reader, and
//! the feedback-stream reader. Wire codecs live in
//! `pushgate-protocol`.

pub mod ack;
pub mod cli;
pub mod dispatch;
pub mod endpoint;
pub mod error;
pub mod feedback;
pub mod identity;
pub mod session;
pub mod transport;

pub use cli::Cli;
pub use endpoint::{Endpoint, Environment, Service};
pub use error::{ClientError, ClientResult};
pub use identity::ClientIdentity;
pub use session::{RESPONSE_DEADLINE, Session};
pub use transport::{ReadOutcome, Transport};
