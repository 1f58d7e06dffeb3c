//! Client certificate loading.

use std::path::Path;

use native_tls::Identity;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// The PKCS#12 client identity presented during the TLS handshake.
///
/// Loaded eagerly so that a missing container or a bad passphrase
/// fails before any network I/O happens.
#[derive(Clone)]
pub struct ClientIdentity {
    identity: Identity,
}

impl ClientIdentity {
    /// Loads an identity from a PKCS#12 container file.
    pub fn from_pkcs12_file(
        path: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> ClientResult<Self> {
        let path = path.as_ref();
        let der = std::fs::read(path).map_err(|e| {
            ClientError::Identity(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_pkcs12_der(&der, passphrase)
    }

    /// Loads an identity from PKCS#12 container bytes.
    pub fn from_pkcs12_der(der: &[u8], passphrase: Option<&str>) -> ClientResult<Self> {
        let identity = Identity::from_pkcs12(der, passphrase.unwrap_or("")).map_err(|e| {
            ClientError::Identity(format!("failed to parse PKCS#12 container: {}", e))
        })?;
        debug!("client identity loaded");
        Ok(Self { identity })
    }

    /// Returns the underlying TLS identity.
    pub(crate) fn as_tls_identity(&self) -> &Identity {
        &self.identity
    }
}

impl std::fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientIdentity").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_fails_before_any_network_io() {
        let result = ClientIdentity::from_pkcs12_file("/nonexistent/certificate.pfx", None);
        assert!(matches!(result, Err(ClientError::Identity(_))));
    }

    #[test]
    fn garbage_container_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a pkcs12 container").unwrap();

        let result = ClientIdentity::from_pkcs12_file(file.path(), Some("passphrase"));
        assert!(matches!(result, Err(ClientError::Identity(_))));
    }
}
