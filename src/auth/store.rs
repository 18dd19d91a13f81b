//! Credential store: Persists the authentication token across runs.
//!
//! The token is opaque to the client. It is written with an absolute
//! expiry 24 hours out, and a load past that expiry behaves as if no
//! token were stored, the same way a cookie jar drops an aged-out
//! same-site cookie. Whether an unexpired token is still *valid* is the
//! server's call; a rejection simply routes through the normal
//! re-authentication path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Cookie name under which the token rides the connection request.
pub const CREDENTIAL_COOKIE: &str = "Taillight-Token";

/// Validity window of a stored token, in seconds.
pub const CREDENTIAL_TTL_SECS: i64 = 86_400;

/// Errors from reading or writing the credential file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The credential file could not be read or written.
    #[error("credential file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The credential file held something other than a stored credential.
    #[error("credential file is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// On-disk shape of a persisted credential.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCredential {
    /// The opaque token.
    token: String,
    /// Absolute expiry; past this the credential is treated as absent.
    expires_at: DateTime<Utc>,
}

/// File-backed token storage with a bounded lifetime.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    /// Location of the credential file.
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store over the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The conventional per-user location for the credential file.
    ///
    /// Returns `None` when the platform exposes no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("taillight").join("credential.json"))
    }

    /// The path this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist a token, overwriting any previous one.
    ///
    /// The expiry is stamped at write time, 24 hours out.
    pub fn save(&self, token: &str) -> Result<(), StoreError> {
        let credential = StoredCredential {
            token: token.to_string(),
            expires_at: Utc::now() + chrono::Duration::seconds(CREDENTIAL_TTL_SECS),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&credential)?)?;

        debug!(path = %self.path.display(), "credential saved");
        Ok(())
    }

    /// Load the stored token.
    ///
    /// Returns `Ok(None)` when no credential file exists or the stored
    /// token has expired.
    pub fn load(&self) -> Result<Option<String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let credential: StoredCredential = serde_json::from_str(&raw)?;
        if credential.expires_at <= Utc::now() {
            debug!(path = %self.path.display(), "stored credential has expired");
            return Ok(None);
        }

        Ok(Some(credential.token))
    }
}
