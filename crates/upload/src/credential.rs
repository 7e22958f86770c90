//! Bearer credential sources.
//!
//! The transport asks its source for the credential on every attempt, so a
//! token rotated by the session layer mid-upload is picked up by the next
//! chunk. Chunks are never sent concurrently, which keeps that safe.

use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use tracing::{debug, warn};

/// Supplies the bearer credential attached to chunk requests.
pub trait CredentialSource: Send + Sync {
    /// Returns the credential to use right now, if any.
    fn current(&self) -> Option<String>;

    /// Called when the server rejected `rejected` (HTTP 401).
    ///
    /// The credential may have been rotated while the request was in
    /// flight; only `rejected` itself may be discarded.
    fn invalidate(&self, _rejected: &str) {}
}

/// A fixed credential.
#[derive(Debug, Clone, Default)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(Some(token.into()))
    }

    /// A source that never supplies a credential.
    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialSource for StaticCredential {
    fn current(&self) -> Option<String> {
        self.0.clone()
    }
}

/// An in-memory credential the session layer can rotate at any time.
///
/// Invalidation clears it until the next [`set`](Self::set), unless it was
/// already replaced by a different token.
#[derive(Debug, Default)]
pub struct SharedCredential {
    token: RwLock<Option<String>>,
}

impl SharedCredential {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token),
        }
    }

    /// Replaces the stored credential.
    pub fn set(&self, token: impl Into<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Removes the stored credential.
    pub fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl CredentialSource for SharedCredential {
    fn current(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn invalidate(&self, rejected: &str) {
        let mut token = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if token.as_deref() == Some(rejected) {
            debug!("clearing rejected credential");
            *token = None;
        } else {
            debug!("rejected credential already rotated, keeping current one");
        }
    }
}

/// Reads the credential from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl CredentialSource for EnvCredential {
    fn current(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Reads the credential from a file on every call.
///
/// The file is owned by whatever refreshes the session; it is never
/// modified here, a rejection is only logged.
#[derive(Debug, Clone)]
pub struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CredentialSource for FileCredential {
    fn current(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => Some(content.trim().to_string()).filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read credential file");
                None
            }
        }
    }

    fn invalidate(&self, _rejected: &str) {
        warn!(path = %self.path.display(), "credential in file was rejected by the server");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn static_credential() {
        assert_eq!(StaticCredential::new("abc").current().as_deref(), Some("abc"));
        assert!(StaticCredential::none().current().is_none());
    }

    #[test]
    fn shared_credential_rotates() {
        let cred = SharedCredential::new(Some("first".into()));
        assert_eq!(cred.current().as_deref(), Some("first"));
        cred.set("second");
        assert_eq!(cred.current().as_deref(), Some("second"));
    }

    #[test]
    fn shared_credential_invalidate_clears() {
        let cred = SharedCredential::new(Some("stale".into()));
        cred.invalidate("stale");
        assert!(cred.current().is_none());
    }

    #[test]
    fn shared_credential_keeps_rotated_token() {
        let cred = SharedCredential::new(Some("stale".into()));
        cred.set("fresh");
        cred.invalidate("stale");
        assert_eq!(cred.current().as_deref(), Some("fresh"));
    }

    #[test]
    fn env_credential_missing_var() {
        let cred = EnvCredential::new("FIELDUP_TEST_TOKEN_THAT_IS_NEVER_SET");
        assert!(cred.current().is_none());
    }

    #[test]
    fn file_credential_reads_fresh_each_time() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        std::fs::write(&path, "one\n").unwrap();

        let cred = FileCredential::new(&path);
        assert_eq!(cred.current().as_deref(), Some("one"));

        std::fs::write(&path, "two").unwrap();
        assert_eq!(cred.current().as_deref(), Some("two"));
    }

    #[test]
    fn file_credential_blank_or_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("token");
        let cred = FileCredential::new(&path);
        assert!(cred.current().is_none());

        std::fs::write(&path, "  \n").unwrap();
        assert!(cred.current().is_none());

        cred.invalidate("anything");
        assert!(path.exists());
    }
}
