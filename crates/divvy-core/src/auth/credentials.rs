//! Credential storage and retrieval.
//!
//! Stores the saved sign-in entry in `<base>/credentials.json` with restricted
//! permissions (0600). Tokens are never logged or displayed in full.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::paths;

/// Credential store filename.
const CREDENTIALS_FILE: &str = "credentials.json";

/// Token blob stored as the password side of a credential entry.
///
/// The field names (`__token`, `__rtoken`) are shared with the mobile client's
/// keychain payload and must not change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenBlob {
    /// The access token (short-lived). Externally seeded blobs may omit it.
    #[serde(rename = "__token", default, skip_serializing_if = "Option::is_none")]
    pub access: Option<String>,
    /// The refresh token (long-lived).
    #[serde(rename = "__rtoken")]
    pub refresh: String,
}

impl TokenBlob {
    /// Parses a stored password string into a token blob.
    ///
    /// # Errors
    /// Returns [`InvalidBlobError`] if the payload is not JSON or lacks `__rtoken`.
    pub fn parse(raw: &str) -> Result<Self, InvalidBlobError> {
        serde_json::from_str(raw).map_err(|e| InvalidBlobError {
            message: e.to_string(),
        })
    }

    /// Serializes the blob back into a password string.
    pub fn to_password(&self) -> Result<String> {
        serde_json::to_string(self).context("Failed to serialize token blob")
    }
}

/// Error for stored passwords that do not parse as a token blob.
///
/// Carries only the parser message, never the payload itself.
#[derive(Debug, Clone)]
pub struct InvalidBlobError {
    /// One-line summary suitable for display.
    pub message: String,
}

impl fmt::Display for InvalidBlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid token blob: {}", self.message)
    }
}

impl std::error::Error for InvalidBlobError {}

/// A stored sign-in entry: the account it was saved under and its token blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Account identifier the entry was saved under.
    pub username: String,
    /// Serialized token blob (see [`TokenBlob`]).
    pub password: String,
}

/// Storage seam for the saved sign-in entry.
///
/// The mobile client keeps this entry in the OS keychain; the Rust client
/// keeps it in a JSON file under the Divvy home directory. Implementations
/// must report a missing entry as `Ok(None)`, not as an error.
pub trait CredentialStore {
    /// Returns the stored entry, or `None` when nothing is saved.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    fn get(&self) -> impl Future<Output = Result<Option<CredentialEntry>>> + Send;

    /// Saves an entry, replacing any previous one.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn set(&self, username: &str, password: &str) -> impl Future<Output = Result<()>> + Send;
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Creates a store at the default path under the Divvy home directory.
    pub fn new() -> Self {
        Self {
            path: paths::divvy_home().join(CREDENTIALS_FILE),
        }
    }

    /// Creates a store backed by a specific file path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entry(&self) -> Result<Option<CredentialEntry>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read credentials from {}", self.path.display()))?;

        let entry = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse credentials from {}", self.path.display()))?;

        Ok(Some(entry))
    }

    /// Writes an entry to disk with restricted permissions (0600).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    fn write_entry(&self, entry: &CredentialEntry) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(entry).context("Failed to serialize credentials")?;

        // Write with restricted permissions
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| {
                    format!("Failed to open {} for writing", self.path.display())
                })?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Removes the stored entry. Returns whether one existed.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub fn clear(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }

        fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))?;

        Ok(true)
    }
}

impl Default for FileCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore for FileCredentialStore {
    async fn get(&self) -> Result<Option<CredentialEntry>> {
        self.read_entry()
    }

    async fn set(&self, username: &str, password: &str) -> Result<()> {
        self.write_entry(&CredentialEntry {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Returns a masked version of a token for display (first 12 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.chars().count() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(12).collect();
    format!("{prefix}...")
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    /// Test: blob parsing keeps both wire-named fields.
    #[test]
    fn test_token_blob_parse_full() {
        let blob = TokenBlob::parse(r#"{"__token":"a1","__rtoken":"r1"}"#).unwrap();
        assert_eq!(blob.access.as_deref(), Some("a1"));
        assert_eq!(blob.refresh, "r1");
    }

    /// Test: blob parsing accepts an entry with only a refresh token.
    #[test]
    fn test_token_blob_access_is_optional() {
        let blob = TokenBlob::parse(r#"{"__rtoken":"r1"}"#).unwrap();
        assert_eq!(blob.access, None);
        assert_eq!(blob.refresh, "r1");
    }

    /// Test: missing `__rtoken` is a parse failure.
    #[test]
    fn test_token_blob_missing_rtoken_is_invalid() {
        let err = TokenBlob::parse(r#"{"__token":"a1"}"#).unwrap_err();
        assert!(err.to_string().contains("__rtoken"));
    }

    /// Test: non-JSON payloads are a parse failure.
    #[test]
    fn test_token_blob_garbage_is_invalid() {
        assert!(TokenBlob::parse("not-json").is_err());
        assert!(TokenBlob::parse("").is_err());
    }

    /// Test: serialization emits the wire names, skipping an absent access token.
    #[test]
    fn test_token_blob_to_password_wire_names() {
        let blob = TokenBlob {
            access: Some("a1".to_string()),
            refresh: "r1".to_string(),
        };
        let raw = blob.to_password().unwrap();
        assert!(raw.contains("\"__token\":\"a1\""));
        assert!(raw.contains("\"__rtoken\":\"r1\""));

        let refresh_only = TokenBlob {
            access: None,
            refresh: "r1".to_string(),
        };
        let raw = refresh_only.to_password().unwrap();
        assert!(!raw.contains("__token\""));
    }

    /// Test: reading a store with no file yields None.
    #[tokio::test]
    async fn test_store_get_missing_returns_none() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::at(dir.path().join("credentials.json"));

        assert!(store.get().await.unwrap().is_none());
    }

    /// Test: set then get round-trips the entry.
    #[tokio::test]
    async fn test_store_set_then_get() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::at(dir.path().join("credentials.json"));

        store
            .set("ada", r#"{"__token":"a1","__rtoken":"r1"}"#)
            .await
            .unwrap();

        let entry = store.get().await.unwrap().unwrap();
        assert_eq!(entry.username, "ada");
        assert_eq!(entry.password, r#"{"__token":"a1","__rtoken":"r1"}"#);
    }

    /// Test: the credentials file is written with 0600 permissions.
    #[cfg(unix)]
    #[tokio::test]
    async fn test_store_set_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        let store = FileCredentialStore::at(path.clone());

        store.set("ada", "{}").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    /// Test: corrupted entry files surface as a read error, not None.
    #[tokio::test]
    async fn test_store_corrupt_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("credentials.json");
        std::fs::write(&path, "not-json").unwrap();

        let store = FileCredentialStore::at(path);
        assert!(store.get().await.is_err());
    }

    /// Test: clear reports whether an entry existed.
    #[tokio::test]
    async fn test_store_clear() {
        let dir = tempdir().unwrap();
        let store = FileCredentialStore::at(dir.path().join("credentials.json"));

        assert!(!store.clear().unwrap());

        store.set("ada", "{}").await.unwrap();
        assert!(store.clear().unwrap());
        assert!(store.get().await.unwrap().is_none());
    }

    /// Test: token masking.
    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("tok-long-access-token-here"), "tok-long-acc...");
        assert_eq!(mask_token("short"), "***");
        // Multibyte tokens must mask on char boundaries, not byte offsets.
        assert_eq!(mask_token("ab€€€€€€€€€€€€€€€"), "ab€€€€€€€€€€...");
        assert_eq!(mask_token("aa€€€€€€€€"), "***");
    }
}
