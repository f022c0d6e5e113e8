use std::collections::HashMap;
use std::path::PathBuf;

use parking_lot::RwLock;

/// Storage keys this crate owns.
///
/// Callers must not write these keys directly; go through the reconciler's
/// `sign_out` / `update_avatar` entry points instead.
pub mod keys {
    /// The persisted 3-part bearer token issued by the backend.
    pub const BEARER_TOKEN: &str = "backendAuthToken";

    /// Last avatar URL resolved by reconciliation.
    pub const PROFILE_IMAGE: &str = "profileImage";
}

/// Consumer-provided durable key-value storage (the browser's localStorage
/// equivalent).
///
/// All operations are synchronous and infallible from the caller's view;
/// implementations log and swallow their own I/O errors. Values have no
/// expiry semantics at this layer.
pub trait CredentialStorage: Send + Sync + 'static {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory storage. Nothing survives a restart — for tests and ephemeral
/// embeddings.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }
}

/// Durable storage backed by a single JSON document on disk.
///
/// The whole map is rewritten on every mutation; entries are few and tiny
/// (a token and an avatar URL), so that is fine. Write failures are logged
/// and the in-memory view stays authoritative for the process lifetime.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStorage {
    /// Open the storage file, creating an empty map if it does not exist.
    /// An unreadable or corrupt file starts empty rather than failing —
    /// stored credentials are recoverable by signing in again.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match std::fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "corrupt credential store, starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable credential store, starting empty");
                HashMap::new()
            }
        };
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn persist(&self, entries: &HashMap<String, String>) {
        let json = match serde_json::to_vec_pretty(entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize credential store");
                return;
            }
        };
        if let Err(e) = std::fs::write(&self.path, json) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write credential store");
        }
    }
}

impl CredentialStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.write();
        entries.insert(key.to_owned(), value.to_owned());
        self.persist(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.write();
        if entries.remove(key).is_some() {
            self.persist(&entries);
        }
    }
}
