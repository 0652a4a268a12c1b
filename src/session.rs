//! Device-local persistence of the authenticated identity snapshot.
//!
//! The snapshot exists so screens can show who is signed in without a
//! network round trip. It is written at sign-in/sign-up completion, read at
//! startup, and removed at sign-out; persistence failures are logged and
//! swallowed, never surfaced to the caller.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::UserProfile;

/// Storage key under which the snapshot lives.
const SESSION_KEY: &str = "user";

/// The cached copy of the signed-in user: identity fields plus whatever the
/// `users` profile document held at sign-in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The identity provider's user identifier.
    pub uid: String,
    /// Email the user signed in with.
    pub email: String,
    /// Bearer token for store access, as issued at sign-in.
    pub token: String,
    /// Profile fields read from the `users` collection, when available.
    #[serde(flatten)]
    pub profile: UserProfile,
}

impl SessionSnapshot {
    /// Name to greet the user with, falling back to a generic one.
    pub fn display_name(&self) -> &str {
        self.profile.name.as_deref().unwrap_or("Wildlife Protector")
    }
}

/// Minimal device-local key-value persistence seam.
pub trait KeyValueStore {
    /// Read the value for `key`, `None` when absent.
    fn get(&self, key: &str) -> io::Result<Option<String>>;
    /// Write `value` under `key`, overwriting any prior value.
    fn set(&self, key: &str, value: &str) -> io::Result<()>;
    /// Remove `key`; removing an absent key is not an error.
    fn remove(&self, key: &str) -> io::Result<()>;
}

/// File-per-key store under a directory, one JSON value per file.
pub struct FileStore {
    /// Directory the key files live in.
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating it if needed.
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Open the store in the platform data directory.
    pub fn open_default() -> io::Result<Self> {
        let base = dirs::data_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no platform data directory")
        })?;
        Self::open(base.join("wildtrack"))
    }

    /// Path of the file backing `key`.
    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        fs::write(self.path_for(key), value)
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err),
        }
    }
}

/// In-memory store used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    /// Backing map, locked per call.
    values: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.values.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> io::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Persists the last-known authenticated identity. Single in-flight call per
/// app lifecycle event, so no locking discipline beyond the store's own.
pub struct SessionStore<S: KeyValueStore> {
    /// Underlying key-value persistence.
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    /// Wrap a key-value store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Persist `snapshot`, overwriting any prior one. Failures are logged
    /// and swallowed.
    pub fn save(&self, snapshot: &SessionSnapshot) {
        let serialized = match serde_json::to_string(snapshot) {
            Ok(serialized) => serialized,
            Err(err) => {
                warn!(error = %err, "could not serialize session snapshot");
                return;
            }
        };
        if let Err(err) = self.store.set(SESSION_KEY, &serialized) {
            warn!(error = %err, "could not persist session snapshot");
        }
    }

    /// The last saved snapshot, or `None` when nothing is stored or the
    /// stored value cannot be read or parsed.
    pub fn load(&self) -> Option<SessionSnapshot> {
        let raw = match self.store.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(err) => {
                warn!(error = %err, "could not read session snapshot");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!(error = %err, "stored session snapshot is corrupt");
                None
            }
        }
    }

    /// Remove the snapshot. Failures are logged and swallowed.
    pub fn clear(&self) {
        if let Err(err) = self.store.remove(SESSION_KEY) {
            warn!(error = %err, "could not clear session snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            uid: "u-123".to_string(),
            email: "ranger@example.com".to_string(),
            token: "tok".to_string(),
            profile: UserProfile {
                name: Some("Nimal".to_string()),
                ..UserProfile::default()
            },
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = SessionStore::new(MemoryStore::default());
        store.save(&snapshot());
        assert_eq!(store.load(), Some(snapshot()));
    }

    #[test]
    fn test_load_without_save_is_none() {
        let store = SessionStore::new(MemoryStore::default());
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupt_snapshot_is_swallowed() {
        let memory = MemoryStore::default();
        memory.set(SESSION_KEY, "{not json").unwrap();
        let store = SessionStore::new(memory);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_clear_removes_snapshot() {
        let store = SessionStore::new(MemoryStore::default());
        store.save(&snapshot());
        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_clear_on_empty_store_is_fine() {
        let store = SessionStore::new(MemoryStore::default());
        store.clear();
    }

    #[test]
    fn test_display_name_fallback() {
        let mut snap = snapshot();
        snap.profile.name = None;
        assert_eq!(snap.display_name(), "Wildlife Protector");
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(FileStore::open(dir.path().join("kv")).unwrap());

        store.save(&snapshot());
        assert_eq!(store.load(), Some(snapshot()));

        store.clear();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_file_store_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(FileStore::open(dir.path().to_path_buf()).unwrap());

        store.save(&snapshot());
        let mut second = snapshot();
        second.email = "other@example.com".to_string();
        store.save(&second);

        assert_eq!(store.load(), Some(second));
    }
}
