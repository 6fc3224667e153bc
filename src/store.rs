// src/store.rs

//! Untyped JSON key-value persistence with two scopes.
//!
//! Durable keys (one JSON document per key, on disk):
//!
//! ```text
//! quiz_config           → QuizConfig singleton
//! quiz_results          → Vec<QuizResult>
//! users                 → Vec<UserIdentity>
//! completed_users       → Vec<String> (emails that finished an attempt)
//! ```
//!
//! Ephemeral keys (process lifetime only):
//!
//! ```text
//! verification_{email}  → VerificationTicket
//! session_{email}       → VerificationStep
//! pending_deletion      → PendingDeletion
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub const CONFIG_KEY: &str = "quiz_config";
pub const RESULTS_KEY: &str = "quiz_results";
pub const USERS_KEY: &str = "users";
pub const COMPLETED_KEY: &str = "completed_users";
pub const DELETION_KEY: &str = "pending_deletion";

/// Untyped JSON key-value storage.
///
/// Every `set` is a full overwrite of the key's value; there are no partial
/// or merge semantics. `get` never fails: a missing key, an unreadable file
/// or malformed JSON all come back as `None`, and the caller that owns the
/// key materializes its default.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn remove(&self, key: &str);
}

/// Reads and deserializes a value. Type reconstruction (including ISO-8601
/// date strings back into `DateTime<Utc>`) happens here, on every read.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Stored value under '{}' does not match its schema: {}", key, e);
            None
        }
    }
}

/// Serializes and writes a value, overwriting whatever was stored before.
pub fn write_json<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(json) => store.set(key, json),
        Err(e) => tracing::error!("Failed to serialize value for key '{}': {}", key, e),
    }
}

/// Durable scope: one `<key>.json` file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    /// Opens (or creates) the data directory.
    pub fn open(dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let _guard = self.lock.lock().expect("store lock poisoned");
        let bytes = fs::read(self.path_for(key)).ok()?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring malformed JSON under key '{}': {}", key, e);
                None
            }
        }
    }

    fn set(&self, key: &str, value: Value) {
        let _guard = self.lock.lock().expect("store lock poisoned");
        match serde_json::to_vec_pretty(&value) {
            Ok(bytes) => {
                if let Err(e) = fs::write(self.path_for(key), bytes) {
                    tracing::error!("Failed to persist key '{}': {}", key, e);
                }
            }
            Err(e) => tracing::error!("Failed to encode key '{}': {}", key, e),
        }
    }

    fn remove(&self, key: &str) {
        let _guard = self.lock.lock().expect("store lock poisoned");
        if let Err(e) = fs::remove_file(self.path_for(key)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!("Failed to remove key '{}': {}", key, e);
            }
        }
    }
}

/// Ephemeral scope: lives exactly as long as the process.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.entries
            .lock()
            .expect("store lock poisoned")
            .insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.lock().expect("store lock poisoned").remove(key);
    }
}
