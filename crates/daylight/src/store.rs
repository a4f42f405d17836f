//! Persistent key-value storage for the preference.
//!
//! The controller only ever touches one key, but stores are plain string maps
//! so a single file can be shared with other settings.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Error returned when a store cannot persist a value.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing file could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The store contents could not be encoded.
    #[error("failed to encode store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Synchronous string key-value storage.
///
/// Reads never fail: a store that cannot produce a value returns `None`,
/// which the controller treats as "no preference".
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut values = HashMap::new();
        values.insert(key.into(), value.into());
        Self { values }
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A JSON object on disk, read on every `get` and rewritten on every `set`.
///
/// ```json
/// { "theme-preference": "dark" }
/// ```
///
/// Nothing is cached, so a value written by another process is seen by the
/// next `get`. `set` merges into whatever the file holds at that moment and
/// leaves other keys, including non-string values, as they are.
///
/// A missing file is an empty store. A file that cannot be read or parsed is
/// also treated as empty (and logged); the next `set` replaces it.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Opens the store at `path`. The file does not need to exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        debug!(path = %path.display(), "opened preference store");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, object: &Map<String, Value>) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(object)?;
        fs::write(&self.path, content).map_err(io_error)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match load_object(&self.path).remove(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut object = load_object(&self.path);
        object.insert(key.to_string(), Value::String(value.to_string()));
        self.persist(&object)?;
        debug!(key, value, path = %self.path.display(), "persisted preference");
        Ok(())
    }
}

fn load_object(path: &Path) -> Map<String, Value> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Map::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "cannot read preference store, treating as empty");
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(object)) => object,
        Ok(_) | Err(_) => {
            warn!(path = %path.display(), "preference store is not a JSON object, treating as empty");
            Map::new()
        }
    }
}
