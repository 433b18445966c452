//! Saved filter persistence.
//!
//! Filter state never reaches storage on its own. Callers hand a
//! [`KeyValueStore`] to [`SavedFilters`] to load or save named states.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::state::{FilterDefaults, FilterState};

/// Errors from a filter store.
#[derive(Debug, thiserror::Error)]
pub enum FilterStoreError {
    /// Reading or writing the backing file failed
    #[error("filter store I/O error: {message}")]
    Io { message: String },

    /// Stored data is not valid JSON for the expected type
    #[error("filter store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Computes the new value for a key from its current value.
pub type UpdateFn<'a> = dyn FnMut(Option<String>) -> Result<String, FilterStoreError> + 'a;

/// A string key-value capability.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, FilterStoreError>;
    fn set(&self, key: &str, value: String) -> Result<(), FilterStoreError>;

    /// Replace the value under `key` with `f(current)` and return it. No
    /// other write to the store lands between the read and the write.
    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, FilterStoreError>;
}

/// In-process store, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, FilterStoreError> {
        let entries = self.entries.lock().map_err(|_| FilterStoreError::Io {
            message: "memory store lock poisoned".to_string(),
        })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<(), FilterStoreError> {
        let mut entries = self.entries.lock().map_err(|_| FilterStoreError::Io {
            message: "memory store lock poisoned".to_string(),
        })?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, FilterStoreError> {
        let mut entries = self.entries.lock().map_err(|_| FilterStoreError::Io {
            message: "memory store lock poisoned".to_string(),
        })?;
        let value = f(entries.get(key).cloned())?;
        entries.insert(key.to_string(), value.clone());
        Ok(value)
    }
}

/// Store backed by a single JSON object on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // serialises read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<HashMap<String, String>, FilterStoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(FilterStoreError::Io {
                message: format!("failed to read {}: {e}", self.path.display()),
            }),
        }
    }
}

impl JsonFileStore {
    fn locked(&self) -> Result<std::sync::MutexGuard<'_, ()>, FilterStoreError> {
        self.lock.lock().map_err(|_| FilterStoreError::Io {
            message: "file store lock poisoned".to_string(),
        })
    }

    /// Write the whole map to a sibling file, then rename it over the store
    /// so readers never see a partial file.
    fn write_all(&self, entries: &HashMap<String, String>) -> Result<(), FilterStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| FilterStoreError::Io {
                message: format!("failed to create store directory: {e}"),
            })?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|e| FilterStoreError::Io {
            message: format!("failed to write {}: {e}", tmp.display()),
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|e| FilterStoreError::Io {
            message: format!("failed to replace {}: {e}", self.path.display()),
        })
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, FilterStoreError> {
        let _guard = self.locked()?;
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: String) -> Result<(), FilterStoreError> {
        let _guard = self.locked()?;
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn update(&self, key: &str, f: &mut UpdateFn<'_>) -> Result<String, FilterStoreError> {
        let _guard = self.locked()?;
        let mut entries = self.read_all()?;
        let value = f(entries.get(key).cloned())?;
        entries.insert(key.to_string(), value.clone());
        self.write_all(&entries)?;
        Ok(value)
    }
}

/// Named filter states kept in a [`KeyValueStore`].
pub struct SavedFilters<'a, S: KeyValueStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: KeyValueStore + ?Sized> SavedFilters<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    fn key(name: &str) -> String {
        format!("filters/{name}")
    }

    /// Load a saved state; `Clear` on it resets to `defaults`.
    pub fn load(
        &self,
        name: &str,
        defaults: FilterDefaults,
    ) -> Result<Option<FilterState>, FilterStoreError> {
        let Some(json) = self.store.get(&Self::key(name))? else {
            return Ok(None);
        };
        let state: FilterState = serde_json::from_str(&json)?;
        Ok(Some(state.with_defaults(defaults)))
    }

    pub fn save(&self, name: &str, state: &FilterState) -> Result<(), FilterStoreError> {
        let json = serde_json::to_string(state)?;
        self.store.set(&Self::key(name), json)
    }

    /// Load, change and save a state as one step. A missing state starts
    /// from `defaults`. Concurrent updates of the same store never lose
    /// each other's changes.
    pub fn update(
        &self,
        name: &str,
        defaults: FilterDefaults,
        change: impl Fn(&FilterState) -> FilterState,
    ) -> Result<FilterState, FilterStoreError> {
        let json = self.store.update(&Self::key(name), &mut |current| {
            let state = match current {
                Some(json) => {
                    serde_json::from_str::<FilterState>(&json)?.with_defaults(defaults.clone())
                }
                None => FilterState::new(defaults.clone()),
            };
            Ok(serde_json::to_string(&change(&state))?)
        })?;
        let state: FilterState = serde_json::from_str(&json)?;
        Ok(state.with_defaults(defaults))
    }
}
