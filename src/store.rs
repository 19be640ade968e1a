//! Persistent key-value state
//!
//! The mode controller remembers two keymap names across restarts. Hosts
//! provide the storage through [`PropertyStore`]; [`Properties`] namespaces
//! every key under the `ergokeys.` prefix.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// Prefix for every key written by ergokeys
pub const PLUGIN_ID: &str = "ergokeys";

/// Host-provided string key-value storage
pub trait PropertyStore {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&mut self, key: &str, value: &str) -> io::Result<()>;
}

/// Borrowed stores, so a caller can keep ownership across a session
impl<S: PropertyStore + ?Sized> PropertyStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        (**self).set(key, value)
    }
}

/// Volatile store, for hosts without persistence and for tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

impl PropertyStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file backed store
///
/// The whole file is rewritten on every `set`. A missing or corrupt file
/// loads as empty.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("Ignoring corrupt state file {}: {}", path.display(), e);
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(&self.path, contents)
    }
}

impl PropertyStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// Namespaced view over a [`PropertyStore`]
///
/// Writes never fail from the caller's point of view: a failed write is
/// logged and the in-session value stays authoritative.
#[derive(Debug, Clone)]
pub struct Properties<S> {
    store: S,
}

impl<S: PropertyStore> Properties<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Full key as written to the store, e.g. `ergokeys.insertModeKeymapName`
    pub fn property_name(key: &str) -> String {
        format!("{}.{}", PLUGIN_ID, key)
    }

    pub fn load(&self, key: &str) -> Option<String> {
        self.store.get(&Self::property_name(key))
    }

    pub fn store(&mut self, key: &str, value: &str) {
        let name = Self::property_name(key);
        match self.store.set(&name, value) {
            Ok(()) => tracing::debug!(key = %name, value, "stored property"),
            Err(e) => tracing::warn!(key = %name, value, "Failed to store property: {}", e),
        }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
