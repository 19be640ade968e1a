//! Keymap registry: the host's collection of keymaps and its active keymap

use std::collections::VecDeque;

use super::config::KeymapError;
use super::keymap::Keymap;

/// The host capabilities the mode controller needs from a keymap registry
///
/// Implemented by host integrations. [`KeymapManager`] is the in-memory
/// implementation used by the `ergokeys` binary and the tests.
pub trait KeymapRegistry {
    /// Names of every registered keymap, in unspecified order
    fn keymap_names(&self) -> Vec<String>;

    fn keymap(&self, name: &str) -> Option<&Keymap>;

    fn keymap_mut(&mut self, name: &str) -> Option<&mut Keymap>;

    /// Name of the keymap currently in effect
    fn active_keymap(&self) -> &str;

    /// Make `name` the active keymap
    ///
    /// Returns true only if the active keymap actually changed. Hosts deliver
    /// a keymap-change notification in exactly that case.
    fn set_active_keymap(&mut self, name: &str) -> bool;

    /// Materialize every lazily populated keymap
    fn load_all(&mut self) {
        for name in self.keymap_names() {
            if let Some(keymap) = self.keymap_mut(&name) {
                keymap.force_load();
            }
        }
    }
}

/// In-memory keymap registry
///
/// Keymaps keep their registration order. Every effective change of the
/// active keymap is queued so the embedding layer can forward it to the
/// mode controller (see [`KeymapManager::take_change`]).
///
/// Once [`KeymapRegistry::load_all`] has run, keymaps registered later are
/// materialized on arrival.
#[derive(Debug, Clone)]
pub struct KeymapManager {
    keymaps: Vec<Keymap>,
    active: String,
    changes: VecDeque<String>,
    loaded: bool,
}

impl KeymapManager {
    /// Create a registry with `active` as the initially active keymap
    pub fn new(keymaps: Vec<Keymap>, active: &str) -> Result<Self, KeymapError> {
        let mut manager = Self {
            keymaps: Vec::with_capacity(keymaps.len()),
            active: active.to_string(),
            changes: VecDeque::new(),
            loaded: false,
        };
        for keymap in keymaps {
            manager.add_keymap(keymap)?;
        }
        if manager.index_of(active).is_none() {
            return Err(KeymapError::NotFound(active.to_string()));
        }
        Ok(manager)
    }

    /// Register a new keymap
    pub fn add_keymap(&mut self, mut keymap: Keymap) -> Result<(), KeymapError> {
        if self.index_of(keymap.name()).is_some() {
            return Err(KeymapError::DuplicateKeymap(keymap.name().to_string()));
        }
        if self.loaded {
            keymap.force_load();
        }
        tracing::debug!(keymap = keymap.name(), loaded = self.loaded, "registered keymap");
        self.keymaps.push(keymap);
        Ok(())
    }

    /// Unregister a keymap. The active keymap cannot be removed.
    pub fn remove_keymap(&mut self, name: &str) -> Option<Keymap> {
        if name == self.active {
            tracing::warn!(keymap = name, "refusing to remove the active keymap");
            return None;
        }
        let idx = self.index_of(name)?;
        Some(self.keymaps.remove(idx))
    }

    pub fn keymaps(&self) -> &[Keymap] {
        &self.keymaps
    }

    /// Next pending active-keymap change notification, oldest first
    pub fn take_change(&mut self) -> Option<String> {
        self.changes.pop_front()
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.keymaps.iter().position(|k| k.name() == name)
    }
}

impl KeymapRegistry for KeymapManager {
    fn keymap_names(&self) -> Vec<String> {
        self.keymaps.iter().map(|k| k.name().to_string()).collect()
    }

    fn keymap(&self, name: &str) -> Option<&Keymap> {
        self.keymaps.iter().find(|k| k.name() == name)
    }

    fn keymap_mut(&mut self, name: &str) -> Option<&mut Keymap> {
        self.keymaps.iter_mut().find(|k| k.name() == name)
    }

    fn active_keymap(&self) -> &str {
        &self.active
    }

    fn set_active_keymap(&mut self, name: &str) -> bool {
        if self.active == name {
            return false;
        }
        if self.index_of(name).is_none() {
            tracing::warn!(keymap = name, "cannot activate unknown keymap");
            return false;
        }
        tracing::debug!(from = %self.active, to = name, "active keymap changed");
        self.active = name.to_string();
        self.changes.push_back(name.to_string());
        true
    }

    fn load_all(&mut self) {
        for keymap in &mut self.keymaps {
            keymap.force_load();
        }
        self.loaded = true;
    }
}
