//! Read-only view over a keymap registry's parent hierarchy
//!
//! A graph borrows the registry for the duration of a query only. Callers
//! build a fresh graph for every transition rather than caching keymap
//! enumerations, since the host may add or remove keymaps at any time.

use super::config::KeymapError;
use super::keymap::Keymap;
use super::registry::KeymapRegistry;

/// Keymap hierarchy queried through a [`KeymapRegistry`]
pub struct KeymapGraph<'a, R: KeymapRegistry + ?Sized> {
    registry: &'a R,
    root: &'a str,
    max_depth: usize,
}

impl<'a, R: KeymapRegistry + ?Sized> KeymapGraph<'a, R> {
    /// `root` is the marker name identifying the ergo family; ancestry walks
    /// give up after `max_depth` keymaps.
    pub fn new(registry: &'a R, root: &'a str, max_depth: usize) -> Self {
        Self {
            registry,
            root,
            max_depth: max_depth.max(1),
        }
    }

    /// Every keymap currently registered
    pub fn all_keymaps(&self) -> Vec<&'a Keymap> {
        let registry = self.registry;
        registry
            .keymap_names()
            .iter()
            .filter_map(|name| registry.keymap(name))
            .collect()
    }

    /// Exact-name lookup
    pub fn by_name(&self, name: &str) -> Result<&'a Keymap, KeymapError> {
        let registry = self.registry;
        registry
            .keymap(name)
            .ok_or_else(|| KeymapError::NotFound(name.to_string()))
    }

    /// Whether `keymap` or one of its ancestors is named `root_name`
    ///
    /// Names compare case-insensitively. A parent that doesn't resolve ends
    /// the walk. A chain longer than the depth cap is treated as cyclic and
    /// reported as not matching.
    pub fn ancestry_contains(&self, keymap: &Keymap, root_name: &str) -> bool {
        let mut current = Some(keymap);
        let mut depth = 0;

        while let Some(node) = current {
            if names_match(node.name(), root_name) {
                return true;
            }
            depth += 1;
            if depth >= self.max_depth {
                tracing::warn!(
                    keymap = keymap.name(),
                    depth,
                    "keymap parent chain exceeds depth cap, assuming a cycle"
                );
                return false;
            }
            current = node.parent().and_then(|parent| self.registry.keymap(parent));
        }

        false
    }

    /// Whether `keymap` descends from the ergo root marker
    pub fn is_ergo_family(&self, keymap: &Keymap) -> bool {
        self.ancestry_contains(keymap, self.root)
    }

    /// Like [`is_ergo_family`](Self::is_ergo_family), by name. Unknown names are not members.
    pub fn is_ergo_family_name(&self, name: &str) -> bool {
        self.registry
            .keymap(name)
            .is_some_and(|keymap| self.is_ergo_family(keymap))
    }

    /// Every keymap in the ergo family, the root itself included
    pub fn ergo_family_members(&self) -> Vec<&'a Keymap> {
        self.all_keymaps()
            .into_iter()
            .filter(|keymap| {
                let member = self.is_ergo_family(keymap);
                tracing::trace!(keymap = keymap.name(), member, "checked ergo family membership");
                member
            })
            .collect()
    }
}

fn names_match(name: &str, root_name: &str) -> bool {
    name.to_lowercase() == root_name.to_lowercase()
}
