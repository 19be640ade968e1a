//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io;

use ergokeys::keymap::{Keymap, KeymapManager, Shortcut, ShortcutSet};
use ergokeys::store::PropertyStore;

/// Parse a shortcut literal like `"ctrl+shift+s"`
pub fn sc(text: &str) -> Shortcut {
    text.parse().unwrap()
}

/// Build a shortcut table from `(action, shortcut)` literals
pub fn table(bindings: &[(&str, &str)]) -> ShortcutSet {
    ShortcutSet::with_bindings(bindings.iter().map(|(action, key)| (*action, sc(key))))
}

/// Keymap hierarchy used across the integration tests:
///
/// ```text
/// $default ── Default
///          └─ Emacs
/// $ergokeys ── ErgoKeys (QWERTY) ── My Layout
/// ```
pub fn fixture_keymaps() -> Vec<Keymap> {
    vec![
        Keymap::new("$default").with_shortcuts(table(&[("EditorUp", "up"), ("SaveAll", "ctrl+s")])),
        Keymap::new("Default")
            .with_parent("$default")
            .with_shortcuts(table(&[("SaveAll", "ctrl+s"), ("EditorLineStart", "home")])),
        Keymap::new("Emacs")
            .with_parent("$default")
            .with_shortcuts(table(&[("EditorUp", "ctrl+p"), ("SaveAll", "ctrl+x ctrl+s")])),
        Keymap::new("$ergokeys")
            .with_shortcuts(table(&[("ergokeys.CommandMode", "alt+space")])),
        Keymap::new("ErgoKeys (QWERTY)")
            .with_parent("$ergokeys")
            .with_shortcuts(table(&[
                ("ergokeys.InsertMode", "f"),
                ("EditorUp", "i"),
                ("SaveAll", "ctrl+shift+s"),
            ])),
        Keymap::new("My Layout")
            .with_parent("ErgoKeys (QWERTY)")
            .with_shortcuts(table(&[("EditorUp", "e")])),
    ]
}

/// Registry over [`fixture_keymaps`] with `active` as the host's active keymap
pub fn fixture_manager(active: &str) -> KeymapManager {
    KeymapManager::new(fixture_keymaps(), active).unwrap()
}

/// Property store that counts writes
#[derive(Debug, Default, Clone)]
pub struct RecordingStore {
    pub values: BTreeMap<String, String>,
    pub writes: Vec<(String, String)>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with the given `(full key, value)` pairs already persisted
    pub fn with(values: &[(&str, &str)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            writes: Vec::new(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl PropertyStore for RecordingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        self.writes.push((key.to_string(), value.to_string()));
        Ok(())
    }
}

/// Property store whose writes always fail
#[derive(Debug, Default)]
pub struct FailingStore;

impl PropertyStore for FailingStore {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&mut self, _key: &str, _value: &str) -> io::Result<()> {
        Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
    }
}
