//! Keymaps shipped with ergokeys
//!
//! Loaded from keymaps.yaml at the project root (embedded at compile time),
//! with hardcoded fallbacks if that file fails to parse.

use std::path::Path;

use super::config::{load_keymaps_file, parse_keymaps_yaml};
use super::keymap::Keymap;
use super::shortcut::Shortcut;
use super::shortcut_set::ShortcutSet;
use super::types::{KeyCode, Keystroke, Modifiers};

/// Default keymaps YAML embedded at compile time
const DEFAULT_KEYMAPS_YAML: &str = include_str!("../../keymaps.yaml");

/// Action that does nothing; command-mode keymaps bind it to swallow keys
pub const NOOP_ACTION: &str = "ErgoKeysNoopAction";

/// Get the embedded keymaps YAML source
pub fn get_default_keymaps_yaml() -> &'static str {
    DEFAULT_KEYMAPS_YAML
}

/// Load and merge keymaps: shipped defaults + user definitions
///
/// Loading order (later layers replace same-named keymaps):
/// 1. Embedded keymaps.yaml (compiled into binary)
/// 2. User keymaps at ~/.config/ergokeys/keymaps.yaml
pub fn load_default_keymaps() -> Vec<Keymap> {
    let keymaps = match parse_keymaps_yaml(DEFAULT_KEYMAPS_YAML) {
        Ok(keymaps) => {
            tracing::info!("Loaded embedded keymaps ({} keymaps)", keymaps.len());
            keymaps
        }
        Err(e) => {
            tracing::warn!(
                "Failed to parse embedded keymaps: {}, using hardcoded defaults",
                e
            );
            default_keymaps()
        }
    };

    match crate::config_paths::keymaps_file() {
        Some(user_path) if user_path.exists() => merge_user_keymaps(keymaps, &user_path),
        _ => keymaps,
    }
}

fn merge_user_keymaps(keymaps: Vec<Keymap>, user_path: &Path) -> Vec<Keymap> {
    match load_keymaps_file(user_path) {
        Ok(user_keymaps) => {
            tracing::info!(
                "Merging user keymaps from {} ({} keymaps)",
                user_path.display(),
                user_keymaps.len()
            );
            merge_keymaps(keymaps, user_keymaps)
        }
        Err(e) => {
            tracing::warn!(
                "Failed to load user keymaps from {}: {}",
                user_path.display(),
                e
            );
            keymaps
        }
    }
}

/// Merge keymap definitions
///
/// An override with the same name as a base keymap replaces it in place;
/// any other override is appended.
pub fn merge_keymaps(base: Vec<Keymap>, overrides: Vec<Keymap>) -> Vec<Keymap> {
    let mut result = base;

    for keymap in overrides {
        if let Some(existing) = result.iter_mut().find(|k| k.name() == keymap.name()) {
            *existing = keymap;
        } else {
            result.push(keymap);
        }
    }

    result
}

/// Minimal keymaps used when the embedded YAML is unusable
pub fn default_keymaps() -> Vec<Keymap> {
    let cmd = Modifiers::cmd();
    let key = |k: KeyCode| Shortcut::new(Keystroke::key(k));
    let ch = |c: char| Shortcut::new(Keystroke::char(c));

    let base = ShortcutSet::with_bindings([
        ("EditorUp", key(KeyCode::Up)),
        ("EditorDown", key(KeyCode::Down)),
        ("EditorLeft", key(KeyCode::Left)),
        ("EditorRight", key(KeyCode::Right)),
        ("SaveAll", Shortcut::new(Keystroke::char_with_mods('s', cmd))),
    ]);

    let root = ShortcutSet::with_bindings([(
        "ergokeys.CommandMode",
        Shortcut::new(Keystroke::new(KeyCode::Space, Modifiers::ALT)),
    )]);

    let qwerty = ShortcutSet::with_bindings([
        ("ergokeys.InsertMode", ch('f')),
        ("EditorUp", ch('i')),
        ("EditorDown", ch('k')),
        ("EditorLeft", ch('j')),
        ("EditorRight", ch('l')),
    ]);

    vec![
        Keymap::new("$default").with_shortcuts(base),
        Keymap::new("$ergokeys").with_shortcuts(root),
        Keymap::new("ErgoKeys (QWERTY)")
            .with_parent("$ergokeys")
            .with_shortcuts(qwerty),
    ]
}
