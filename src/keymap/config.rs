//! YAML configuration parsing for keymap definitions
//!
//! Parses keymaps.yaml files into [`Keymap`] values ready to be registered
//! with a [`KeymapManager`](super::KeymapManager).
//!
//! ```yaml
//! keymaps:
//!   - name: "$ergokeys"
//!     bindings:
//!       - action: ergokeys.CommandMode
//!         keys: ["alt+space"]
//!   - name: "ErgoKeys (QWERTY)"
//!     parent: "$ergokeys"
//!     deferred: true
//!     bindings:
//!       - action: EditorUp
//!         keys: ["i"]
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::keymap::Keymap;
use super::shortcut::Shortcut;
use super::shortcut_set::ShortcutSet;
use super::types::{KeyCode, Keystroke, Modifiers};

/// Root structure of a keymaps YAML file
#[derive(Debug, Deserialize)]
pub struct KeymapsConfig {
    pub keymaps: Vec<KeymapDefinition>,
}

/// A single keymap entry from YAML
#[derive(Debug, Deserialize)]
pub struct KeymapDefinition {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// Keep parent link and bindings unmaterialized until force-loaded
    #[serde(default)]
    pub deferred: bool,
    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

/// A single binding entry from YAML
#[derive(Debug, Deserialize)]
pub struct BindingConfig {
    pub action: String,
    pub keys: Vec<String>,
    #[serde(default)]
    pub platform: Option<String>,
}

/// Load keymaps from a YAML file
pub fn load_keymaps_file(path: &Path) -> Result<Vec<Keymap>, KeymapError> {
    let content = std::fs::read_to_string(path).map_err(|e| KeymapError::IoError(e.to_string()))?;

    parse_keymaps_yaml(&content)
}

/// Parse keymaps from YAML string
pub fn parse_keymaps_yaml(yaml: &str) -> Result<Vec<Keymap>, KeymapError> {
    let config: KeymapsConfig =
        serde_yaml::from_str(yaml).map_err(|e| KeymapError::ParseError(e.to_string()))?;

    let current_platform = get_current_platform();
    let mut seen = HashSet::new();
    let mut keymaps = Vec::with_capacity(config.keymaps.len());

    for definition in config.keymaps {
        if !seen.insert(definition.name.clone()) {
            return Err(KeymapError::DuplicateKeymap(definition.name));
        }

        let mut shortcuts = ShortcutSet::new();
        for entry in &definition.bindings {
            // Skip if platform-specific and doesn't match current platform
            if let Some(ref platform) = entry.platform {
                if platform != current_platform {
                    continue;
                }
            }
            for key in &entry.keys {
                let shortcut: Shortcut = key.parse()?;
                shortcuts.add_shortcut(entry.action.as_str(), shortcut);
            }
        }

        let mut keymap = Keymap::new(definition.name).with_shortcuts(shortcuts);
        if let Some(parent) = definition.parent {
            keymap = keymap.with_parent(parent);
        }
        if definition.deferred {
            keymap = keymap.deferred();
        }
        keymaps.push(keymap);
    }

    Ok(keymaps)
}

/// Parse a key string like "cmd+shift+s" into a Keystroke
///
/// A string made of modifiers only names the last modifier as the key
/// itself, so `shift` is a bare Shift press and `ctrl+alt` is Alt held with
/// Ctrl.
pub fn parse_key_string(key_str: &str) -> Result<Keystroke, KeymapError> {
    let mut mods = Modifiers::NONE;
    let mut key_part = None;
    let mut last_modifier = None;

    for part in key_str.split('+') {
        let part_lower = part.trim().to_lowercase();
        let modifier = match part_lower.as_str() {
            // Platform command key
            "cmd" if Modifiers::cmd().meta() => Some((Modifiers::META, KeyCode::Meta)),
            "cmd" => Some((Modifiers::CTRL, KeyCode::Ctrl)),
            "ctrl" | "control" => Some((Modifiers::CTRL, KeyCode::Ctrl)),
            "shift" => Some((Modifiers::SHIFT, KeyCode::Shift)),
            "alt" | "option" | "opt" => Some((Modifiers::ALT, KeyCode::Alt)),
            "meta" | "super" | "win" => Some((Modifiers::META, KeyCode::Meta)),
            "" => {
                return Err(KeymapError::InvalidKey(format!(
                    "Empty key in binding: {}",
                    key_str
                )));
            }
            _ => {
                if key_part.is_some() {
                    return Err(KeymapError::InvalidKey(format!(
                        "Multiple keys in binding: {}",
                        key_str
                    )));
                }
                key_part = Some(parse_key_code(&part_lower)?);
                None
            }
        };
        if let Some((flag, key)) = modifier {
            mods = mods | flag;
            last_modifier = Some((flag, key));
        }
    }

    match (key_part, last_modifier) {
        (Some(key), _) => Ok(Keystroke::new(key, mods)),
        (None, Some((flag, key))) => Ok(Keystroke::new(key, mods.without(flag))),
        (None, None) => Err(KeymapError::InvalidKey(format!(
            "No key found in binding: {}",
            key_str
        ))),
    }
}

/// Parse a key code from string
fn parse_key_code(key: &str) -> Result<KeyCode, KeymapError> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c.to_ascii_lowercase()));
    }

    let canonical = match key {
        "return" => "enter",
        "esc" => "escape",
        "back" => "backspace",
        "del" => "delete",
        "arrowup" => "up",
        "arrowdown" => "down",
        "arrowleft" => "left",
        "arrowright" => "right",
        "pgup" => "pageup",
        "pgdown" | "pgdn" => "pagedown",
        "ins" => "insert",
        other => other,
    };

    KeyCode::from_name(canonical)
        .or_else(|| parse_function_key(key))
        .ok_or_else(|| KeymapError::InvalidKey(format!("Unknown key: {}", key)))
}

/// `f1` through `f24`
fn parse_function_key(key: &str) -> Option<KeyCode> {
    let n: u8 = key.strip_prefix('f')?.parse().ok()?;
    (1..=24).contains(&n).then_some(KeyCode::F(n))
}

/// Get the current platform identifier
fn get_current_platform() -> &'static str {
    if cfg!(target_os = "macos") {
        "macos"
    } else if cfg!(target_os = "windows") {
        "windows"
    } else {
        "linux"
    }
}

/// Errors that can occur when loading or looking up keymaps
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapError {
    IoError(String),
    ParseError(String),
    InvalidKey(String),
    DuplicateKeymap(String),
    NotFound(String),
}

impl std::fmt::Display for KeymapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeymapError::IoError(e) => write!(f, "IO error: {}", e),
            KeymapError::ParseError(e) => write!(f, "Parse error: {}", e),
            KeymapError::InvalidKey(k) => write!(f, "Invalid key: {}", k),
            KeymapError::DuplicateKeymap(name) => write!(f, "Duplicate keymap: {}", name),
            KeymapError::NotFound(name) => write!(f, "Keymap not found: {}", name),
        }
    }
}

impl std::error::Error for KeymapError {}
