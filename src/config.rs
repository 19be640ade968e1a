//! Mode controller configuration
//!
//! Stored in `~/.config/ergokeys/config.yaml`. Every field is optional in the
//! file; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Name of the keymap at the top of the ergo family
pub const ROOT_ERGOKEYS_KEYMAP: &str = "$ergokeys";

/// Command-mode keymap used when none has been chosen yet
pub const DEFAULT_ERGOKEYS_KEYMAP: &str = "ErgoKeys (QWERTY)";

/// Host base keymap used when neither the remembered nor the active keymap
/// can serve as insert-mode base
pub const DEFAULT_INSERT_KEYMAP: &str = "$default";

/// Configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErgoKeysConfig {
    /// Activating command mode while already in it switches back to insert mode
    #[serde(default)]
    pub command_mode_toggle: bool,

    #[serde(default = "default_command_keymap")]
    pub default_command_keymap: String,

    #[serde(default = "default_insert_keymap")]
    pub default_insert_keymap: String,

    /// Root marker name; compared case-insensitively
    #[serde(default = "default_root_keymap")]
    pub root_keymap: String,

    /// Upper bound on keymap parent-chain walks
    #[serde(default = "default_max_ancestry_depth")]
    pub max_ancestry_depth: usize,

    /// Host actions that switch to insert mode before they run
    #[serde(default = "default_insert_mode_actions")]
    pub insert_mode_actions: Vec<String>,
}

fn default_command_keymap() -> String {
    DEFAULT_ERGOKEYS_KEYMAP.to_string()
}

fn default_insert_keymap() -> String {
    DEFAULT_INSERT_KEYMAP.to_string()
}

fn default_root_keymap() -> String {
    ROOT_ERGOKEYS_KEYMAP.to_string()
}

fn default_max_ancestry_depth() -> usize {
    64
}

fn default_insert_mode_actions() -> Vec<String> {
    [
        "FindInPath",
        "SearchEverywhere",
        "RenameFile",
        "RenameElement",
        "Refactorings.QuickListPopupAction",
        "ExtractMethod",
        "IntroduceVariable",
        "Inline",
        "Move",
        "ChangeSignature",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ErgoKeysConfig {
    fn default() -> Self {
        Self {
            command_mode_toggle: false,
            default_command_keymap: default_command_keymap(),
            default_insert_keymap: default_insert_keymap(),
            root_keymap: default_root_keymap(),
            max_ancestry_depth: default_max_ancestry_depth(),
            insert_mode_actions: default_insert_mode_actions(),
        }
    }
}

impl ErgoKeysConfig {
    /// Load config from the user config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`, falling back to defaults on any failure
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to `path`, creating parent directories as needed
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Whether `action_id` is on the insert-mode allow-list
    pub fn forces_insert_mode(&self, action_id: &str) -> bool {
        self.insert_mode_actions.iter().any(|a| a == action_id)
    }
}
