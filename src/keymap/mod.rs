//! Keymaps, their shortcut tables and the hierarchy between them
//!
//! This module models the host side of the system:
//! - Keystrokes and shortcuts, parsed from strings like `ctrl+shift+s`
//! - [`ShortcutSet`], the per-keymap action table with `extend`/`purge`
//! - [`Keymap`] with an optional parent and lazy materialization
//! - [`KeymapRegistry`], the registry contract, and [`KeymapManager`],
//!   its in-memory implementation
//! - [`KeymapGraph`], ancestry walks and ergo-family classification
//!
//! # Architecture
//!
//! ```text
//! keymaps.yaml → Vec<Keymap> → KeymapManager ─┬─ KeymapGraph (read)
//!                                             └─ OverlayEngine (extend/purge)
//! ```
//!
//! # Loading Keymaps
//!
//! ```ignore
//! // Embedded defaults plus ~/.config/ergokeys/keymaps.yaml
//! let manager = KeymapManager::new(load_default_keymaps(), "Default")?;
//!
//! // Or from a specific file
//! let manager = KeymapManager::new(load_keymaps_file(path)?, "Default")?;
//! ```

mod config;
mod defaults;
mod graph;
#[allow(clippy::module_inception)]
mod keymap;
mod registry;
mod shortcut;
mod shortcut_set;
mod types;

pub use config::{load_keymaps_file, parse_key_string, parse_keymaps_yaml, KeymapError};
pub use defaults::{
    default_keymaps, get_default_keymaps_yaml, load_default_keymaps, merge_keymaps, NOOP_ACTION,
};
pub use graph::KeymapGraph;
pub use keymap::Keymap;
pub use registry::{KeymapManager, KeymapRegistry};
pub use shortcut::Shortcut;
pub use shortcut_set::ShortcutSet;
pub use types::{KeyCode, Keystroke, Modifiers};
