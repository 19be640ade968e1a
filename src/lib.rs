//! ErgoKeys - modal editing through keymap switching
//!
//! This crate implements command/insert modes on top of a host's keymap
//! system. Command mode is just another keymap: entering it activates an
//! ergo-family keymap, leaving it reactivates the user's base keymap. The
//! base keymap carries the ergo bindings as an overlay so that mode-switch
//! shortcuts work from insert mode too.

pub mod cli;
pub mod config;
pub mod config_paths;
pub mod editor;
pub mod keymap;
pub mod mode;
pub mod overlay;
pub mod session;
pub mod store;
pub mod tracing;

// Re-export commonly used types
pub use config::ErgoKeysConfig;
pub use editor::{CursorStyle, EditorId, EditorSurface};
pub use mode::{KeymapChange, Mode, ModeController, ModeError};
pub use overlay::{OverlayEngine, OverlayStats};
pub use session::Session;
pub use store::{FileStore, MemoryStore, PropertyStore};
