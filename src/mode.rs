//! Insert/command mode state machine
//!
//! [`ModeController`] owns the two remembered keymap identities:
//!
//! - the *insert-mode keymap*, a base keymap that never belongs to the ergo
//!   family and carries the command-mode overlay while it is the base;
//! - the *command-mode keymap*, the ergo-family keymap activated for command
//!   mode.
//!
//! The host integration layer forwards its events to the `on_*` methods. All
//! of them run to completion synchronously and never fail across the host
//! boundary; only [`ModeController::start`] can fail.
//!
//! ```text
//!                 focus gained (file-backed editor)
//!        ┌────────┐ ───────────────────────────────▶ ┌─────────┐
//!        │ Insert │                                  │ Command │
//!        └────────┘ ◀─────────────────────────────── └─────────┘
//!           focus lost / intercepted action / base keymap changed
//! ```

use std::fmt;

use crate::config::ErgoKeysConfig;
use crate::editor::{CursorStyle, EditorId, EditorRegistry, EditorSurface};
use crate::keymap::{KeymapError, KeymapGraph, KeymapRegistry};
use crate::overlay::OverlayEngine;
use crate::store::{Properties, PropertyStore};

const INSERT_MODE_KEYMAP_KEY: &str = "insertModeKeymapName";
const COMMAND_MODE_KEYMAP_KEY: &str = "commandModeKeymapName";

/// Editing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Keystrokes insert text; the insert-mode keymap is active
    #[default]
    Insert,
    /// Keystrokes run commands; an ergo-family keymap is active
    Command,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Insert => "insert",
            Mode::Command => "command",
        }
    }

    pub fn cursor_style(&self) -> CursorStyle {
        match self {
            Mode::Insert => CursorStyle::Line,
            Mode::Command => CursorStyle::Block,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a keymap-change notification was classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeymapChange {
    /// The keymap is one of the two tracked keymaps
    Ignored,
    /// An ergo-family keymap became the command-mode keymap
    CommandKeymap(String),
    /// A base keymap replaced the insert-mode keymap
    InsertKeymap { previous: String, current: String },
}

/// Errors that abort controller startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeError {
    /// No usable keymap for a mode, not even the configured default
    Configuration(String),
    Keymap(KeymapError),
}

impl fmt::Display for ModeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModeError::Configuration(e) => write!(f, "Configuration error: {}", e),
            ModeError::Keymap(e) => write!(f, "Keymap error: {}", e),
        }
    }
}

impl std::error::Error for ModeError {}

impl From<KeymapError> for ModeError {
    fn from(e: KeymapError) -> Self {
        ModeError::Keymap(e)
    }
}

/// Session state of modal editing
///
/// Constructed once per session with [`start`](Self::start).
#[derive(Debug)]
pub struct ModeController<S: PropertyStore> {
    config: ErgoKeysConfig,
    overlay: OverlayEngine,
    properties: Properties<S>,
    insert_mode_keymap: String,
    command_mode_keymap: String,
    last_editor_used: Option<EditorId>,
}

impl<S: PropertyStore> ModeController<S> {
    /// Resolve both keymaps, persist them and overlay the insert-mode base
    pub fn start<R: KeymapRegistry + ?Sized>(
        config: ErgoKeysConfig,
        registry: &mut R,
        store: S,
    ) -> Result<Self, ModeError> {
        // Parent links may still be unmaterialized; ancestry walks need them
        registry.load_all();

        let mut overlay =
            OverlayEngine::new(config.root_keymap.clone(), config.max_ancestry_depth);
        let mut properties = Properties::new(store);

        // Both must resolve before either is persisted
        let insert_mode_keymap = resolve_insert_keymap(&config, &overlay, &*registry, &properties)?;
        let command_mode_keymap =
            resolve_command_keymap(&config, &overlay, &*registry, &properties)?;
        properties.store(INSERT_MODE_KEYMAP_KEY, &insert_mode_keymap);
        properties.store(COMMAND_MODE_KEYMAP_KEY, &command_mode_keymap);

        overlay.apply_overlay(registry, &insert_mode_keymap)?;

        tracing::info!(
            insert = %insert_mode_keymap,
            command = %command_mode_keymap,
            "mode controller started"
        );

        Ok(Self {
            config,
            overlay,
            properties,
            insert_mode_keymap,
            command_mode_keymap,
            last_editor_used: None,
        })
    }

    pub fn config(&self) -> &ErgoKeysConfig {
        &self.config
    }

    pub fn insert_mode_keymap(&self) -> &str {
        &self.insert_mode_keymap
    }

    pub fn command_mode_keymap(&self) -> &str {
        &self.command_mode_keymap
    }

    pub fn last_editor_used(&self) -> Option<EditorId> {
        self.last_editor_used
    }

    pub fn overlay(&self) -> &OverlayEngine {
        &self.overlay
    }

    pub fn store(&self) -> &S {
        self.properties.inner()
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.properties.inner_mut()
    }

    /// Hierarchy view using the configured root marker and depth cap
    pub fn graph<'a, R: KeymapRegistry + ?Sized>(&'a self, registry: &'a R) -> KeymapGraph<'a, R> {
        self.overlay.graph(registry)
    }

    /// Whether `keymap` belongs to the ergo family
    pub fn is_ergo_keys_keymap<R: KeymapRegistry + ?Sized>(&self, registry: &R, keymap: &str) -> bool {
        self.graph(registry).is_ergo_family_name(keymap)
    }

    /// Current mode, derived from the host's active keymap
    pub fn mode<R: KeymapRegistry + ?Sized>(&self, registry: &R) -> Mode {
        if self.is_ergo_keys_keymap(registry, registry.active_keymap()) {
            Mode::Command
        } else {
            Mode::Insert
        }
    }

    /// The host's active keymap changed to `keymap`
    pub fn on_keymap_changed<R, E>(
        &mut self,
        registry: &mut R,
        editors: &mut E,
        keymap: &str,
    ) -> KeymapChange
    where
        R: KeymapRegistry + ?Sized,
        E: EditorRegistry + ?Sized,
    {
        tracing::debug!(keymap, "active keymap changed");

        // Our own activations come back through here
        if keymap == self.command_mode_keymap || keymap == self.insert_mode_keymap {
            tracing::debug!(keymap, "ignoring change to a tracked keymap");
            return KeymapChange::Ignored;
        }

        if registry.keymap(keymap).is_none() {
            tracing::warn!(keymap, "ignoring change to an unregistered keymap");
            return KeymapChange::Ignored;
        }

        if self.is_ergo_keys_keymap(&*registry, keymap) {
            self.command_mode_keymap = keymap.to_string();
            self.properties.store(COMMAND_MODE_KEYMAP_KEY, keymap);
            tracing::info!(keymap, "new command-mode keymap");
            return KeymapChange::CommandKeymap(keymap.to_string());
        }

        let previous = std::mem::replace(&mut self.insert_mode_keymap, keymap.to_string());
        if let Err(e) = self.overlay.remove_overlay(registry, &previous) {
            tracing::debug!(keymap = %previous, "previous insert keymap not cleaned: {}", e);
        }
        self.properties.store(INSERT_MODE_KEYMAP_KEY, keymap);
        if let Err(e) = self.overlay.apply_overlay(registry, keymap) {
            tracing::warn!(keymap, "Failed to overlay new insert keymap: {}", e);
        }
        tracing::info!(from = %previous, to = keymap, "new insert-mode keymap");

        let editor = self.last_editor_used.and_then(|id| editors.editor_mut(id));
        self.activate_insert_mode(registry, editor);

        KeymapChange::InsertKeymap {
            previous,
            current: keymap.to_string(),
        }
    }

    /// An editor gained focus. File-backed editors enter command mode.
    pub fn on_editor_focus_gained<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        editor: &mut dyn EditorSurface,
    ) {
        tracing::debug!(editor = ?editor.id(), "focus gained");
        self.last_editor_used = Some(editor.id());
        if editor.virtual_file().is_some() {
            self.activate_command_mode(registry, editor);
        }
    }

    /// An editor lost focus
    pub fn on_editor_focus_lost<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        editor: &mut dyn EditorSurface,
    ) {
        tracing::debug!(editor = ?editor.id(), "focus lost");
        self.activate_insert_mode(registry, Some(editor));
    }

    /// A host action that needs plain text input is about to run
    pub fn on_before_intercepted_action<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        editor: Option<&mut dyn EditorSurface>,
    ) {
        self.activate_insert_mode(registry, editor);
    }

    /// A host action is about to run. Returns true if it forced insert mode.
    pub fn on_before_action<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        action_id: &str,
        editor: Option<&mut dyn EditorSurface>,
    ) -> bool {
        tracing::debug!(action = action_id, "before action");
        if !self.config.forces_insert_mode(action_id) {
            return false;
        }
        self.on_before_intercepted_action(registry, editor);
        true
    }

    /// Switch `editor` to command mode
    ///
    /// With `command_mode_toggle` set and command mode already active, this
    /// switches back to insert mode instead.
    pub fn activate_command_mode<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        editor: &mut dyn EditorSurface,
    ) {
        if self.config.command_mode_toggle && self.mode(&*registry) == Mode::Command {
            tracing::debug!("command mode toggled off");
            self.activate_insert_mode(registry, Some(editor));
            return;
        }
        tracing::debug!(editor = ?editor.id(), keymap = %self.command_mode_keymap, "activate command mode");
        editor.set_cursor_style(CursorStyle::Block);
        registry.set_active_keymap(&self.command_mode_keymap);
    }

    /// Switch to insert mode, restyling `editor` if there is one
    pub fn activate_insert_mode<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        editor: Option<&mut dyn EditorSurface>,
    ) {
        tracing::debug!(keymap = %self.insert_mode_keymap, "activate insert mode");
        if let Some(editor) = editor {
            editor.set_cursor_style(CursorStyle::Line);
        }
        registry.set_active_keymap(&self.insert_mode_keymap);
    }
}

/// Remembered base keymap, else the host's active one, else the configured default
fn resolve_insert_keymap<R, S>(
    config: &ErgoKeysConfig,
    overlay: &OverlayEngine,
    registry: &R,
    properties: &Properties<S>,
) -> Result<String, ModeError>
where
    R: KeymapRegistry + ?Sized,
    S: PropertyStore,
{
    let graph = overlay.graph(registry);
    let usable = |name: &str| graph.by_name(name).is_ok() && !graph.is_ergo_family_name(name);

    if let Some(name) = properties.load(INSERT_MODE_KEYMAP_KEY) {
        if usable(name.as_str()) {
            return Ok(name);
        }
        tracing::warn!(keymap = %name, "remembered insert-mode keymap is unusable, falling back");
    }

    let active = registry.active_keymap();
    if usable(active) {
        return Ok(active.to_string());
    }

    if usable(config.default_insert_keymap.as_str()) {
        tracing::warn!(
            active,
            fallback = %config.default_insert_keymap,
            "active keymap cannot be the insert-mode base"
        );
        return Ok(config.default_insert_keymap.clone());
    }

    tracing::error!(
        default = %config.default_insert_keymap,
        "no usable insert-mode keymap"
    );
    Err(ModeError::Configuration(format!(
        "no usable insert-mode keymap (default {:?})",
        config.default_insert_keymap
    )))
}

/// Remembered ergo keymap, else the configured default
fn resolve_command_keymap<R, S>(
    config: &ErgoKeysConfig,
    overlay: &OverlayEngine,
    registry: &R,
    properties: &Properties<S>,
) -> Result<String, ModeError>
where
    R: KeymapRegistry + ?Sized,
    S: PropertyStore,
{
    let graph = overlay.graph(registry);

    if let Some(name) = properties.load(COMMAND_MODE_KEYMAP_KEY) {
        if graph.is_ergo_family_name(&name) {
            return Ok(name);
        }
        tracing::warn!(keymap = %name, "remembered command-mode keymap is unusable, falling back");
    }

    let default = &config.default_command_keymap;
    if graph.by_name(default).is_err() {
        tracing::error!(keymap = %default, "default command-mode keymap not found");
        return Err(ModeError::Configuration(format!(
            "default command-mode keymap {:?} not found",
            default
        )));
    }
    if !graph.is_ergo_family_name(default) {
        tracing::warn!(
            keymap = %default,
            root = overlay.root(),
            "default command-mode keymap does not descend from the root marker"
        );
    }
    Ok(default.clone())
}
