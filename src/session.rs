//! In-process host integration
//!
//! A [`Session`] plays the host's part: it owns the keymap registry and the
//! open editors, and forwards every event to the [`ModeController`]. Keymap
//! activations made by the controller are delivered back to it as change
//! notifications, the way a real host would fire them.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::ErgoKeysConfig;
use crate::editor::{EditorId, EditorSurface, ScratchEditor};
use crate::keymap::{KeymapError, KeymapManager, KeymapRegistry};
use crate::mode::{KeymapChange, Mode, ModeController, ModeError};
use crate::store::PropertyStore;

/// Change notifications delivered per event before giving up
const MAX_DISPATCH: usize = 16;

pub struct Session<S: PropertyStore> {
    keymaps: KeymapManager,
    editors: HashMap<EditorId, ScratchEditor>,
    controller: ModeController<S>,
    next_editor_id: u64,
}

impl<S: PropertyStore> Session<S> {
    pub fn start(
        config: ErgoKeysConfig,
        mut keymaps: KeymapManager,
        store: S,
    ) -> Result<Self, ModeError> {
        let controller = ModeController::start(config, &mut keymaps, store)?;
        let mut session = Self {
            keymaps,
            editors: HashMap::new(),
            controller,
            next_editor_id: 1,
        };
        session.dispatch_keymap_changes();
        Ok(session)
    }

    pub fn keymaps(&self) -> &KeymapManager {
        &self.keymaps
    }

    pub fn controller(&self) -> &ModeController<S> {
        &self.controller
    }

    pub fn store_mut(&mut self) -> &mut S {
        self.controller.store_mut()
    }

    pub fn mode(&self) -> Mode {
        self.controller.mode(&self.keymaps)
    }

    pub fn editor(&self, id: EditorId) -> Option<&ScratchEditor> {
        self.editors.get(&id)
    }

    /// Open an editor, file-backed if `file` is given
    pub fn open_editor(&mut self, file: Option<PathBuf>) -> EditorId {
        let id = EditorId(self.next_editor_id);
        self.next_editor_id += 1;
        self.editors.insert(id, ScratchEditor::new(id, file));
        id
    }

    pub fn close_editor(&mut self, id: EditorId) {
        self.editors.remove(&id);
    }

    pub fn focus_editor(&mut self, id: EditorId) {
        if let Some(editor) = self.editors.get_mut(&id) {
            self.controller
                .on_editor_focus_gained(&mut self.keymaps, editor);
        }
        self.dispatch_keymap_changes();
    }

    pub fn blur_editor(&mut self, id: EditorId) {
        if let Some(editor) = self.editors.get_mut(&id) {
            self.controller.on_editor_focus_lost(&mut self.keymaps, editor);
        }
        self.dispatch_keymap_changes();
    }

    /// Explicit command-mode request (e.g. from a shortcut) for `id`
    pub fn command_mode(&mut self, id: EditorId) {
        if let Some(editor) = self.editors.get_mut(&id) {
            self.controller
                .activate_command_mode(&mut self.keymaps, editor);
        }
        self.dispatch_keymap_changes();
    }

    /// Explicit insert-mode request for `id`
    pub fn insert_mode(&mut self, id: EditorId) {
        let editor = self
            .editors
            .get_mut(&id)
            .map(|e| e as &mut dyn EditorSurface);
        self.controller.activate_insert_mode(&mut self.keymaps, editor);
        self.dispatch_keymap_changes();
    }

    /// Run a host action in the context of `editor`
    ///
    /// Returns true if the action forced insert mode first.
    pub fn run_action(&mut self, action_id: &str, editor: Option<EditorId>) -> bool {
        let surface = editor
            .and_then(|id| self.editors.get_mut(&id))
            .map(|e| e as &mut dyn EditorSurface);
        let forced = self
            .controller
            .on_before_action(&mut self.keymaps, action_id, surface);
        self.dispatch_keymap_changes();
        forced
    }

    /// The user picked `name` as the active keymap in the host's settings
    pub fn switch_keymap(&mut self, name: &str) -> Result<Vec<KeymapChange>, KeymapError> {
        if self.keymaps.keymap(name).is_none() {
            return Err(KeymapError::NotFound(name.to_string()));
        }
        self.keymaps.set_active_keymap(name);
        Ok(self.dispatch_keymap_changes())
    }

    /// Deliver queued keymap-change notifications to the controller
    fn dispatch_keymap_changes(&mut self) -> Vec<KeymapChange> {
        let mut changes = Vec::new();
        while let Some(name) = self.keymaps.take_change() {
            if changes.len() >= MAX_DISPATCH {
                tracing::warn!(
                    keymap = %name,
                    "too many keymap changes for one event, dropping the rest"
                );
                while self.keymaps.take_change().is_some() {}
                break;
            }
            let change =
                self.controller
                    .on_keymap_changed(&mut self.keymaps, &mut self.editors, &name);
            changes.push(change);
        }
        changes
    }
}
