//! Keymap: a named action table with an optional parent

use super::shortcut::Shortcut;
use super::shortcut_set::ShortcutSet;

/// Parent link and action table waiting to be materialized
#[derive(Debug, Clone)]
struct Deferred {
    parent: Option<String>,
    shortcuts: ShortcutSet,
}

/// A named keymap owned by the host's registry
///
/// The parent is referenced by name only; the registry resolves it when an
/// ancestry walk needs it. A keymap may be *deferred*: until
/// [`force_load`](Keymap::force_load) is called it reports no parent and an
/// empty table, the way hosts populate keymaps lazily.
#[derive(Debug, Clone)]
pub struct Keymap {
    name: String,
    parent: Option<String>,
    shortcuts: ShortcutSet,
    deferred: Option<Deferred>,
}

impl Keymap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            shortcuts: ShortcutSet::new(),
            deferred: None,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_shortcuts(mut self, shortcuts: ShortcutSet) -> Self {
        self.shortcuts = shortcuts;
        self
    }

    /// Hide the parent link and table until the keymap is force-loaded
    pub fn deferred(mut self) -> Self {
        self.deferred = Some(Deferred {
            parent: self.parent.take(),
            shortcuts: std::mem::take(&mut self.shortcuts),
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name of the parent keymap, if loaded and present
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.deferred.is_none()
    }

    /// Materialize a deferred keymap. Returns true if anything was loaded.
    pub fn force_load(&mut self) -> bool {
        let Some(deferred) = self.deferred.take() else {
            return false;
        };
        tracing::trace!(keymap = %self.name, "materialized deferred keymap");
        self.parent = deferred.parent;
        self.shortcuts.extend(&deferred.shortcuts);
        true
    }

    pub fn shortcuts(&self) -> &ShortcutSet {
        &self.shortcuts
    }

    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.shortcuts.action_ids()
    }

    pub fn shortcuts_for(&self, action_id: &str) -> &[Shortcut] {
        self.shortcuts.shortcuts_for(action_id)
    }

    /// Mutable access to the action table. Materializes a deferred keymap first.
    pub fn shortcuts_mut(&mut self) -> &mut ShortcutSet {
        self.force_load();
        &mut self.shortcuts
    }

    pub fn add_shortcut(&mut self, action_id: impl Into<String>, shortcut: Shortcut) -> bool {
        self.shortcuts_mut().add_shortcut(action_id, shortcut)
    }

    pub fn remove_shortcut(&mut self, action_id: &str, shortcut: &Shortcut) -> bool {
        self.shortcuts_mut().remove_shortcut(action_id, shortcut)
    }
}

/// Keymaps are identified by name
impl PartialEq for Keymap {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Keymap {}
