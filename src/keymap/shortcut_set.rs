//! Action table of a keymap: action id → set of shortcuts
//!
//! The table is a set per action, never a multiset. [`ShortcutSet::extend`]
//! and [`ShortcutSet::purge`] are the two primitives the overlay engine is
//! built from.

use std::collections::BTreeMap;

use super::shortcut::Shortcut;

/// Mapping from action id to the shortcuts bound to it
///
/// Shortcuts keep their insertion order within an action so that extending
/// and then purging the same source leaves the remaining order untouched.
/// Actions with no shortcuts are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShortcutSet {
    actions: BTreeMap<String, Vec<Shortcut>>,
}

impl ShortcutSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from (action, shortcut) pairs, dropping duplicates
    pub fn with_bindings<I, A>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (A, Shortcut)>,
        A: Into<String>,
    {
        let mut set = Self::new();
        for (action, shortcut) in bindings {
            set.add_shortcut(action, shortcut);
        }
        set
    }

    /// Action ids that have at least one shortcut, in sorted order
    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Shortcuts bound to `action_id`; empty if the action is unbound
    pub fn shortcuts_for(&self, action_id: &str) -> &[Shortcut] {
        self.actions
            .get(action_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, action_id: &str, shortcut: &Shortcut) -> bool {
        self.shortcuts_for(action_id).contains(shortcut)
    }

    /// Every (action, shortcut) binding in the table
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Shortcut)> {
        self.actions.iter().flat_map(|(action, shortcuts)| {
            shortcuts
                .iter()
                .map(move |shortcut| (action.as_str(), shortcut))
        })
    }

    /// Actions a shortcut triggers in this table
    pub fn actions_for(&self, shortcut: &Shortcut) -> Vec<&str> {
        self.bindings()
            .filter(|(_, s)| *s == shortcut)
            .map(|(action, _)| action)
            .collect()
    }

    /// Total number of bindings
    pub fn len(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Bind `shortcut` to `action_id`. Returns false if it was already bound.
    pub fn add_shortcut(&mut self, action_id: impl Into<String>, shortcut: Shortcut) -> bool {
        let shortcuts = self.actions.entry(action_id.into()).or_default();
        if shortcuts.contains(&shortcut) {
            return false;
        }
        shortcuts.push(shortcut);
        true
    }

    /// Unbind `shortcut` from `action_id`. Returns false if it was not bound.
    pub fn remove_shortcut(&mut self, action_id: &str, shortcut: &Shortcut) -> bool {
        let Some(shortcuts) = self.actions.get_mut(action_id) else {
            return false;
        };
        let Some(idx) = shortcuts.iter().position(|s| s == shortcut) else {
            return false;
        };
        shortcuts.remove(idx);
        if shortcuts.is_empty() {
            self.actions.remove(action_id);
        }
        true
    }

    /// Ensure every binding of `src` also exists here
    ///
    /// Idempotent. Returns the number of bindings actually added.
    pub fn extend(&mut self, src: &ShortcutSet) -> usize {
        let mut added = 0;
        for (action, shortcut) in src.bindings() {
            if self.add_shortcut(action, *shortcut) {
                added += 1;
            }
        }
        added
    }

    /// Bindings of this table that `other` lacks
    pub fn difference(&self, other: &ShortcutSet) -> ShortcutSet {
        ShortcutSet::with_bindings(
            self.bindings()
                .filter(|(action, shortcut)| !other.contains(action, shortcut))
                .map(|(action, shortcut)| (action, *shortcut)),
        )
    }

    /// Remove every binding of `src` from this table
    ///
    /// Bindings missing here are skipped. Returns the number actually removed.
    pub fn purge(&mut self, src: &ShortcutSet) -> usize {
        let mut removed = 0;
        for (action, shortcut) in src.bindings() {
            if self.remove_shortcut(action, shortcut) {
                removed += 1;
            }
        }
        removed
    }
}
