//! Command-mode shortcut overlay
//!
//! Layers the bindings of every ergo-family keymap onto a base keymap, and
//! strips them off again when that keymap stops being the insert-mode base.
//! When several ergo keymaps bind the same action differently, all bindings
//! coexist.
//!
//! The engine remembers, per target, exactly which bindings it added. A
//! binding the target already had is never recorded, so removing the overlay
//! restores the target's own table even where it overlaps an ergo keymap.

use std::collections::BTreeMap;

use crate::keymap::{KeymapError, KeymapGraph, KeymapRegistry, ShortcutSet};

/// Outcome of applying or removing an overlay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OverlayStats {
    /// Ergo-family keymaps considered as sources
    pub sources: usize,
    /// Bindings actually added to (or removed from) the target
    pub bindings: usize,
}

/// Computes and applies the ergo overlay on target keymaps
#[derive(Debug, Clone)]
pub struct OverlayEngine {
    root: String,
    max_depth: usize,
    /// Bindings added by this engine, per target keymap
    added: BTreeMap<String, ShortcutSet>,
}

impl OverlayEngine {
    pub fn new(root: impl Into<String>, max_depth: usize) -> Self {
        Self {
            root: root.into(),
            max_depth,
            added: BTreeMap::new(),
        }
    }

    /// Root marker name of the ergo family
    pub fn root(&self) -> &str {
        &self.root
    }

    /// A fresh view of `registry`'s hierarchy
    pub fn graph<'a, R: KeymapRegistry + ?Sized>(&'a self, registry: &'a R) -> KeymapGraph<'a, R> {
        KeymapGraph::new(registry, &self.root, self.max_depth)
    }

    /// Bindings currently layered onto `target` by this engine
    pub fn added_to(&self, target: &str) -> Option<&ShortcutSet> {
        self.added.get(target)
    }

    /// Extend `target` with the bindings of every ergo-family keymap
    ///
    /// Idempotent: a second call adds nothing.
    pub fn apply_overlay<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        target: &str,
    ) -> Result<OverlayStats, KeymapError> {
        let sources = self.overlay_sources(registry, target)?;
        let keymap = registry
            .keymap_mut(target)
            .ok_or_else(|| KeymapError::NotFound(target.to_string()))?;
        let record = self.added.entry(target.to_string()).or_default();

        let mut stats = OverlayStats::default();
        for (name, shortcuts) in &sources {
            let missing = shortcuts.difference(keymap.shortcuts());
            let added = keymap.shortcuts_mut().extend(&missing);
            record.extend(&missing);
            tracing::trace!(source = %name, keymap = target, added, "extended keymap");
            stats.sources += 1;
            stats.bindings += added;
        }
        if record.is_empty() {
            self.added.remove(target);
        }

        tracing::debug!(
            keymap = target,
            sources = stats.sources,
            added = stats.bindings,
            "applied command-mode overlay"
        );
        Ok(stats)
    }

    /// Remove the bindings this engine added to `target`
    ///
    /// Bindings `target` had before the overlay stay. Removing an overlay
    /// that was never applied is a no-op.
    pub fn remove_overlay<R: KeymapRegistry + ?Sized>(
        &mut self,
        registry: &mut R,
        target: &str,
    ) -> Result<OverlayStats, KeymapError> {
        let sources = self.overlay_sources(registry, target)?;
        let keymap = registry
            .keymap_mut(target)
            .ok_or_else(|| KeymapError::NotFound(target.to_string()))?;

        let removed = match self.added.remove(target) {
            Some(record) => keymap.shortcuts_mut().purge(&record),
            None => 0,
        };
        let stats = OverlayStats {
            sources: sources.len(),
            bindings: removed,
        };

        tracing::debug!(
            keymap = target,
            sources = stats.sources,
            removed = stats.bindings,
            "removed command-mode overlay"
        );
        Ok(stats)
    }

    /// Snapshot of every ergo-family table except the target's own
    ///
    /// Purging a keymap's own bindings from itself would empty it, so the
    /// target never counts as a source.
    fn overlay_sources<R: KeymapRegistry + ?Sized>(
        &self,
        registry: &R,
        target: &str,
    ) -> Result<Vec<(String, ShortcutSet)>, KeymapError> {
        let graph = self.graph(registry);
        graph.by_name(target)?;

        Ok(graph
            .ergo_family_members()
            .into_iter()
            .filter(|keymap| keymap.name() != target)
            .map(|keymap| (keymap.name().to_string(), keymap.shortcuts().clone()))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keymap::{Keymap, KeymapManager, Shortcut};

    fn sc(s: &str) -> Shortcut {
        s.parse().unwrap()
    }

    fn manager() -> KeymapManager {
        KeymapManager::new(
            vec![
                Keymap::new("Default").with_shortcuts(ShortcutSet::with_bindings([(
                    "SaveAll",
                    sc("ctrl+s"),
                )])),
                Keymap::new("$ergokeys").with_shortcuts(ShortcutSet::with_bindings([(
                    "ergokeys.CommandMode",
                    sc("alt+space"),
                )])),
                Keymap::new("$ergokeys/MyLayout")
                    .with_parent("$ergokeys")
                    .with_shortcuts(ShortcutSet::with_bindings([(
                        "SaveAll",
                        sc("ctrl+shift+s"),
                    )])),
            ],
            "Default",
        )
        .unwrap()
    }

    #[test]
    fn test_apply_then_remove_restores_target() {
        let mut manager = manager();
        let mut engine = OverlayEngine::new("$ergokeys", 64);
        let before = manager.keymap("Default").unwrap().shortcuts().clone();

        let applied = engine.apply_overlay(&mut manager, "Default").unwrap();
        assert_eq!(applied, OverlayStats { sources: 2, bindings: 2 });
        assert_eq!(
            manager.keymap("Default").unwrap().shortcuts_for("SaveAll"),
            &[sc("ctrl+s"), sc("ctrl+shift+s")]
        );

        let removed = engine.remove_overlay(&mut manager, "Default").unwrap();
        assert_eq!(removed.bindings, 2);
        assert_eq!(manager.keymap("Default").unwrap().shortcuts(), &before);
    }

    #[test]
    fn test_apply_twice_adds_nothing() {
        let mut manager = manager();
        let mut engine = OverlayEngine::new("$ergokeys", 64);
        engine.apply_overlay(&mut manager, "Default").unwrap();
        let once = manager.keymap("Default").unwrap().shortcuts().clone();

        let again = engine.apply_overlay(&mut manager, "Default").unwrap();
        assert_eq!(again.bindings, 0);
        assert_eq!(manager.keymap("Default").unwrap().shortcuts(), &once);
    }

    #[test]
    fn test_ergo_target_is_not_its_own_source() {
        let mut manager = manager();
        let mut engine = OverlayEngine::new("$ergokeys", 64);
        engine.apply_overlay(&mut manager, "$ergokeys/MyLayout").unwrap();
        engine.remove_overlay(&mut manager, "$ergokeys/MyLayout").unwrap();
        assert_eq!(
            manager
                .keymap("$ergokeys/MyLayout")
                .unwrap()
                .shortcuts_for("SaveAll"),
            &[sc("ctrl+shift+s")]
        );
    }

    #[test]
    fn test_unknown_target() {
        let mut manager = manager();
        let mut engine = OverlayEngine::new("$ergokeys", 64);
        assert_eq!(
            engine.apply_overlay(&mut manager, "Vim").unwrap_err(),
            KeymapError::NotFound("Vim".to_string())
        );
    }

    #[test]
    fn test_remove_keeps_bindings_the_target_already_had() {
        let mut manager = manager();
        manager
            .keymap_mut("$ergokeys/MyLayout")
            .unwrap()
            .add_shortcut("SaveAll", sc("ctrl+s"));
        let mut engine = OverlayEngine::new("$ergokeys", 64);
        let before = manager.keymap("Default").unwrap().shortcuts().clone();

        let applied = engine.apply_overlay(&mut manager, "Default").unwrap();
        assert_eq!(applied.bindings, 2);
        assert!(!engine
            .added_to("Default")
            .unwrap()
            .contains("SaveAll", &sc("ctrl+s")));

        engine.remove_overlay(&mut manager, "Default").unwrap();
        assert_eq!(manager.keymap("Default").unwrap().shortcuts(), &before);
        assert!(engine.added_to("Default").is_none());
    }
}
