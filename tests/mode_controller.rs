//! Mode controller tests: startup resolution, keymap-change handling,
//! focus events and mode activation

mod common;

use std::collections::HashMap;
use std::path::PathBuf;

use common::{fixture_manager, sc, FailingStore, RecordingStore};
use ergokeys::editor::ScratchEditor;
use ergokeys::keymap::{Keymap, KeymapManager, KeymapRegistry};
use ergokeys::{
    CursorStyle, EditorId, ErgoKeysConfig, KeymapChange, Mode, ModeController, ModeError,
};

const INSERT_KEY: &str = "ergokeys.insertModeKeymapName";
const COMMAND_KEY: &str = "ergokeys.commandModeKeymapName";

fn start(
    manager: &mut KeymapManager,
    store: RecordingStore,
) -> ModeController<RecordingStore> {
    ModeController::start(ErgoKeysConfig::default(), manager, store).unwrap()
}

fn file_editor(id: u64) -> ScratchEditor {
    ScratchEditor::new(EditorId(id), Some(PathBuf::from("main.rs")))
}

fn no_editors() -> HashMap<EditorId, ScratchEditor> {
    HashMap::new()
}

// ========================================================================
// Startup
// ========================================================================

#[test]
fn test_startup_without_persisted_state() {
    let mut manager = fixture_manager("Default");
    let controller = start(&mut manager, RecordingStore::new());

    assert_eq!(controller.insert_mode_keymap(), "Default");
    assert_eq!(controller.command_mode_keymap(), "ErgoKeys (QWERTY)");
    assert_eq!(controller.store().value(INSERT_KEY), Some("Default"));
    assert_eq!(controller.store().value(COMMAND_KEY), Some("ErgoKeys (QWERTY)"));

    let default = manager.keymap("Default").unwrap();
    assert!(default.shortcuts().contains("SaveAll", &sc("ctrl+shift+s")));
    assert!(default.shortcuts().contains("ergokeys.CommandMode", &sc("alt+space")));
}

#[test]
fn test_startup_uses_persisted_keymaps() {
    let mut manager = fixture_manager("Default");
    let store = RecordingStore::with(&[(INSERT_KEY, "Emacs"), (COMMAND_KEY, "My Layout")]);
    let controller = start(&mut manager, store);

    assert_eq!(controller.insert_mode_keymap(), "Emacs");
    assert_eq!(controller.command_mode_keymap(), "My Layout");
    assert!(manager
        .keymap("Emacs")
        .unwrap()
        .shortcuts()
        .contains("EditorUp", &sc("i")));
    assert!(!manager
        .keymap("Default")
        .unwrap()
        .shortcuts()
        .contains("EditorUp", &sc("i")));
}

#[test]
fn test_startup_deleted_insert_keymap_falls_back_to_active() {
    let mut manager = fixture_manager("Emacs");
    let store = RecordingStore::with(&[(INSERT_KEY, "Deleted Keymap")]);
    let controller = start(&mut manager, store);

    assert_eq!(controller.insert_mode_keymap(), "Emacs");
    assert_eq!(controller.store().value(INSERT_KEY), Some("Emacs"));
}

#[test]
fn test_startup_non_ergo_command_keymap_falls_back_to_default() {
    let mut manager = fixture_manager("Default");
    let store = RecordingStore::with(&[(COMMAND_KEY, "Emacs")]);
    let controller = start(&mut manager, store);

    assert_eq!(controller.command_mode_keymap(), "ErgoKeys (QWERTY)");
    assert_eq!(controller.store().value(COMMAND_KEY), Some("ErgoKeys (QWERTY)"));
}

#[test]
fn test_startup_while_in_command_mode_uses_default_base() {
    let mut manager = fixture_manager("My Layout");
    let controller = start(&mut manager, RecordingStore::new());

    assert_eq!(controller.insert_mode_keymap(), "$default");
    assert_eq!(controller.mode(&manager), Mode::Command);
}

#[test]
fn test_startup_without_any_usable_insert_keymap() {
    let mut manager = KeymapManager::new(
        vec![
            Keymap::new("$ergokeys"),
            Keymap::new("ErgoKeys (QWERTY)").with_parent("$ergokeys"),
        ],
        "ErgoKeys (QWERTY)",
    )
    .unwrap();

    let err = ModeController::start(ErgoKeysConfig::default(), &mut manager, RecordingStore::new())
        .unwrap_err();
    assert!(matches!(err, ModeError::Configuration(_)));
}

#[test]
fn test_failed_startup_persists_nothing() {
    let mut manager = fixture_manager("Emacs");
    let config = ErgoKeysConfig {
        default_command_keymap: "ErgoKeys (Dvorak)".to_string(),
        ..ErgoKeysConfig::default()
    };
    let mut store = RecordingStore::new();

    let err = ModeController::start(config, &mut manager, &mut store).unwrap_err();

    assert!(matches!(err, ModeError::Configuration(_)));
    assert!(store.writes.is_empty());
    assert_eq!(store.value(INSERT_KEY), None);
}

#[test]
fn test_startup_materializes_deferred_keymaps() {
    let mut keymaps = common::fixture_keymaps();
    let qwerty = keymaps
        .iter_mut()
        .find(|k| k.name() == "ErgoKeys (QWERTY)")
        .unwrap();
    *qwerty = qwerty.clone().deferred();
    let mut manager = KeymapManager::new(keymaps, "Default").unwrap();

    let controller = start(&mut manager, RecordingStore::new());

    assert!(controller.is_ergo_keys_keymap(&manager, "ErgoKeys (QWERTY)"));
    assert!(manager
        .keymap("Default")
        .unwrap()
        .shortcuts()
        .contains("SaveAll", &sc("ctrl+shift+s")));
}

#[test]
fn test_startup_survives_failing_store() {
    let mut manager = fixture_manager("Default");
    let controller =
        ModeController::start(ErgoKeysConfig::default(), &mut manager, FailingStore).unwrap();
    assert_eq!(controller.insert_mode_keymap(), "Default");
}

// ========================================================================
// Keymap changes
// ========================================================================

#[test]
fn test_change_to_tracked_keymap_is_ignored() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let writes = controller.store().writes.len();
    let mut editors = no_editors();

    for name in ["ErgoKeys (QWERTY)", "Default"] {
        let change = controller.on_keymap_changed(&mut manager, &mut editors, name);
        assert_eq!(change, KeymapChange::Ignored);
    }
    assert_eq!(controller.store().writes.len(), writes);
}

#[test]
fn test_change_to_unregistered_keymap_is_ignored() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let change = controller.on_keymap_changed(&mut manager, &mut no_editors(), "Vim");
    assert_eq!(change, KeymapChange::Ignored);
    assert_eq!(controller.insert_mode_keymap(), "Default");
}

#[test]
fn test_change_to_other_ergo_keymap_sets_command_keymap() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());

    manager.set_active_keymap("My Layout");
    let change = controller.on_keymap_changed(&mut manager, &mut no_editors(), "My Layout");

    assert_eq!(change, KeymapChange::CommandKeymap("My Layout".to_string()));
    assert_eq!(controller.command_mode_keymap(), "My Layout");
    assert_eq!(controller.insert_mode_keymap(), "Default");
    assert_eq!(controller.store().value(COMMAND_KEY), Some("My Layout"));
}

#[test]
fn test_change_to_ergo_keymap_registered_after_startup() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());

    manager
        .add_keymap(
            Keymap::new("Colemak")
                .with_parent("$ergokeys")
                .deferred(),
        )
        .unwrap();
    assert!(controller.is_ergo_keys_keymap(&manager, "Colemak"));

    manager.set_active_keymap("Colemak");
    let change = controller.on_keymap_changed(&mut manager, &mut no_editors(), "Colemak");

    assert_eq!(change, KeymapChange::CommandKeymap("Colemak".to_string()));
    assert_eq!(controller.command_mode_keymap(), "Colemak");
}

#[test]
fn test_change_to_new_base_keymap_moves_overlay() {
    let mut manager = fixture_manager("Default");
    let pristine_default = manager.keymap("Default").unwrap().shortcuts().clone();
    let mut controller = start(&mut manager, RecordingStore::new());

    let mut editors = HashMap::new();
    let mut editor = file_editor(1);
    controller.on_editor_focus_gained(&mut manager, &mut editor);
    editors.insert(EditorId(1), editor);
    assert_eq!(controller.mode(&manager), Mode::Command);

    manager.set_active_keymap("Emacs");
    let change = controller.on_keymap_changed(&mut manager, &mut editors, "Emacs");

    assert_eq!(
        change,
        KeymapChange::InsertKeymap {
            previous: "Default".to_string(),
            current: "Emacs".to_string(),
        }
    );
    assert_eq!(controller.insert_mode_keymap(), "Emacs");
    assert_eq!(controller.store().value(INSERT_KEY), Some("Emacs"));
    assert_eq!(manager.keymap("Default").unwrap().shortcuts(), &pristine_default);
    assert!(manager
        .keymap("Emacs")
        .unwrap()
        .shortcuts()
        .contains("ergokeys.CommandMode", &sc("alt+space")));

    // The remembered editor is switched back to insert presentation
    assert_eq!(manager.active_keymap(), "Emacs");
    assert_eq!(editors[&EditorId(1)].cursor_style(), CursorStyle::Line);
}

#[test]
fn test_change_to_base_keymap_with_released_editor() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(7);
    controller.on_editor_focus_gained(&mut manager, &mut editor);
    drop(editor);

    manager.set_active_keymap("Emacs");
    let change = controller.on_keymap_changed(&mut manager, &mut no_editors(), "Emacs");

    assert!(matches!(change, KeymapChange::InsertKeymap { .. }));
    assert_eq!(controller.mode(&manager), Mode::Insert);
}

// ========================================================================
// Focus and mode activation
// ========================================================================

#[test]
fn test_focus_gained_on_file_editor_enters_command_mode() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(3);

    controller.on_editor_focus_gained(&mut manager, &mut editor);

    assert_eq!(manager.active_keymap(), "ErgoKeys (QWERTY)");
    assert_eq!(editor.cursor_style(), CursorStyle::Block);
    assert_eq!(controller.last_editor_used(), Some(EditorId(3)));
}

#[test]
fn test_focus_gained_on_ephemeral_editor_keeps_mode() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut console = ScratchEditor::new(EditorId(4), None);

    controller.on_editor_focus_gained(&mut manager, &mut console);

    assert_eq!(manager.active_keymap(), "Default");
    assert_eq!(console.cursor_style(), CursorStyle::Line);
    assert_eq!(controller.last_editor_used(), Some(EditorId(4)));
}

#[test]
fn test_focus_lost_enters_insert_mode() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(1);

    controller.on_editor_focus_gained(&mut manager, &mut editor);
    controller.on_editor_focus_lost(&mut manager, &mut editor);

    assert_eq!(manager.active_keymap(), "Default");
    assert_eq!(editor.cursor_style(), CursorStyle::Line);
    assert_eq!(controller.mode(&manager), Mode::Insert);
}

#[test]
fn test_command_mode_without_toggle_is_idempotent() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(1);

    controller.activate_command_mode(&mut manager, &mut editor);
    controller.activate_command_mode(&mut manager, &mut editor);

    assert_eq!(controller.mode(&manager), Mode::Command);
    assert_eq!(editor.cursor_style(), CursorStyle::Block);
}

#[test]
fn test_command_mode_toggle_returns_to_insert() {
    let mut manager = fixture_manager("Default");
    let config = ErgoKeysConfig {
        command_mode_toggle: true,
        ..ErgoKeysConfig::default()
    };
    let mut controller = ModeController::start(config, &mut manager, RecordingStore::new()).unwrap();
    let mut editor = file_editor(1);

    controller.activate_command_mode(&mut manager, &mut editor);
    assert_eq!(controller.mode(&manager), Mode::Command);

    controller.activate_command_mode(&mut manager, &mut editor);
    assert_eq!(controller.mode(&manager), Mode::Insert);
    assert_eq!(manager.active_keymap(), "Default");
    assert_eq!(editor.cursor_style(), CursorStyle::Line);
}

#[test]
fn test_insert_mode_without_editor() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(1);
    controller.activate_command_mode(&mut manager, &mut editor);

    controller.activate_insert_mode(&mut manager, None);

    assert_eq!(manager.active_keymap(), "Default");
    // Without a surface the cursor presentation is left alone
    assert_eq!(editor.cursor_style(), CursorStyle::Block);
}

#[test]
fn test_before_action_on_allow_list_forces_insert_mode() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(1);
    controller.activate_command_mode(&mut manager, &mut editor);

    assert!(!controller.on_before_action(&mut manager, "EditorUp", Some(&mut editor)));
    assert_eq!(controller.mode(&manager), Mode::Command);

    assert!(controller.on_before_action(&mut manager, "RenameElement", Some(&mut editor)));
    assert_eq!(controller.mode(&manager), Mode::Insert);
    assert_eq!(editor.cursor_style(), CursorStyle::Line);
}

#[test]
fn test_before_intercepted_action_enters_insert_mode() {
    let mut manager = fixture_manager("Default");
    let mut controller = start(&mut manager, RecordingStore::new());
    let mut editor = file_editor(1);
    controller.activate_command_mode(&mut manager, &mut editor);

    controller.on_before_intercepted_action(&mut manager, None);

    assert_eq!(controller.mode(&manager), Mode::Insert);
}
