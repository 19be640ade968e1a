//! Command-line interface for the ergokeys host simulator
//!
//! Each invocation starts a session against the keymap definitions and the
//! persisted state, performs one event and reports the result:
//! - Show the tracked keymaps and the current mode
//! - Print a keymap's bindings with the overlay applied
//! - Simulate the user picking another keymap in the host's settings
//! - Enter command or insert mode in a file-backed editor
//! - Run a host action through the insert-mode allow-list

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::keymap::{KeymapError, KeymapRegistry};
use crate::mode::KeymapChange;
use crate::session::Session;
use crate::store::PropertyStore;

/// Host-side key in the state file holding the host's active keymap
pub const ACTIVE_KEYMAP_KEY: &str = "host.activeKeymap";

/// Active keymap when the state file has none
pub const DEFAULT_ACTIVE_KEYMAP: &str = "Default";

/// Modal editing through keymap switching
#[derive(Parser, Debug)]
#[command(
    name = "ergokeys",
    version,
    about = "Modal editing through keymap switching"
)]
pub struct CliArgs {
    /// Keymap definitions to use instead of the built-in ones
    #[arg(long, value_name = "FILE")]
    pub keymaps: Option<PathBuf>,

    /// State file (defaults to ~/.config/ergokeys/state.json)
    #[arg(long, value_name = "FILE")]
    pub state: Option<PathBuf>,

    /// Config file (defaults to ~/.config/ergokeys/config.yaml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Activating command mode while in command mode returns to insert mode
    #[arg(long)]
    pub toggle: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show the tracked keymaps and the current mode
    Status,
    /// Print the bindings of a keymap
    Show {
        #[arg(value_name = "KEYMAP")]
        keymap: String,
    },
    /// Make KEYMAP the host's active keymap
    Switch {
        #[arg(value_name = "KEYMAP")]
        keymap: String,
    },
    /// Enter command mode in a file-backed editor
    Command,
    /// Enter insert mode
    Insert,
    /// Run a host action in a file-backed editor
    Action {
        #[arg(value_name = "ACTION_ID")]
        id: String,
    },
}

impl CliArgs {
    /// Subcommand to run; `status` when none was given
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Status)
    }
}

/// Perform `command` against `session`, returning the text to print
pub fn execute<S: PropertyStore>(
    session: &mut Session<S>,
    command: &Command,
) -> Result<String, KeymapError> {
    let mut out = String::new();
    match command {
        Command::Status => {}
        Command::Show { keymap } => {
            let keymap = session
                .keymaps()
                .keymap(keymap)
                .ok_or_else(|| KeymapError::NotFound(keymap.clone()))?;
            for (action, shortcut) in keymap.shortcuts().bindings() {
                let _ = writeln!(out, "{:<32} {}", action, shortcut);
            }
            return Ok(out);
        }
        Command::Switch { keymap } => {
            for change in session.switch_keymap(keymap)? {
                match change {
                    KeymapChange::Ignored => {}
                    KeymapChange::CommandKeymap(name) => {
                        let _ = writeln!(out, "command-mode keymap: {}", name);
                    }
                    KeymapChange::InsertKeymap { previous, current } => {
                        let _ = writeln!(out, "insert-mode keymap: {} -> {}", previous, current);
                    }
                }
            }
        }
        Command::Command => {
            let editor = session.open_editor(Some(PathBuf::from("scratch.txt")));
            session.command_mode(editor);
        }
        Command::Insert => {
            let editor = session.open_editor(Some(PathBuf::from("scratch.txt")));
            session.insert_mode(editor);
        }
        Command::Action { id } => {
            let editor = session.open_editor(Some(PathBuf::from("scratch.txt")));
            session.focus_editor(editor);
            if session.run_action(id, Some(editor)) {
                let _ = writeln!(out, "{} forced insert mode", id);
            }
        }
    }
    out.push_str(&status(session));
    Ok(out)
}

/// Summary of the tracked keymaps and the current mode
pub fn status<S: PropertyStore>(session: &Session<S>) -> String {
    let controller = session.controller();
    format!(
        "mode:    {}\nactive:  {}\ninsert:  {}\ncommand: {}\n",
        session.mode(),
        session.keymaps().active_keymap(),
        controller.insert_mode_keymap(),
        controller.command_mode_keymap(),
    )
}
