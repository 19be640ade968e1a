use anyhow::{Context, Result};
use clap::Parser;

use ergokeys::cli::{self, CliArgs, ACTIVE_KEYMAP_KEY, DEFAULT_ACTIVE_KEYMAP};
use ergokeys::config_paths;
use ergokeys::keymap::{load_default_keymaps, load_keymaps_file, KeymapManager, KeymapRegistry};
use ergokeys::store::{FileStore, PropertyStore};
use ergokeys::{ErgoKeysConfig, Session};

fn main() -> Result<()> {
    ergokeys::tracing::init();

    let args = CliArgs::parse();

    let mut config = match &args.config {
        Some(path) => ErgoKeysConfig::load_from(path),
        None => ErgoKeysConfig::load(),
    };
    if args.toggle {
        config.command_mode_toggle = true;
    }

    let keymaps = match &args.keymaps {
        Some(path) => load_keymaps_file(path)
            .with_context(|| format!("loading keymaps from {}", path.display()))?,
        None => load_default_keymaps(),
    };

    let state_path = match &args.state {
        Some(path) => path.clone(),
        None => config_paths::state_file().context("no config directory for the state file")?,
    };
    let store = FileStore::open(&state_path);

    let known = |name: &str| keymaps.iter().any(|k| k.name() == name);
    let active = store
        .get(ACTIVE_KEYMAP_KEY)
        .filter(|name| known(name))
        .or_else(|| known(DEFAULT_ACTIVE_KEYMAP).then(|| DEFAULT_ACTIVE_KEYMAP.to_string()))
        .or_else(|| keymaps.first().map(|k| k.name().to_string()))
        .context("no keymaps defined")?;
    let manager = KeymapManager::new(keymaps, &active)?;

    let mut session = Session::start(config, manager, store)?;
    tracing::info!(state = %state_path.display(), active = %active, "session started");

    let output = cli::execute(&mut session, &args.command())?;
    print!("{}", output);

    let active = session.keymaps().active_keymap().to_string();
    session
        .store_mut()
        .set(ACTIVE_KEYMAP_KEY, &active)
        .with_context(|| format!("writing {}", state_path.display()))?;

    Ok(())
}
