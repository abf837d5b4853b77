//! Binary entry point that glues the SQLite-backed catalog to the TUI: resolve
//! paths, start file logging, open the store, and drive the Ratatui event loop
//! until the user exits.
use anyhow::Context;
use book_catalog::config::Config;
use book_catalog::logging::init_tracing;
use book_catalog::{run_app, App, Presenter, Store};

fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    let _log_guard = init_tracing(&config.log_dir)?;

    let store = Store::open(&config.db_path).context("failed to open catalog database")?;
    let presenter = Presenter::new(store).context("failed to load books")?;

    let mut app = App::new(presenter, config.default_export_path);
    run_app(&mut app)
}
