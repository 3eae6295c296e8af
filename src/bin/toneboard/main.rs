//! toneboard - terminal keyboard for the tone engine
//!
//! Run with: cargo run --bin toneboard
//! Logs go to toneboard.log (set RUST_LOG=debug for voice lifecycle detail).

mod app;
mod ui;

use std::fs::File;

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use env_logger::{Env, Target};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let terminal = ratatui::init();
    let res = app::run(terminal);
    ratatui::restore();

    if let Err(err) = &res {
        log::error!("toneboard exited with error: {err:#}");
    }
    res
}

/// Log to a file so records never tear through the terminal UI.
fn init_logging() -> EyreResult<()> {
    let file = File::create("toneboard.log").wrap_err("failed to create toneboard.log")?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
