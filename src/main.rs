//! mdprev - live preview server for markdown documents.

mod actor;
mod cli;
mod config;
mod core;
mod document;
mod embed;
mod logger;
mod page;
mod reload;
mod render;
mod utils;

use anyhow::Result;
use clap::ColorChoice;
use cli::Cli;
use config::ServeConfig;
use document::DocumentSet;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse_args();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let docs = DocumentSet::resolve(&cli.files)?;
    debug!("serve"; "documents: {:?}", docs.paths().collect::<Vec<_>>());

    let config = ServeConfig::from_cli(&cli);
    cli::serve::serve(&config, docs)
}
