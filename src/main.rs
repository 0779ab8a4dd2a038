mod adhan;
mod cli;
mod config;
mod db;
mod models;
mod prayer_times;
mod providers;
mod refresh;
mod tui;
mod utils;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use cli::args::{Cli, Commands};
use cli::handlers;
use config::AppConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The board owns the terminal, so it stays quiet unless RUST_LOG asks otherwise
    let default_level = if cli.command.is_none() { "off" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    let config = AppConfig::load().context("Loading config")?;

    let command = match cli.command {
        Some(Commands::Config { init }) => return handlers::handle_config(&config, init),
        other => other,
    };

    // Ensure data directory exists and open DB
    AppConfig::ensure_data_dir()?;
    let db_path = AppConfig::db_path()?;
    let conn = db::open(&db_path)?;

    match command {
        Some(Commands::Times) => handlers::handle_times(&conn, &config)?,
        Some(Commands::Fetch) => handlers::handle_fetch(&conn, &config)?,
        Some(Commands::Weather) => handlers::handle_weather(&conn, &config)?,
        Some(Commands::Adhan { action }) => handlers::handle_adhan(&conn, &config, &action)?,
        // Config never reaches the database
        Some(Commands::Config { .. }) => {}

        // No subcommand → launch TUI
        None => tui::app::run(conn, config)?,
    }

    Ok(())
}
