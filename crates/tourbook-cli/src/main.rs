//! Tourbook CLI - Import show bookings from documents and e-mails.

use clap::Parser;
use std::fs;
use tourbook_cli::commands;
use tourbook_cli::{Cli, Command, Config, Formatter};
use tourbook_store::SqliteJobStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> tourbook_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing (log to stderr)
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    // Load config, writing a default file on first use
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None if Config::path()?.exists() => Config::load()?,
        None => {
            let config = Config::default();
            config.save().ok();
            config
        }
    };

    // Determine output format and color
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.settings.format);
    let color_enabled = !cli.no_color && config.settings.color;
    let formatter = Formatter::new(format, color_enabled);

    // Open the job store
    let db_path = match cli.db {
        Some(path) => path,
        None => config.db_path()?,
    };
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut store = SqliteJobStore::new(&db_path)?;

    match cli.command {
        Command::Import(args) => {
            commands::execute_import(args, &config, &mut store, &formatter).await?;
        }
        Command::Email(args) => {
            commands::execute_email(args, &config, &mut store, &formatter).await?;
        }
        Command::Retry(args) => {
            commands::execute_retry(args, &config, &mut store, &formatter).await?;
        }
        Command::Improve(args) => {
            commands::execute_improve(args, &config, &mut store, &formatter).await?;
        }
        Command::Show(args) => {
            commands::execute_show(args, &store, &formatter)?;
        }
        Command::Jobs(args) => {
            commands::execute_jobs(args, &config, &store, &formatter)?;
        }
    }

    Ok(())
}
