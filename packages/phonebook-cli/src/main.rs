//! Phonebook CLI
//!
//! Thin front end over `phonebook-storage`.
//!
//! # Usage
//!
//! ```bash
//! phonebook add "Alice Smith" 12345678901 alice@example.com
//! phonebook search ali
//! phonebook list --sorted --json
//! phonebook edit "Alice Smith" 12345678901 "Alice Johnson" 12345678901 alicej@example.com
//! phonebook delete "Alice Johnson" 12345678901
//!
//! # Use another store, or a YAML config file
//! phonebook --db /tmp/friends.db list
//! phonebook --config phonebook.yaml list
//! ```

mod commands;
mod config;

use anyhow::Context;
use clap::Parser;
use phonebook_storage::ContactBook;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::{Commands, OutputFormat};
use config::AppConfig;

#[derive(Parser)]
#[command(name = "phonebook")]
#[command(about = "Local telephone book backed by SQLite", long_about = None)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Contact database path (overrides the config file)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Print contacts as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = AppConfig::resolve(cli.config.as_deref(), cli.db.as_deref())
        .context("failed to load configuration")?;
    init_tracing(&config.log_level);

    let mut book = ContactBook::new();
    book.initialize(&config.database).with_context(|| {
        format!(
            "cannot open contact database at {}",
            config.database.display()
        )
    })?;

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Table
    };
    let ok = commands::execute(&mut book, &cli.command, format, &mut io::stdout().lock())?;

    book.shutdown();
    info!("phonebook finished (success={})", ok);

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
