use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tp_cli::commands::{cases, durations, encode, events, import, metrics, migrate, record, report};
use tp_cli::{Cli, Commands, Config};

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(tp_db::Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = tp_db::Database::open(&config.database_path).context("failed to open database")?;
    Ok((db, config))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so JSON output on stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        // No subcommand, show help
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let mut out = io::stdout().lock();

    match command {
        Commands::Migrate { reset } => migrate::run(&mut out, &db, *reset)?,
        Commands::Record(args) => record::run(&mut out, &mut db, args)?,
        Commands::Import(args) => {
            let inserted = import::run(io::stdin().lock(), &mut db, args)?;
            writeln!(out, "Imported {inserted} events")?;
        }
        Commands::Events { case } => events::run(&mut out, &db, case.as_deref())?,
        Commands::Cases => cases::run(&mut out, &db)?,
        Commands::Metrics { case, json } => metrics::run(&mut out, &db, case, *json)?,
        Commands::Durations { case, json, all } => {
            let hide_empty = config.hide_empty_groups && !*all;
            durations::run(&mut out, &db, case, *json, hide_empty)?;
        }
        Commands::Encode { case, labels } => encode::run(&mut out, &db, case, *labels)?,
        Commands::Report { json } => {
            report::run(&mut out, &db, *json, config.hide_empty_groups)?;
        }
    }

    Ok(())
}
