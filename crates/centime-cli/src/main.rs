//! Centime CLI - Rule-based bank transaction classifier
//!
//! Usage:
//!   centime init                              Initialize the database
//!   centime classify --label L --amount A     Classify one transaction
//!   centime batch --file tx.csv               Classify a CSV batch
//!   centime coverage --file tx.csv            Batch coverage statistics
//!   centime rules list                        Show the rule catalogue
//!   centime learn --label L --category C      Record a correction

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db),
        Commands::Classify {
            label,
            amount,
            account,
            json,
        } => {
            let db = commands::open_db(&cli.db)?;
            let store = commands::load_rules(cli.rules.as_ref())?;
            commands::cmd_classify(&db, store, &label, amount, account, json).await
        }
        Commands::Batch { file, json } => {
            let db = commands::open_db(&cli.db)?;
            let store = commands::load_rules(cli.rules.as_ref())?;
            commands::cmd_batch(&db, store, &file, json).await
        }
        Commands::Coverage { file, json } => {
            let db = commands::open_db(&cli.db)?;
            let store = commands::load_rules(cli.rules.as_ref())?;
            commands::cmd_coverage(&db, store, &file, json).await
        }
        Commands::Rules { action } => {
            let store = commands::load_rules(cli.rules.as_ref())?;
            match action {
                RulesAction::List => commands::cmd_rules_list(store),
                RulesAction::Test { label, amount } => {
                    commands::cmd_rules_test(store, &label, amount)
                }
            }
        }
        Commands::Learn { label, category } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_learn(&db, &label, &category)
        }
        Commands::Corrections { limit } => {
            let db = commands::open_db(&cli.db)?;
            commands::cmd_corrections_list(&db, limit)
        }
    }
}
