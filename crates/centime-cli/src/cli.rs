//! CLI argument definitions using clap
//!
//! This module contains the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Centime - Classify bank transactions with pattern rules
#[derive(Parser)]
#[command(name = "centime")]
#[command(about = "Rule-based bank transaction classifier", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (stores learned corrections)
    #[arg(long, default_value = "centime.db", global = true)]
    pub db: PathBuf,

    /// Rule catalogue JSON file (builtin catalogue if not set)
    #[arg(long, global = true)]
    pub rules: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Classify a single transaction
    Classify {
        /// Transaction label as printed on the statement
        #[arg(short, long)]
        label: String,

        /// Signed amount (negative = debit)
        #[arg(short, long, allow_hyphen_values = true)]
        amount: f64,

        /// Account label (informational)
        #[arg(long)]
        account: Option<String>,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Classify a CSV batch of transactions
    Batch {
        /// CSV file with label,amount[,account_label] columns
        #[arg(short, long)]
        file: PathBuf,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Coverage statistics for a CSV batch
    Coverage {
        /// CSV file with label,amount[,account_label] columns
        #[arg(short, long)]
        file: PathBuf,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Rule catalogue inspection
    Rules {
        #[command(subcommand)]
        action: RulesAction,
    },

    /// Record a category correction for a label
    Learn {
        /// Transaction label to correct
        #[arg(short, long)]
        label: String,

        /// The correct category
        #[arg(short, long)]
        category: String,
    },

    /// List stored corrections
    Corrections {
        /// Maximum number of corrections to show
        #[arg(long, default_value = "50")]
        limit: i64,
    },
}

#[derive(Subcommand)]
pub enum RulesAction {
    /// List the rule catalogue in evaluation order
    List,

    /// Show every rule that matches a label
    Test {
        /// Transaction label to test
        #[arg(short, long)]
        label: String,

        /// Signed amount (negative = debit)
        #[arg(short, long, default_value = "0", allow_hyphen_values = true)]
        amount: f64,
    },
}
