//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `classify` - Single, batch, and coverage classification commands
//! - `rules` - Rule catalogue inspection commands
//! - `corrections` - Correction (learn/list) commands

pub mod classify;
pub mod corrections;
pub mod rules;

// Re-export command functions for main.rs
pub use classify::*;
pub use corrections::*;
pub use rules::*;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use centime_core::{Database, RuleStore};

/// Open (and migrate) the corrections database
pub fn open_db(path: &Path) -> Result<Database> {
    let path_str = path.to_string_lossy();
    Database::new(&path_str).with_context(|| format!("Failed to open database {}", path_str))
}

/// Load the rule catalogue: a JSON file when given, builtin otherwise
pub fn load_rules(rules_file: Option<&PathBuf>) -> Result<RuleStore> {
    match rules_file {
        Some(path) => RuleStore::from_json_file(path)
            .with_context(|| format!("Failed to load rule catalogue {}", path.display())),
        None => Ok(RuleStore::builtin()),
    }
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    let db = open_db(db_path)?;
    info!("Database ready at {}", db.path());
    println!("✅ Database initialized: {}", db.path());
    Ok(())
}

/// Truncate a string to a maximum number of characters, adding "..." if
/// truncated
///
/// Counts characters, not bytes: statement labels carry accented letters
/// (É, é, à) and slicing at a byte index could land inside one.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
