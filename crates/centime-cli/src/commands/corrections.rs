//! Correction (learn/list) commands

use anyhow::Result;
use centime_core::{Database, CORRECTION_CONFIDENCE};

use super::truncate;

pub fn cmd_learn(db: &Database, label: &str, category: &str) -> Result<()> {
    let id = db.upsert_correction(label, category, CORRECTION_CONFIDENCE)?;
    println!(
        "✅ Correction {} stored: '{}' -> {}",
        id,
        centime_core::normalize_label(label),
        category
    );
    Ok(())
}

pub fn cmd_corrections_list(db: &Database, limit: i64) -> Result<()> {
    let corrections = db.list_corrections(limit)?;

    if corrections.is_empty() {
        println!("No corrections stored. Use 'centime learn' to add one.");
        return Ok(());
    }

    println!();
    println!("✏️  Corrections ({})", corrections.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for c in &corrections {
        println!(
            "   {:<4} {:<40} -> {:<20} ({:.2}, {})",
            c.id,
            truncate(&c.label_key, 40),
            c.category,
            c.confidence,
            c.updated_at.format("%Y-%m-%d")
        );
    }

    Ok(())
}
