//! Rule catalogue inspection commands

use anyhow::Result;
use centime_core::{Matcher, RuleStore};

use super::truncate;

pub fn cmd_rules_list(store: RuleStore) -> Result<()> {
    println!();
    println!("📜 Rule catalogue ({} rules, evaluation order)", store.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for rule in store.rules() {
        println!(
            "   [p{}] {:<4} {:<12} {:<30} -> {}",
            rule.priority,
            rule.id,
            rule.match_type.as_str(),
            truncate(&rule.pattern, 30),
            rule.category
        );
    }
    Ok(())
}

pub fn cmd_rules_test(store: RuleStore, label: &str, amount: f64) -> Result<()> {
    let matcher = Matcher::new(store);
    let matches = matcher.matching_rules(label, amount);

    if matches.is_empty() {
        println!("No rules match '{}' (amount {:.2})", label, amount);
        return Ok(());
    }

    println!();
    println!("🔎 {} rule(s) match '{}'", matches.len(), label);
    println!("   ─────────────────────────────────────────────────────────────");
    for (i, rule) in matches.iter().enumerate() {
        let winner = if i == 0 { "  <- first match wins" } else { "" };
        println!(
            "   [p{}] {:<4} {:<12} {:<30} -> {}{}",
            rule.priority,
            rule.id,
            rule.match_type.as_str(),
            truncate(&rule.pattern, 30),
            rule.category,
            winner
        );
    }

    Ok(())
}
