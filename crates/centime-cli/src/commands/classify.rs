//! Single, batch, and coverage classification commands

use std::path::Path;

use anyhow::Result;
use centime_core::{
    read_batch_file, Classifier, Database, LookupClient, Matcher, RuleResult, RuleStore,
    TransactionInput,
};

use super::truncate;

pub async fn cmd_classify(
    db: &Database,
    store: RuleStore,
    label: &str,
    amount: f64,
    account: Option<String>,
    json: bool,
) -> Result<()> {
    let lookup = LookupClient::from_env();
    let classifier = Classifier::new(db, Matcher::new(store), lookup.as_ref());

    let tx = TransactionInput {
        label: label.to_string(),
        amount,
        account_label: account,
    };
    let result = classifier.classify(&tx).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result {
        Some(r) => print_result(label, &r),
        None => println!("No match for '{}'", label),
    }

    Ok(())
}

pub async fn cmd_batch(db: &Database, store: RuleStore, file: &Path, json: bool) -> Result<()> {
    let transactions = read_batch_file(file)?;

    let lookup = LookupClient::from_env();
    let classifier = Classifier::new(db, Matcher::new(store), lookup.as_ref());

    let results = classifier.batch_categorize(&transactions).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    println!();
    println!("📋 Batch results ({} transactions)", transactions.len());
    println!("   ─────────────────────────────────────────────────────────────");
    for (tx, result) in transactions.iter().zip(&results) {
        match result {
            Some(r) => println!(
                "   {:<40} {:>10.2}  {} ({:.2}, {})",
                truncate(&tx.label, 40),
                tx.amount,
                r.category,
                r.confidence,
                r.source.as_str()
            ),
            None => println!(
                "   {:<40} {:>10.2}  (no match)",
                truncate(&tx.label, 40),
                tx.amount
            ),
        }
    }

    let matched = results.iter().filter(|r| r.is_some()).count();
    println!();
    println!("   {} / {} classified", matched, transactions.len());

    Ok(())
}

pub async fn cmd_coverage(db: &Database, store: RuleStore, file: &Path, json: bool) -> Result<()> {
    let transactions = read_batch_file(file)?;

    let lookup = LookupClient::from_env();
    let classifier = Classifier::new(db, Matcher::new(store), lookup.as_ref());

    let stats = classifier.coverage_stats(&transactions).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    println!("📊 Coverage");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Transactions:     {}", stats.total);
    println!(
        "   Matched:          {} ({:.1}%)",
        stats.matched, stats.coverage_pct
    );
    println!(
        "   High confidence:  {} ({:.1}%)",
        stats.high_confidence, stats.high_confidence_pct
    );

    if !stats.rule_usage.is_empty() {
        println!();
        println!("   Rule usage:");
        for (rule_id, count) in &stats.rule_usage {
            let category = classifier
                .matcher()
                .store()
                .get(*rule_id)
                .map(|r| r.category.as_str())
                .unwrap_or("?");
            println!("     rule {:<4} {:<20} {}", rule_id, category, count);
        }
    }

    if !stats.unmatched_samples.is_empty() {
        println!();
        println!("   Unmatched samples:");
        for label in &stats.unmatched_samples {
            println!("     • {}", truncate(label, 60));
        }
    }

    Ok(())
}

fn print_result(label: &str, result: &RuleResult) {
    println!();
    println!("🏷️  {}", label);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Category:    {}", result.category);
    println!("   Confidence:  {:.2}", result.confidence);
    println!("   Source:      {}", result.source.as_str());
    if let Some(rule_id) = result.rule_id {
        println!("   Rule:        {}", rule_id);
    }
    println!("   Matched:     {}", result.matched_pattern);
    if !result.explanation.is_empty() {
        println!("   Why:         {}", result.explanation);
    }
}
