//! Batch classification and coverage statistics
//!
//! A thin loop over the classification service: one result per input, in
//! input order, with per-item failure isolation. No parallelism - batch
//! sizes are expected to stay in the tens to low hundreds.

use std::collections::BTreeMap;

use tracing::warn;

use crate::classify::Classifier;
use crate::error::Result;
use crate::models::{CoverageStats, RuleResult, TransactionInput};

/// Results above this confidence count as high-confidence
const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.85;
/// Cap on unmatched label samples in coverage stats
const UNMATCHED_SAMPLE_LIMIT: usize = 10;

impl Classifier<'_> {
    /// Classify a batch of transactions
    ///
    /// Returns one entry per input, in the same order. A failure on one
    /// item is logged and recorded as `None`; the batch continues.
    pub async fn batch_categorize(
        &self,
        transactions: &[TransactionInput],
    ) -> Vec<Option<RuleResult>> {
        let mut results = Vec::with_capacity(transactions.len());

        for tx in transactions {
            match self.classify(tx).await {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Classification failed for '{}': {}", tx.label, e);
                    results.push(None);
                }
            }
        }

        results
    }

    /// Single-pass coverage statistics over a batch
    pub async fn coverage_stats(&self, transactions: &[TransactionInput]) -> Result<CoverageStats> {
        let results = self.batch_categorize(transactions).await;

        let total = transactions.len();
        let mut matched = 0usize;
        let mut high_confidence = 0usize;
        let mut rule_usage: BTreeMap<i64, usize> = BTreeMap::new();
        let mut unmatched_samples = Vec::new();

        for (tx, result) in transactions.iter().zip(&results) {
            match result {
                Some(r) => {
                    matched += 1;
                    if r.confidence > HIGH_CONFIDENCE_THRESHOLD {
                        high_confidence += 1;
                    }
                    if let Some(rule_id) = r.rule_id {
                        *rule_usage.entry(rule_id).or_insert(0) += 1;
                    }
                }
                None => {
                    if unmatched_samples.len() < UNMATCHED_SAMPLE_LIMIT {
                        unmatched_samples.push(tx.label.clone());
                    }
                }
            }
        }

        let pct = |n: usize| {
            if total == 0 {
                0.0
            } else {
                n as f64 / total as f64 * 100.0
            }
        };

        Ok(CoverageStats {
            total,
            matched,
            coverage_pct: pct(matched),
            high_confidence,
            high_confidence_pct: pct(high_confidence),
            rule_usage,
            unmatched_samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::matcher::Matcher;
    use crate::rules::RuleStore;

    fn classifier(db: &Database) -> Classifier<'_> {
        Classifier::new(db, Matcher::new(RuleStore::builtin()), None)
    }

    fn tx(label: &str, amount: f64) -> TransactionInput {
        TransactionInput::new(label, amount)
    }

    #[tokio::test]
    async fn test_batch_preserves_order_and_length() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        let batch = vec![
            tx("CARTE TOTAL 4 CB", -40.0),
            tx("UNKNOWN MERCHANT", -5.0),
            tx("CARREFOUR MARKET", -63.12),
        ];
        let results = c.batch_categorize(&batch).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().category, "Carburant");
        assert!(results[1].is_none());
        assert_eq!(results[2].as_ref().unwrap().category, "Courses");
    }

    #[tokio::test]
    async fn test_blank_labels_count_as_unmatched() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        let batch = vec![tx("", -1.0), tx("   ", -2.0)];
        let results = c.batch_categorize(&batch).await;
        assert!(results.iter().all(|r| r.is_none()));
    }

    #[tokio::test]
    async fn test_coverage_percentages() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        // 3 matched out of 4 -> 75%
        let batch = vec![
            tx("CARTE TOTAL 4 CB", -40.0),
            tx("CARREFOUR MARKET", -63.12),
            tx("PHARMACIE DU CENTRE", -12.0),
            tx("ZZZZZ NOWHERE", -9.0),
        ];
        let stats = c.coverage_stats(&batch).await.unwrap();

        assert_eq!(stats.total, 4);
        assert_eq!(stats.matched, 3);
        assert!((stats.coverage_pct - 75.0).abs() < 1e-9);
        assert_eq!(stats.unmatched_samples, vec!["ZZZZZ NOWHERE".to_string()]);
    }

    #[tokio::test]
    async fn test_high_confidence_threshold_is_strict() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        // Priority-1 rule -> 0.95 (high), priority-3 contains -> 0.75 (not)
        let batch = vec![
            tx("CARTE TOTAL 4 CB", -40.0),
            tx("RESTAURANT CHEZ MICHEL", -28.0),
        ];
        let stats = c.coverage_stats(&batch).await.unwrap();

        assert_eq!(stats.matched, 2);
        assert_eq!(stats.high_confidence, 1);
        assert!((stats.high_confidence_pct - 50.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_rule_usage_counts() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        let batch = vec![
            tx("CARTE TOTAL 4 CB", -40.0),
            tx("STATION SHELL A7", -55.0),
            tx("CARREFOUR MARKET", -63.12),
        ];
        let stats = c.coverage_stats(&batch).await.unwrap();

        // Both fuel labels hit the same rule
        let fuel_rule_id = c
            .matcher()
            .find_match("CARTE TOTAL 4 CB", -40.0)
            .unwrap()
            .rule_id
            .unwrap();
        assert_eq!(stats.rule_usage.get(&fuel_rule_id), Some(&2));
        assert_eq!(stats.rule_usage.values().sum::<usize>(), 3);
    }

    #[tokio::test]
    async fn test_unmatched_samples_capped_at_ten() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        let batch: Vec<TransactionInput> = (0..15)
            .map(|i| tx(&format!("UNKNOWN {}", i), -1.0))
            .collect();
        let stats = c.coverage_stats(&batch).await.unwrap();

        assert_eq!(stats.matched, 0);
        assert_eq!(stats.unmatched_samples.len(), 10);
        // Samples come from the first unmatched items, in order
        assert_eq!(stats.unmatched_samples[0], "UNKNOWN 0");
        assert_eq!(stats.unmatched_samples[9], "UNKNOWN 9");
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let db = Database::in_memory().unwrap();
        let c = classifier(&db);

        let stats = c.coverage_stats(&[]).await.unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.coverage_pct, 0.0);
        assert!(stats.unmatched_samples.is_empty());
    }
}
