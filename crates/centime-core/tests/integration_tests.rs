//! End-to-end tests for the classification pipeline
//!
//! Exercises the builtin catalogue, the correction store, the lookup
//! fallback, and batch coverage together, the way the CLI drives them.

use centime_core::{
    Classifier, ClassificationSource, Database, LookupClient, Matcher, MockLookup, RuleStore,
    TransactionInput,
};

fn tx(label: &str, amount: f64) -> TransactionInput {
    TransactionInput::new(label, amount)
}

#[tokio::test]
async fn classify_statement_lines_with_builtin_catalogue() {
    let db = Database::in_memory().unwrap();
    let classifier = Classifier::new(&db, Matcher::new(RuleStore::builtin()), None);

    let cases = [
        ("CARTE 30/07/25 TOTAL 4 CB*8533", -52.30, "Carburant"),
        ("STATION SHELL AUTOROUTE A7", -61.00, "Carburant"),
        ("CARREFOUR MARKET AIX", -63.12, "Courses"),
        ("PRLV NETFLIX.COM", -13.49, "Abonnements"),
        ("PRLV SEPA EDF CLIENTS", -87.00, "Énergie"),
        ("PHARMACIE DU CENTRE", -12.40, "Santé"),
        ("PARKING FLOWBIRD AIX", -5.00, "Parking"),
        ("VIR SALAIRE AOUT", 2450.00, "Salaire"),
        ("RESTAURANT CHEZ MICHEL", -28.00, "Restaurant"),
    ];

    for (label, amount, expected) in cases {
        let result = classifier.classify(&tx(label, amount)).await.unwrap();
        let result = result.unwrap_or_else(|| panic!("no result for '{}'", label));
        assert_eq!(result.category, expected, "label '{}'", label);
        assert!(result.confidence >= 0.50 && result.confidence <= 0.99);
    }
}

#[tokio::test]
async fn spec_worked_example_confidence() {
    let db = Database::in_memory().unwrap();
    let classifier = Classifier::new(&db, Matcher::new(RuleStore::builtin()), None);

    let result = classifier
        .classify(&tx("CARTE 30/07/25 TOTAL 4 CB*8533", -52.30))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.category, "Carburant");
    assert_eq!(result.matched_pattern, "TOTAL 4");
    assert_eq!(result.confidence, 0.95);
    assert_eq!(result.source, ClassificationSource::Rule);
}

#[tokio::test]
async fn corrections_survive_reopen() {
    let db = Database::in_memory().unwrap();
    let path = db.path().to_string();

    {
        let classifier = Classifier::new(&db, Matcher::new(RuleStore::builtin()), None);
        classifier
            .learn_from_correction("PRLV ASSO SPORTIVE", "Loisirs")
            .unwrap();
    }

    // Reopen the same file: the correction must still apply.
    let reopened = Database::new(&path).unwrap();
    let classifier = Classifier::new(&reopened, Matcher::new(RuleStore::builtin()), None);

    let result = classifier
        .classify(&tx("PRLV ASSO SPORTIVE", -30.0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(result.category, "Loisirs");
    assert_eq!(result.source, ClassificationSource::Learned);
}

#[tokio::test]
async fn batch_coverage_over_mixed_statement() {
    let db = Database::in_memory().unwrap();
    let lookup = LookupClient::Mock(MockLookup::new());
    let classifier = Classifier::new(&db, Matcher::new(RuleStore::builtin()), Some(&lookup));

    let batch = vec![
        tx("CARTE TOTAL 4 CB", -40.0),
        tx("CARREFOUR MARKET", -63.12),
        tx("PRLV DOCTOLIB", -25.0),        // resolved by mock lookup
        tx("TOTALLY UNKNOWN SHOP", -9.99), // unresolved
        tx("", -1.0),                      // blank label
    ];

    let stats = classifier.coverage_stats(&batch).await.unwrap();
    assert_eq!(stats.total, 5);
    assert_eq!(stats.matched, 3);
    assert!((stats.coverage_pct - 60.0).abs() < 1e-9);
    assert_eq!(stats.unmatched_samples.len(), 2);

    // Only rule-sourced results appear in rule usage
    assert_eq!(stats.rule_usage.values().sum::<usize>(), 2);
}

#[tokio::test]
async fn failing_lookup_never_aborts_a_batch() {
    let db = Database::in_memory().unwrap();
    let lookup = LookupClient::Mock(MockLookup::failing());
    let classifier = Classifier::new(&db, Matcher::new(RuleStore::builtin()), Some(&lookup));

    let batch = vec![
        tx("NO SUCH MERCHANT A", -1.0),
        tx("CARTE TOTAL 4 CB", -40.0),
        tx("NO SUCH MERCHANT B", -2.0),
    ];

    let results = classifier.batch_categorize(&batch).await;
    assert_eq!(results.len(), 3);
    assert!(results[0].is_none());
    assert_eq!(results[1].as_ref().unwrap().category, "Carburant");
    assert!(results[2].is_none());
}
