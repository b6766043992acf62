//! Classification service
//!
//! Single entry point for classifying a transaction. Precedence:
//! learned corrections (user always wins) -> catalogue rules -> quick
//! patterns (hardcoded merchant table) -> external lookup (advisory) ->
//! no result.
//!
//! Lookup results are cached per-session to avoid repeated calls for the
//! same label within one batch.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::db::corrections::normalize_label;
use crate::db::Database;
use crate::error::Result;
use crate::lookup::{map_lookup_category, LookupClient, LOOKUP_TIMEOUT};
use crate::matcher::{Matcher, CONFIDENCE_MAX, CONFIDENCE_MIN};
use crate::models::{ClassificationSource, RuleResult, TransactionInput};

/// Confidence stored for a fresh user correction
pub const CORRECTION_CONFIDENCE: f64 = 0.95;
/// Confidence assigned to quick-pattern hits
const QUICK_PATTERN_CONFIDENCE: f64 = 0.70;
/// Confidence assigned to external lookup guesses
const LOOKUP_CONFIDENCE: f64 = 0.60;

/// Known merchants that the rule catalogue does not cover
///
/// Checked only after the catalogue came up empty, so a rule for the same
/// merchant always takes precedence.
const QUICK_PATTERNS: &[(&str, &str)] = &[
    ("FNAC", "Shopping"),
    ("DECATHLON", "Shopping"),
    ("IKEA", "Shopping"),
    ("ZARA", "Shopping"),
    ("KIABI", "Shopping"),
    ("SEPHORA", "Shopping"),
    ("CDISCOUNT", "Shopping"),
    ("VINTED", "Shopping"),
    ("GAUMONT", "Loisirs"),
    ("PATHE", "Loisirs"),
    ("UGC", "Loisirs"),
    ("LA POSTE", "Services"),
];

/// Classification service tying the matcher, correction store and
/// lookup fallback together
pub struct Classifier<'a> {
    db: &'a Database,
    matcher: Matcher,
    lookup: Option<&'a LookupClient>,
    /// Per-session cache for lookup results (normalized label -> result)
    lookup_cache: Mutex<HashMap<String, Option<RuleResult>>>,
}

impl<'a> Classifier<'a> {
    /// Create a new classifier with an optional lookup client
    pub fn new(db: &'a Database, matcher: Matcher, lookup: Option<&'a LookupClient>) -> Self {
        Self {
            db,
            matcher,
            lookup,
            lookup_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    /// Classify a transaction
    ///
    /// Returns `None` for blank labels and when every stage comes up
    /// empty. Never errors for expected conditions - lookup failures are
    /// logged and swallowed.
    pub async fn classify(&self, tx: &TransactionInput) -> Result<Option<RuleResult>> {
        let label = &tx.label;
        if label.trim().is_empty() {
            return Ok(None);
        }

        // 0. Highest priority: user corrections for this label.
        if let Some(correction) = self.db.get_correction(label)? {
            debug!(
                "Correction matched for '{}': {} (confidence {:.2})",
                label, correction.category, correction.confidence
            );
            return Ok(Some(RuleResult {
                category: correction.category,
                confidence: correction.confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX),
                rule_id: None,
                explanation: "User-confirmed category".to_string(),
                matched_pattern: correction.label_key,
                source: ClassificationSource::Learned,
            }));
        }

        // 1. Catalogue rules.
        if let Some(result) = self.matcher.find_match(label, tx.amount) {
            return Ok(Some(result));
        }

        // 2. Quick patterns for merchants the catalogue does not cover.
        if let Some(result) = apply_quick_patterns(label) {
            debug!("Quick pattern matched '{}': {}", label, result.category);
            return Ok(Some(result));
        }

        // 3. Advisory external lookup.
        if let Some(result) = self.lookup_fallback(label).await {
            debug!(
                "Lookup classified '{}': {} (confidence {:.2})",
                label, result.category, result.confidence
            );
            return Ok(Some(result));
        }

        Ok(None)
    }

    /// Record a user correction for a label
    ///
    /// Overwrites any previous correction for the same normalized label
    /// and takes precedence over pattern rules on subsequent calls.
    pub fn learn_from_correction(&self, label: &str, category: &str) -> Result<i64> {
        let id = self
            .db
            .upsert_correction(label, category, CORRECTION_CONFIDENCE)?;
        debug!("Learned correction: '{}' -> {}", label, category);
        Ok(id)
    }

    /// Consult the external lookup, bounded by a timeout, caching per session
    ///
    /// Every failure path returns `None`; this stage must never hold up or
    /// abort the caller.
    async fn lookup_fallback(&self, label: &str) -> Option<RuleResult> {
        let client = self.lookup?;
        let key = normalize_label(label);

        {
            let cache = self.lookup_cache.lock().unwrap();
            if let Some(cached) = cache.get(&key) {
                debug!("Lookup cache hit for '{}'", label);
                return cached.clone();
            }
        }

        let outcome = tokio::time::timeout(LOOKUP_TIMEOUT, client.lookup_merchant(label)).await;

        let result = match outcome {
            Ok(Ok(guess)) => map_lookup_category(&guess.category).map(|category| RuleResult {
                category: category.to_string(),
                confidence: LOOKUP_CONFIDENCE,
                rule_id: None,
                explanation: match guess.merchant {
                    Some(ref m) => format!("External lookup identified merchant {}", m),
                    None => "External lookup category guess".to_string(),
                },
                matched_pattern: guess.category.clone(),
                source: ClassificationSource::Lookup,
            }),
            Ok(Err(e)) => {
                warn!("Lookup failed for '{}': {}", label, e);
                None
            }
            Err(_) => {
                warn!("Lookup timed out for '{}'", label);
                None
            }
        };

        // Cache failures too: one slow merchant should not stall a batch.
        self.lookup_cache
            .lock()
            .unwrap()
            .insert(key, result.clone());

        result
    }
}

/// Check the hardcoded merchant table
fn apply_quick_patterns(label: &str) -> Option<RuleResult> {
    let upper = label.to_uppercase();
    QUICK_PATTERNS
        .iter()
        .find(|(keyword, _)| upper.contains(keyword))
        .map(|(keyword, category)| RuleResult {
            category: category.to_string(),
            confidence: QUICK_PATTERN_CONFIDENCE,
            rule_id: None,
            explanation: format!("Known merchant keyword {}", keyword),
            matched_pattern: keyword.to_string(),
            source: ClassificationSource::QuickPattern,
        })
}
