//! Domain models for Centime

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pattern matching strategy for classification rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    /// Exact string match (case-insensitive)
    Exact,
    /// Case-insensitive substring match
    Contains,
    /// Regular expression searched against the uppercased label
    Regex,
    /// Matches on amount/keyword conditions alone, no label pattern
    AmountRange,
}

impl MatchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::Regex => "regex",
            Self::AmountRange => "amount_range",
        }
    }
}

impl std::str::FromStr for MatchType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "contains" => Ok(Self::Contains),
            "regex" => Ok(Self::Regex),
            "amount_range" => Ok(Self::AmountRange),
            _ => Err(format!("Unknown match type: {}", s)),
        }
    }
}

/// Extra conditions gating a rule before its pattern is evaluated
///
/// Amount bounds compare against the absolute value of the transaction
/// amount, so debit sign conventions don't matter. Keywords require at
/// least one case-insensitive substring hit in the label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

/// A static pattern-to-category classification rule
///
/// Rules are immutable at runtime. Lower priority values are evaluated
/// first; within a priority, insertion order is evaluation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    /// Lower value = higher precedence
    pub priority: i32,
    pub match_type: MatchType,
    pub pattern: String,
    pub category: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<RuleConditions>,
}

/// A transaction as seen by the classification engine
///
/// Owned by the storage layer; the engine only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionInput {
    pub label: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub account_label: Option<String>,
}

impl TransactionInput {
    pub fn new(label: impl Into<String>, amount: f64) -> Self {
        Self {
            label: label.into(),
            amount,
            account_label: None,
        }
    }
}

/// Where a classification result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    /// Learned from a user correction for this label
    Learned,
    /// Matched by a catalogue rule
    Rule,
    /// Matched by the hardcoded quick-pattern table
    QuickPattern,
    /// Guessed by the external merchant lookup
    Lookup,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Learned => "learned",
            Self::Rule => "rule",
            Self::QuickPattern => "quick_pattern",
            Self::Lookup => "lookup",
        }
    }
}

impl std::str::FromStr for ClassificationSource {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "learned" => Ok(Self::Learned),
            "rule" => Ok(Self::Rule),
            "quick_pattern" => Ok(Self::QuickPattern),
            "lookup" => Ok(Self::Lookup),
            _ => Err(format!("Unknown classification source: {}", s)),
        }
    }
}

/// Result of a single classification call
///
/// Ephemeral - produced per call, only persisted if the caller chooses to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleResult {
    pub category: String,
    /// Always within [0.50, 0.99]
    pub confidence: f64,
    /// Set only when the result came from a catalogue rule
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<i64>,
    pub explanation: String,
    pub matched_pattern: String,
    pub source: ClassificationSource,
}

/// A user-confirmed category override for a normalized label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correction {
    pub id: i64,
    /// Trimmed, uppercased, whitespace-collapsed label
    pub label_key: String,
    pub category: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Aggregated match statistics over a batch of transactions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageStats {
    pub total: usize,
    pub matched: usize,
    pub coverage_pct: f64,
    /// Results with confidence strictly above 0.85
    pub high_confidence: usize,
    pub high_confidence_pct: f64,
    /// Usage count per catalogue rule id
    pub rule_usage: std::collections::BTreeMap<i64, usize>,
    /// At most 10 labels, taken from the first unmatched transactions
    pub unmatched_samples: Vec<String>,
}
