//! Centime Core Library
//!
//! Shared functionality for the Centime transaction classifier:
//! - Rule catalogue (ordered pattern rules, builtin or JSON-loaded)
//! - First-match-wins matcher with deterministic confidence scoring
//! - Classification service (corrections -> rules -> quick patterns ->
//!   advisory external lookup)
//! - Batch processing with coverage statistics
//! - SQLite-backed correction store

pub mod batch;
pub mod classify;
pub mod db;
pub mod error;
pub mod input;
pub mod lookup;
pub mod matcher;
pub mod models;
pub mod rules;

pub use classify::{Classifier, CORRECTION_CONFIDENCE};
pub use db::corrections::normalize_label;
pub use db::Database;
pub use error::{Error, Result};
pub use input::read_batch_file;
pub use lookup::{HttpLookup, LookupBackend, LookupClient, MerchantGuess, MockLookup};
pub use matcher::{score_confidence, MatchOutcome, Matcher, CONFIDENCE_MAX, CONFIDENCE_MIN};
pub use models::{
    ClassificationSource, Correction, CoverageStats, MatchType, Rule, RuleConditions, RuleResult,
    TransactionInput,
};
pub use rules::RuleStore;
