//! First-match-wins rule evaluation with confidence scoring
//!
//! The matcher walks the catalogue in priority order and stops at the first
//! rule whose conditions and pattern both hold. A rule that faults during
//! evaluation (malformed regex) is logged and skipped; one bad rule never
//! aborts the scan.

use regex::Regex;
use tracing::{debug, warn};

use crate::models::{ClassificationSource, MatchType, Rule, RuleResult};
use crate::rules::RuleStore;

/// Confidence is always reported within these bounds
pub const CONFIDENCE_MIN: f64 = 0.50;
pub const CONFIDENCE_MAX: f64 = 0.99;

/// Outcome of evaluating one rule against one transaction
///
/// Faults are an explicit branch rather than a caught exception: the
/// matcher loop logs them and moves on to the next rule.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// The rule matched; carries the matched text used for scoring
    Matched(String),
    NotMatched,
    /// The rule could not be evaluated (e.g. malformed regex)
    Faulted(String),
}

/// Deterministic confidence score for a rule match
///
/// Base value comes from the rule priority, with fixed adjustments for
/// match strategy and matched-text length. The length thresholds (10, 4,
/// 20) are kept as-is for parity with previously stored confidences.
pub fn score_confidence(
    priority: i32,
    match_type: MatchType,
    matched_len: usize,
    label_len: usize,
) -> f64 {
    let mut confidence: f64 = match priority {
        1 => 0.95,
        2 => 0.85,
        3 => 0.75,
        _ => 0.60,
    };

    if match_type == MatchType::Exact {
        confidence += 0.05;
    }
    if matched_len > 10 {
        confidence += 0.02;
    }
    if matched_len < 4 && label_len > 20 {
        confidence -= 0.05;
    }

    confidence.clamp(CONFIDENCE_MIN, CONFIDENCE_MAX)
}

/// Evaluates transactions against a rule catalogue
#[derive(Debug, Clone)]
pub struct Matcher {
    store: RuleStore,
}

impl Matcher {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// Find the first matching rule for a transaction
    ///
    /// Returns `None` for blank labels and when no rule matches; the
    /// caller decides what fallback (if any) applies.
    pub fn find_match(&self, label: &str, amount: f64) -> Option<RuleResult> {
        if label.trim().is_empty() {
            return None;
        }

        let label_upper = label.to_uppercase();

        for rule in self.store.rules() {
            match evaluate_rule(rule, &label_upper, amount) {
                MatchOutcome::Matched(matched_text) => {
                    let confidence = score_confidence(
                        rule.priority,
                        rule.match_type,
                        matched_text.len(),
                        label.len(),
                    );
                    debug!(
                        "Rule {} matched '{}' -> {} (confidence {:.2})",
                        rule.id, label, rule.category, confidence
                    );
                    return Some(RuleResult {
                        category: rule.category.clone(),
                        confidence,
                        rule_id: Some(rule.id),
                        explanation: rule.explanation.clone(),
                        matched_pattern: matched_text,
                        source: ClassificationSource::Rule,
                    });
                }
                MatchOutcome::NotMatched => {}
                MatchOutcome::Faulted(reason) => {
                    warn!("Rule {} faulted, skipping: {}", rule.id, reason);
                }
            }
        }

        None
    }

    /// All rules that would match, in evaluation order (diagnostic helper)
    pub fn matching_rules(&self, label: &str, amount: f64) -> Vec<&Rule> {
        if label.trim().is_empty() {
            return Vec::new();
        }

        let label_upper = label.to_uppercase();
        self.store
            .rules()
            .iter()
            .filter(|rule| matches!(evaluate_rule(rule, &label_upper, amount), MatchOutcome::Matched(_)))
            .collect()
    }
}

/// Evaluate one rule: conditions first, then the primary pattern
///
/// `label_upper` must already be uppercased by the caller.
fn evaluate_rule(rule: &Rule, label_upper: &str, amount: f64) -> MatchOutcome {
    if let Some(ref conditions) = rule.conditions {
        if let Some(max) = conditions.amount_max {
            if amount.abs() > max {
                return MatchOutcome::NotMatched;
            }
        }
        if let Some(min) = conditions.amount_min {
            if amount.abs() < min {
                return MatchOutcome::NotMatched;
            }
        }
        if let Some(ref keywords) = conditions.keywords {
            if !keywords
                .iter()
                .any(|kw| label_upper.contains(&kw.to_uppercase()))
            {
                return MatchOutcome::NotMatched;
            }
        }
    }

    match rule.match_type {
        MatchType::Exact => {
            if label_upper == rule.pattern.to_uppercase() {
                MatchOutcome::Matched(rule.pattern.to_uppercase())
            } else {
                MatchOutcome::NotMatched
            }
        }
        MatchType::Contains => {
            let pattern_upper = rule.pattern.to_uppercase();
            if label_upper.contains(&pattern_upper) {
                MatchOutcome::Matched(pattern_upper)
            } else {
                MatchOutcome::NotMatched
            }
        }
        MatchType::Regex => match Regex::new(&rule.pattern) {
            Ok(re) => match re.find(label_upper) {
                Some(m) => MatchOutcome::Matched(m.as_str().to_string()),
                None => MatchOutcome::NotMatched,
            },
            Err(e) => MatchOutcome::Faulted(format!("invalid regex '{}': {}", rule.pattern, e)),
        },
        // Conditions already gated the amount; the first matching keyword
        // is the best "matched text" this variant can offer.
        MatchType::AmountRange => {
            let matched = rule
                .conditions
                .as_ref()
                .and_then(|c| c.keywords.as_ref())
                .and_then(|kws| {
                    kws.iter()
                        .map(|kw| kw.to_uppercase())
                        .find(|kw| label_upper.contains(kw))
                })
                .unwrap_or_else(|| rule.pattern.to_uppercase());
            MatchOutcome::Matched(matched)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleConditions;

    fn rule(id: i64, priority: i32, match_type: MatchType, pattern: &str, category: &str) -> Rule {
        Rule {
            id,
            priority,
            match_type,
            pattern: pattern.to_string(),
            category: category.to_string(),
            explanation: String::new(),
            conditions: None,
        }
    }

    fn matcher(rules: Vec<Rule>) -> Matcher {
        let mut store = RuleStore::new();
        for r in rules {
            store.add_rule(r);
        }
        Matcher::new(store)
    }

    #[test]
    fn test_blank_label_returns_none() {
        let m = matcher(vec![rule(1, 1, MatchType::Contains, "TOTAL", "Carburant")]);
        assert!(m.find_match("", -10.0).is_none());
        assert!(m.find_match("   \t ", -10.0).is_none());
    }

    #[test]
    fn test_contains_case_insensitive() {
        let m = matcher(vec![rule(1, 2, MatchType::Contains, "TOTAL", "Carburant")]);
        let result = m.find_match("CARTE TOTAL 4 CB", -40.0).unwrap();
        assert_eq!(result.category, "Carburant");
        assert_eq!(result.rule_id, Some(1));
        assert_eq!(result.matched_pattern, "TOTAL");

        let result = m.find_match("carte total 4 cb", -40.0).unwrap();
        assert_eq!(result.category, "Carburant");
    }

    #[test]
    fn test_exact_match() {
        let m = matcher(vec![rule(1, 1, MatchType::Exact, "Retrait Dab", "Retrait")]);
        assert!(m.find_match("RETRAIT DAB", -50.0).is_some());
        assert!(m.find_match("RETRAIT DAB PARIS", -50.0).is_none());
    }

    #[test]
    fn test_regex_captures_matched_substring() {
        let m = matcher(vec![rule(
            1,
            1,
            MatchType::Regex,
            r"TOTAL\s+\d|SHELL|ESSO|STATION",
            "Carburant",
        )]);
        let result = m.find_match("CARTE 30/07/25 TOTAL 4 CB*8533", -52.30).unwrap();
        assert_eq!(result.matched_pattern, "TOTAL 4");
        assert_eq!(result.category, "Carburant");
        // Base 0.95 for priority 1; matched length 7 earns neither the
        // long-match bonus nor the short-match penalty.
        assert_eq!(result.confidence, 0.95);
    }

    #[test]
    fn test_regex_searched_against_uppercased_label() {
        let m = matcher(vec![rule(1, 1, MatchType::Regex, r"SHELL", "Carburant")]);
        assert!(m.find_match("achat shell berre", -30.0).is_some());
    }

    #[test]
    fn test_amount_range_with_keywords() {
        let r = Rule {
            conditions: Some(RuleConditions {
                amount_min: None,
                amount_max: Some(10.0),
                keywords: Some(vec!["PARK".to_string()]),
            }),
            ..rule(1, 1, MatchType::AmountRange, "small parking charge", "Parking")
        };
        let m = matcher(vec![r]);

        // Within amount bound, keyword present
        assert!(m.find_match("PARKING FLOWBIRD", -5.0).is_some());
        // Amount exceeds max
        assert!(m.find_match("PARKING FLOWBIRD", -15.0).is_none());
        // Keyword absent
        assert!(m.find_match("RESTAURANT", -5.0).is_none());
    }

    #[test]
    fn test_amount_min_condition() {
        let r = Rule {
            conditions: Some(RuleConditions {
                amount_min: Some(500.0),
                amount_max: None,
                keywords: None,
            }),
            ..rule(1, 2, MatchType::Contains, "VIREMENT", "Salaire")
        };
        let m = matcher(vec![r]);

        assert!(m.find_match("VIREMENT EMPLOYEUR", 1800.0).is_some());
        assert!(m.find_match("VIREMENT EMPLOYEUR", 120.0).is_none());
    }

    #[test]
    fn test_first_match_wins_by_priority() {
        let m = matcher(vec![
            rule(1, 3, MatchType::Contains, "TOTAL", "Shopping"),
            rule(2, 1, MatchType::Contains, "TOTAL", "Carburant"),
        ]);
        let result = m.find_match("CARTE TOTAL 4 CB", -40.0).unwrap();
        assert_eq!(result.rule_id, Some(2));
        assert_eq!(result.category, "Carburant");
    }

    #[test]
    fn test_malformed_regex_skipped_scan_continues() {
        let m = matcher(vec![
            rule(1, 1, MatchType::Regex, r"TOTAL[", "Broken"),
            rule(2, 2, MatchType::Contains, "TOTAL", "Carburant"),
        ]);
        let result = m.find_match("CARTE TOTAL 4 CB", -40.0).unwrap();
        assert_eq!(result.rule_id, Some(2));
        assert_eq!(result.category, "Carburant");
    }

    #[test]
    fn test_no_match_returns_none() {
        let m = matcher(vec![rule(1, 1, MatchType::Contains, "TOTAL", "Carburant")]);
        assert!(m.find_match("BOULANGERIE DUPONT", -4.5).is_none());
    }

    #[test]
    fn test_matching_rules_lists_all() {
        let m = matcher(vec![
            rule(1, 1, MatchType::Contains, "TOTAL", "Carburant"),
            rule(2, 3, MatchType::Contains, "CARTE", "Divers"),
        ]);
        let matches = m.matching_rules("CARTE TOTAL 4 CB", -40.0);
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, 1);
    }

    #[test]
    fn test_confidence_base_table() {
        assert_eq!(score_confidence(1, MatchType::Contains, 6, 10), 0.95);
        assert_eq!(score_confidence(2, MatchType::Contains, 6, 10), 0.85);
        assert_eq!(score_confidence(3, MatchType::Contains, 6, 10), 0.75);
        assert_eq!(score_confidence(7, MatchType::Contains, 6, 10), 0.60);
        assert_eq!(score_confidence(0, MatchType::Contains, 6, 10), 0.60);
    }

    #[test]
    fn test_confidence_exact_bonus() {
        let base = score_confidence(2, MatchType::Contains, 6, 10);
        let exact = score_confidence(2, MatchType::Exact, 6, 10);
        assert!((exact - base - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_long_match_bonus() {
        let short = score_confidence(2, MatchType::Contains, 10, 30);
        let long = score_confidence(2, MatchType::Contains, 11, 30);
        assert!((long - short - 0.02).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_short_match_penalty() {
        // Penalty needs both a short match and a long label
        let penalized = score_confidence(2, MatchType::Contains, 3, 21);
        assert!((penalized - 0.80).abs() < 1e-9);
        // Short label: no penalty
        assert_eq!(score_confidence(2, MatchType::Contains, 3, 20), 0.85);
        // Match length 4 is not "< 4"
        assert_eq!(score_confidence(2, MatchType::Contains, 4, 30), 0.85);
    }

    #[test]
    fn test_confidence_clamped_to_upper_bound() {
        // 0.95 + 0.05 (exact) + 0.02 (long match) would be 1.02
        assert_eq!(score_confidence(1, MatchType::Exact, 15, 15), CONFIDENCE_MAX);
    }

    #[test]
    fn test_confidence_clamped_to_lower_bound() {
        // Default base 0.60 - 0.05 stays above the floor; force the floor
        // with the worst combination the formula allows.
        let low = score_confidence(99, MatchType::Contains, 2, 40);
        assert!(low >= CONFIDENCE_MIN);
        assert!((low - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_idempotent_classification() {
        let m = matcher(vec![rule(1, 1, MatchType::Contains, "TOTAL", "Carburant")]);
        let a = m.find_match("CARTE TOTAL 4 CB", -40.0).unwrap();
        let b = m.find_match("CARTE TOTAL 4 CB", -40.0).unwrap();
        assert_eq!(a.category, b.category);
        assert_eq!(a.confidence, b.confidence);
        assert_eq!(a.rule_id, b.rule_id);
        assert_eq!(a.matched_pattern, b.matched_pattern);
    }
}
