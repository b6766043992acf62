//! Rule catalogue for transaction classification
//!
//! The store holds an ordered list of pattern rules, sorted by ascending
//! priority (lower value wins). Rules are data loaded once at startup -
//! from the builtin catalogue or a JSON file - and never edited at runtime.

use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};
use crate::models::{MatchType, Rule, RuleConditions};

/// Ordered, read-only catalogue of classification rules
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    rules: Vec<Rule>,
}

impl RuleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Append a rule and re-sort by ascending priority
    ///
    /// The sort is stable: rules sharing a priority keep insertion order.
    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
        self.rules.sort_by_key(|r| r.priority);
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up a rule by id
    pub fn get(&self, id: i64) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Load a catalogue from a JSON file (array of rules)
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let rules: Vec<Rule> = serde_json::from_str(&data)?;

        if rules.is_empty() {
            return Err(Error::Catalogue(format!(
                "No rules in catalogue file {}",
                path.display()
            )));
        }

        let mut store = Self::new();
        for rule in rules {
            store.add_rule(rule);
        }

        info!("Loaded {} rules from {}", store.len(), path.display());
        Ok(store)
    }

    /// Builtin catalogue for French bank statements
    ///
    /// Priority 1 rules are unambiguous merchant signatures, priority 2
    /// covers common chains, priority 3 is generic keyword matching.
    pub fn builtin() -> Self {
        let mut store = Self::new();
        let mut id = 0i64;

        let mut add = |store: &mut Self,
                       priority: i32,
                       match_type: MatchType,
                       pattern: &str,
                       category: &str,
                       explanation: &str,
                       conditions: Option<RuleConditions>| {
            id += 1;
            store.add_rule(Rule {
                id,
                priority,
                match_type,
                pattern: pattern.to_string(),
                category: category.to_string(),
                explanation: explanation.to_string(),
                conditions,
            });
        };

        // Fuel stations. "TOTAL" alone would collide with TotalEnergies
        // utility bills, so the regex requires a station-style suffix.
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"TOTAL\s+\d|SHELL|ESSO|STATION",
            "Carburant",
            "Fuel station card payment",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Contains,
            "AUTOROUTE",
            "Péage",
            "Motorway toll",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"VINCI|APRR|SANEF|COFIROUTE",
            "Péage",
            "Motorway operator",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::AmountRange,
            "small parking charge",
            "Parking",
            "Parking meter or short-stay car park",
            Some(RuleConditions {
                amount_min: None,
                amount_max: Some(10.0),
                keywords: Some(vec!["PARK".to_string()]),
            }),
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"CARREFOUR|E\.?LECLERC|AUCHAN|INTERMARCHE|LIDL|ALDI|MONOPRIX",
            "Courses",
            "Supermarket chain",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"NETFLIX|SPOTIFY|DISNEY\+|AMAZON PRIME|DEEZER|CANAL\+",
            "Abonnements",
            "Streaming subscription",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"EDF|ENGIE|TOTALENERGIES|TOTAL ENERGIES",
            "Énergie",
            "Electricity or gas provider",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"ORANGE|SFR|BOUYGUES TEL|FREE MOBILE|FREE TELECOM",
            "Téléphonie",
            "Phone or internet provider",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"MAIF|MACIF|MATMUT|GMF|AXA|ALLIANZ",
            "Assurance",
            "Insurance premium",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Contains,
            "PHARMACIE",
            "Santé",
            "Pharmacy",
            None,
        );
        add(
            &mut store,
            1,
            MatchType::Regex,
            r"SNCF|RATP|NAVIGO|BLABLACAR",
            "Transport",
            "Public transport or carpooling",
            None,
        );

        add(
            &mut store,
            2,
            MatchType::Contains,
            "VIR SALAIRE",
            "Salaire",
            "Salary wire transfer",
            None,
        );
        add(
            &mut store,
            2,
            MatchType::Regex,
            r"LOYER|FONCIA|NEXITY",
            "Loyer",
            "Rent payment",
            None,
        );
        add(
            &mut store,
            2,
            MatchType::Regex,
            r"MCDONALD|BURGER KING|KFC|DELIVEROO|UBER\s*EATS",
            "Restaurant",
            "Fast food or meal delivery",
            None,
        );
        add(
            &mut store,
            2,
            MatchType::Regex,
            r"COTISATION|FRAIS BANCAIRES|AGIOS",
            "Frais bancaires",
            "Bank fees",
            None,
        );
        add(
            &mut store,
            2,
            MatchType::Contains,
            "BOULANGERIE",
            "Courses",
            "Bakery",
            None,
        );

        add(
            &mut store,
            3,
            MatchType::Contains,
            "RESTAURANT",
            "Restaurant",
            "Generic restaurant keyword",
            None,
        );
        add(
            &mut store,
            3,
            MatchType::Contains,
            "PARKING",
            "Parking",
            "Generic parking keyword, any amount",
            None,
        );
        add(
            &mut store,
            3,
            MatchType::Contains,
            "AMAZON",
            "Shopping",
            "Online shopping",
            None,
        );
        add(
            &mut store,
            3,
            MatchType::Exact,
            "RETRAIT DAB",
            "Retrait",
            "ATM cash withdrawal",
            None,
        );

        store
    }
}
