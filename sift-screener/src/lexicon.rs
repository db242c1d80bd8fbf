//! Field lexicon and phrase resolution.
//!
//! Maps natural-language phrases ("P/E ratio", "dividend yield", "market
//! cap") to canonical dataset field identifiers, together with their value
//! type and unit scaling. The lexicon is built once at startup and read
//! concurrently afterwards.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Value Types
// ============================================================================

/// Value type of a screenable field.
///
/// Determines which unit suffixes a value may carry and how a bare number
/// is scaled before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    /// Plain count (e.g., trading volume)
    Number,
    /// Percentage stored as a fraction (e.g., dividend yield 3% = 0.03)
    Percent,
    /// Monetary amount (e.g., market cap, revenue)
    Currency,
    /// Unitless ratio (e.g., P/E, P/B)
    Ratio,
}

// ============================================================================
// Field Definition
// ============================================================================

/// Definition of a single screenable dataset field.
///
/// `key` is the canonical column name in the dataset; `display` is the
/// human-readable name used when restating criteria back to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Canonical dataset column name (e.g., "dividend_yield")
    pub key: String,
    /// Display name for criteria restatement (e.g., "dividend yield")
    pub display: String,
    /// Natural-language aliases, matched case-insensitively
    pub aliases: Vec<String>,
    /// Value type, controls unit scaling
    pub value_type: ValueType,
    /// Unit suffix → multiplier map. The empty suffix is the multiplier
    /// applied to a bare number.
    pub scale_factors: Vec<(String, f64)>,
}

impl FieldDefinition {
    /// Create a field definition with the default scale factors for its
    /// value type.
    pub fn new(
        key: impl Into<String>,
        display: impl Into<String>,
        value_type: ValueType,
        aliases: &[&str],
    ) -> Self {
        Self {
            key: key.into(),
            display: display.into(),
            aliases: aliases.iter().map(|a| a.to_lowercase()).collect(),
            value_type,
            scale_factors: default_scale_factors(value_type),
        }
    }

    /// Look up the multiplier for a unit suffix.
    ///
    /// Returns `None` when the field does not accept the suffix (e.g., "%"
    /// on a currency field).
    pub fn multiplier_for(&self, suffix: &str) -> Option<f64> {
        let suffix = suffix.to_lowercase();
        self.scale_factors
            .iter()
            .find(|(s, _)| *s == suffix)
            .map(|(_, m)| *m)
    }
}

/// Magnitude suffixes accepted by count and currency fields.
const MAGNITUDES: &[(&str, f64)] = &[
    ("thousand", 1e3),
    ("k", 1e3),
    ("million", 1e6),
    ("m", 1e6),
    ("billion", 1e9),
    ("bn", 1e9),
    ("b", 1e9),
    ("trillion", 1e12),
    ("t", 1e12),
];

fn default_scale_factors(value_type: ValueType) -> Vec<(String, f64)> {
    match value_type {
        // A bare number on a percent field means percent: "5" → 0.05.
        ValueType::Percent => vec![("".to_string(), 0.01), ("%".to_string(), 0.01)],
        ValueType::Ratio => vec![("".to_string(), 1.0)],
        ValueType::Number | ValueType::Currency => {
            let mut factors = vec![("".to_string(), 1.0)];
            factors.extend(MAGNITUDES.iter().map(|(s, m)| (s.to_string(), *m)));
            factors
        }
    }
}

// ============================================================================
// Lexicon
// ============================================================================

/// Error raised when a lexicon violates its invariants.
#[derive(Debug, Error)]
pub enum LexiconError {
    /// Two fields claim the same alias
    #[error("Alias '{alias}' is claimed by both '{first}' and '{second}'")]
    DuplicateAlias {
        alias: String,
        first: String,
        second: String,
    },
}

/// The field lexicon: an immutable table of field definitions with a
/// precomputed alias index for longest-alias-first resolution.
#[derive(Debug, Clone)]
pub struct Lexicon {
    fields: Vec<FieldDefinition>,
    /// (alias, field index), sorted by alias length descending so longer
    /// aliases win ("price to earnings" before "earnings").
    alias_index: Vec<(String, usize)>,
}

impl Lexicon {
    /// Build a lexicon from field definitions.
    ///
    /// Fails when two fields share an alias (case-insensitive).
    pub fn new(fields: Vec<FieldDefinition>) -> Result<Self, LexiconError> {
        let mut alias_index: Vec<(String, usize)> = Vec::new();

        for (idx, field) in fields.iter().enumerate() {
            for alias in &field.aliases {
                let alias = alias.to_lowercase();
                if let Some((_, prev)) = alias_index.iter().find(|(a, _)| *a == alias) {
                    return Err(LexiconError::DuplicateAlias {
                        alias,
                        first: fields[*prev].key.clone(),
                        second: field.key.clone(),
                    });
                }
                alias_index.push((alias, idx));
            }
        }

        // Longest alias first; ties resolved by definition order.
        alias_index.sort_by(|(a, ai), (b, bi)| b.len().cmp(&a.len()).then(ai.cmp(bi)));

        Ok(Self {
            fields,
            alias_index,
        })
    }

    /// Build the default lexicon covering the dashboard's screening metrics.
    pub fn with_defaults() -> Self {
        Self::new(default_fields()).expect("default lexicon aliases are unique")
    }

    /// All field definitions, in definition order.
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Resolve a natural-language phrase to a field definition.
    ///
    /// Matching is case-insensitive and longest-alias-first: the phrase is
    /// normalized and scanned for each known alias as a whole term, so
    /// surrounding filler ("find stocks with p/e ratio") does not defeat
    /// resolution. Plural forms of an alias are accepted. Returns `None`
    /// when no alias matches; there is no fuzzy fallback.
    pub fn resolve(&self, phrase: &str) -> Option<&FieldDefinition> {
        let normalized = normalize_phrase(phrase);
        if normalized.is_empty() {
            return None;
        }

        for (alias, idx) in &self.alias_index {
            if contains_term(&normalized, alias) {
                return Some(&self.fields[*idx]);
            }
            // Plural tolerance: "p/e ratios", "yields"
            let plural = format!("{alias}s");
            if contains_term(&normalized, &plural) {
                return Some(&self.fields[*idx]);
            }
        }

        None
    }
}

/// Normalize a phrase for alias matching: lowercase, unify separators,
/// collapse whitespace.
fn normalize_phrase(phrase: &str) -> String {
    let lowered = phrase.to_lowercase();
    let replaced: String = lowered
        .chars()
        .map(|c| match c {
            '-' | '_' => ' ',
            c => c,
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check whether `needle` occurs in `haystack` bounded by non-alphanumeric
/// characters, so "pe" matches in "pe ratio" but not in "percent".
fn contains_term(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }

    let mut start = 0;
    while let Some(pos) = haystack[start..].find(needle) {
        let abs = start + pos;
        let before_ok = abs == 0
            || !haystack[..abs]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let end = abs + needle.len();
        let after_ok = end == haystack.len()
            || !haystack[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric());

        if before_ok && after_ok {
            return true;
        }
        start = abs + 1;
    }

    false
}

/// Built-in field table for the stock dataset.
fn default_fields() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::new(
            "pe",
            "P/E ratio",
            ValueType::Ratio,
            &[
                "p/e ratio",
                "p/e",
                "pe ratio",
                "pe",
                "price to earnings",
                "price to earnings ratio",
                "price earnings ratio",
            ],
        ),
        FieldDefinition::new(
            "pb",
            "P/B ratio",
            ValueType::Ratio,
            &[
                "p/b ratio",
                "p/b",
                "pb ratio",
                "pb",
                "price to book",
                "price to book ratio",
            ],
        ),
        FieldDefinition::new(
            "dividend_yield",
            "dividend yield",
            ValueType::Percent,
            &["dividend yield", "div yield", "yield"],
        ),
        FieldDefinition::new(
            "market_cap",
            "market cap",
            ValueType::Currency,
            &["market cap", "market capitalization", "market value"],
        ),
        FieldDefinition::new(
            "price",
            "price",
            ValueType::Currency,
            &["price", "share price", "stock price"],
        ),
        FieldDefinition::new(
            "eps",
            "EPS",
            ValueType::Currency,
            &["eps", "earnings per share"],
        ),
        FieldDefinition::new(
            "revenue",
            "revenue",
            ValueType::Currency,
            &["revenue", "total revenue", "sales", "turnover"],
        ),
        FieldDefinition::new(
            "net_income",
            "net income",
            ValueType::Currency,
            &["net income", "profit", "earnings"],
        ),
        FieldDefinition::new(
            "roe",
            "ROE",
            ValueType::Percent,
            &["roe", "return on equity"],
        ),
        FieldDefinition::new(
            "gross_margin",
            "gross margin",
            ValueType::Percent,
            &["gross margin"],
        ),
        FieldDefinition::new(
            "net_margin",
            "net margin",
            ValueType::Percent,
            &["net margin", "profit margin"],
        ),
        FieldDefinition::new(
            "debt_to_equity",
            "debt to equity",
            ValueType::Ratio,
            &["debt to equity", "debt to equity ratio", "d/e"],
        ),
        FieldDefinition::new(
            "volume",
            "volume",
            ValueType::Number,
            &["volume", "trading volume"],
        ),
        FieldDefinition::new("beta", "beta", ValueType::Ratio, &["beta"]),
    ]
}
