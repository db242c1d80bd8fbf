//! Comparison extraction from free-text queries.
//!
//! Splits a query into clauses on connector words ("and", commas) and scans
//! each clause for a comparator phrase plus a numeric token with an optional
//! unit suffix. Clauses that yield no recognizable comparison are recorded
//! as unparsed fragments rather than aborting the query; partial extraction
//! is the designed behavior.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

// ============================================================================
// Comparator
// ============================================================================

/// Relational comparator extracted from a query clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    /// Strictly less than
    Lt,
    /// Less than or equal
    Lte,
    /// Strictly greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Equal
    Eq,
}

impl Comparator {
    /// Operator symbol used when restating criteria.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Eq => "=",
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

// ============================================================================
// Raw Comparison
// ============================================================================

/// An unvalidated comparison extracted from a single clause.
///
/// The field phrase has not yet been resolved against the lexicon and the
/// value has not been normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RawComparison {
    /// Clause text surrounding the comparator and value
    pub field_phrase: String,
    /// Relational operator
    pub comparator: Comparator,
    /// Numeric token as written ("18", "2", "1.5")
    pub raw_value: String,
    /// Unit suffix as written ("%", "billion"), lowercased
    pub unit_suffix: Option<String>,
}

/// Result of scanning a query: extracted comparisons plus the clauses that
/// could not be interpreted.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Comparisons in clause order
    pub comparisons: Vec<RawComparison>,
    /// Clauses with no recognizable comparator or numeric token
    pub unparsed: Vec<String>,
}

// ============================================================================
// Extraction
// ============================================================================

/// Clause connectors: commas and the word "and".
static CLAUSE_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*,\s*|\s+and\s+").expect("clause split regex"));

/// Comparator phrases, longest alternatives first so "less than or equal
/// to" is not shadowed by "less than".
static COMPARATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?ix)
        \bless\ than\ or\ equal\ to\b
        | \bgreater\ than\ or\ equal\ to\b
        | \bno\ more\ than\b
        | \bno\ less\ than\b
        | \bat\ least\b
        | \bat\ most\b
        | \bless\ than\b
        | \bgreater\ than\b
        | \bmore\ than\b
        | \bexceeding\b
        | \babove\b
        | \bbelow\b
        | \bover\b
        | \bunder\b
        | \bequal\ to\b
        | \bequals\b
        | <= | >= | < | > | =
        ",
    )
    .expect("comparator regex")
});

/// Numeric token with an optional unit suffix. Single-letter magnitudes
/// require a word boundary so "18 market cap" does not read "m" as a unit.
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(-?\d+(?:\.\d+)?)\s*(%|thousand\b|million\b|billion\b|trillion\b|bn\b|[kmbt]\b)?")
        .expect("number regex")
});

/// Map a matched comparator phrase to its operator.
fn comparator_for(phrase: &str) -> Comparator {
    match phrase.to_lowercase().as_str() {
        "less than or equal to" | "no more than" | "at most" | "<=" => Comparator::Lte,
        "greater than or equal to" | "no less than" | "at least" | ">=" => Comparator::Gte,
        "less than" | "below" | "under" | "<" => Comparator::Lt,
        "greater than" | "more than" | "above" | "over" | "exceeding" | ">" => Comparator::Gt,
        _ => Comparator::Eq,
    }
}

/// Extract comparisons from a free-text query.
///
/// Each clause must contain exactly one recognized comparator phrase and
/// one numeric token; the field phrase may appear on either side. The
/// numeric token is preferentially taken from after the comparator
/// ("less than 18"), falling back to anywhere in the clause.
pub fn extract(query: &str) -> Extraction {
    let mut extraction = Extraction::default();

    for clause in CLAUSE_SPLIT.split(query) {
        let clause = clause.trim();
        if clause.is_empty() {
            continue;
        }

        match extract_clause(clause) {
            Some(comparison) => extraction.comparisons.push(comparison),
            None => extraction.unparsed.push(clause.to_string()),
        }
    }

    extraction
}

fn extract_clause(clause: &str) -> Option<RawComparison> {
    let cmp_match = COMPARATOR.find(clause)?;
    let comparator = comparator_for(cmp_match.as_str());

    // Prefer the number following the comparator; "less than 18 P/E" and
    // "P/E less than 18" both land here.
    let tail = &clause[cmp_match.end()..];
    let (num_caps, num_offset) = match NUMBER.captures(tail) {
        Some(caps) => (caps, cmp_match.end()),
        None => (NUMBER.captures(clause)?, 0),
    };

    let num_match = num_caps.get(0)?;
    let raw_value = num_caps.get(1)?.as_str().to_string();
    let unit_suffix = num_caps
        .get(2)
        .map(|m| m.as_str().to_lowercase())
        .filter(|s| !s.is_empty());

    let num_start = num_offset + num_match.start();
    let num_end = num_offset + num_match.end();

    // Everything outside the comparator and number spans is field phrase.
    let mut parts: Vec<&str> = Vec::new();
    for (start, end) in [
        (0, cmp_match.start().min(num_start)),
        (
            cmp_match.end().min(num_end),
            cmp_match.start().max(num_start),
        ),
        (cmp_match.end().max(num_end), clause.len()),
    ] {
        if start < end {
            parts.push(clause[start..end].trim());
        }
    }
    let field_phrase = parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    Some(RawComparison {
        field_phrase,
        comparator,
        raw_value,
        unit_suffix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_clause_field_first() {
        let ex = extract("P/E ratio less than 18");
        assert_eq!(ex.comparisons.len(), 1);
        assert!(ex.unparsed.is_empty());

        let c = &ex.comparisons[0];
        assert_eq!(c.comparator, Comparator::Lt);
        assert_eq!(c.raw_value, "18");
        assert_eq!(c.unit_suffix, None);
        assert!(c.field_phrase.contains("P/E ratio"));
    }

    #[test]
    fn test_single_clause_field_last() {
        let ex = extract("less than 18 P/E ratio");
        assert_eq!(ex.comparisons.len(), 1);

        let c = &ex.comparisons[0];
        assert_eq!(c.comparator, Comparator::Lt);
        assert_eq!(c.raw_value, "18");
        assert!(c.field_phrase.contains("P/E ratio"));
    }

    #[test]
    fn test_two_clauses_joined_by_and() {
        let ex = extract(
            "Find stocks with P/E ratio less than 18 and dividend yield greater than 2%",
        );
        assert_eq!(ex.comparisons.len(), 2);

        assert_eq!(ex.comparisons[0].comparator, Comparator::Lt);
        assert_eq!(ex.comparisons[0].raw_value, "18");

        assert_eq!(ex.comparisons[1].comparator, Comparator::Gt);
        assert_eq!(ex.comparisons[1].raw_value, "2");
        assert_eq!(ex.comparisons[1].unit_suffix.as_deref(), Some("%"));
    }

    #[test]
    fn test_comma_separated_clauses() {
        let ex = extract("pe below 15, yield above 3%");
        assert_eq!(ex.comparisons.len(), 2);
        assert_eq!(ex.comparisons[0].comparator, Comparator::Lt);
        assert_eq!(ex.comparisons[1].comparator, Comparator::Gt);
    }

    #[test]
    fn test_magnitude_suffixes() {
        let ex = extract("market cap over 1 billion");
        assert_eq!(ex.comparisons.len(), 1);
        let c = &ex.comparisons[0];
        assert_eq!(c.comparator, Comparator::Gt);
        assert_eq!(c.raw_value, "1");
        assert_eq!(c.unit_suffix.as_deref(), Some("billion"));
    }

    #[test]
    fn test_short_magnitude_needs_boundary() {
        // "m" must not be lifted out of a following word
        let ex = extract("price under 18 most days");
        assert_eq!(ex.comparisons.len(), 1);
        assert_eq!(ex.comparisons[0].unit_suffix, None);

        let ex = extract("revenue above 500m");
        assert_eq!(ex.comparisons[0].unit_suffix.as_deref(), Some("m"));
    }

    #[test]
    fn test_longer_phrases_win() {
        let ex = extract("pe less than or equal to 20");
        assert_eq!(ex.comparisons[0].comparator, Comparator::Lte);

        let ex = extract("yield at least 2");
        assert_eq!(ex.comparisons[0].comparator, Comparator::Gte);

        let ex = extract("price at most 50");
        assert_eq!(ex.comparisons[0].comparator, Comparator::Lte);
    }

    #[test]
    fn test_symbol_operators() {
        let ex = extract("pe < 15 and yield >= 2%");
        assert_eq!(ex.comparisons.len(), 2);
        assert_eq!(ex.comparisons[0].comparator, Comparator::Lt);
        assert_eq!(ex.comparisons[1].comparator, Comparator::Gte);
    }

    #[test]
    fn test_decimal_and_negative_values() {
        let ex = extract("beta below 1.5 and eps greater than -2");
        assert_eq!(ex.comparisons[0].raw_value, "1.5");
        assert_eq!(ex.comparisons[1].raw_value, "-2");
    }

    #[test]
    fn test_unparsed_fragment_recorded() {
        let ex = extract("show me something nice and pe below 10");
        assert_eq!(ex.comparisons.len(), 1);
        assert_eq!(ex.unparsed.len(), 1);
        assert_eq!(ex.unparsed[0], "show me something nice");
    }

    #[test]
    fn test_no_number_is_unparsed() {
        let ex = extract("pe below average");
        assert!(ex.comparisons.is_empty());
        assert_eq!(ex.unparsed.len(), 1);
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let ex = extract("   ");
        assert!(ex.comparisons.is_empty());
        assert!(ex.unparsed.is_empty());
    }
}
