//! Typed predicates and the predicate builder.
//!
//! Converts raw comparisons into a validated, unit-normalized predicate
//! set. Comparisons whose field cannot be resolved or whose value cannot be
//! normalized are dropped with a warning; the engine never fabricates a
//! field. The set is AND-only in this version; richer combinators would be
//! added as a tagged node type without changing the executor contract.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::extract::{Comparator, RawComparison};
use crate::lexicon::{FieldDefinition, Lexicon};

// ============================================================================
// Predicate
// ============================================================================

/// An atomic comparison between one dataset field and one normalized value.
#[derive(Debug, Clone, Serialize)]
pub struct Predicate {
    /// Resolved field definition
    pub field: FieldDefinition,
    /// Relational operator
    pub comparator: Comparator,
    /// Value normalized to the field's base scale ("2%" → 0.02,
    /// "1 billion" → 1e9)
    pub value: f64,
}

impl Predicate {
    /// Evaluate the predicate against a field value.
    pub fn matches(&self, value: f64) -> bool {
        match self.comparator {
            Comparator::Lt => value < self.value,
            Comparator::Lte => value <= self.value,
            Comparator::Gt => value > self.value,
            Comparator::Gte => value >= self.value,
            Comparator::Eq => approx_eq(value, self.value),
        }
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= f64::EPSILON.max(b.abs() * 1e-9)
}

// ============================================================================
// Predicate Set
// ============================================================================

/// Ordered conjunction of predicates.
///
/// A record matches the set iff it matches every predicate. The empty set
/// matches everything. Contradictory bounds on the same field leave the set
/// valid but flagged infeasible (guaranteed-empty result).
#[derive(Debug, Clone, Default, Serialize)]
pub struct PredicateSet {
    predicates: Vec<Predicate>,
}

impl PredicateSet {
    /// Build a set from predicates in extraction order.
    pub fn new(predicates: Vec<Predicate>) -> Self {
        Self { predicates }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Predicates in order.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Whether the conjunction can never be satisfied.
    ///
    /// Detected by intersecting per-field bounds: a lower bound above an
    /// upper bound (e.g., both `> 20` and `< 10`), or an equality outside
    /// the admissible interval.
    pub fn is_infeasible(&self) -> bool {
        let mut bounds: HashMap<&str, Bounds> = HashMap::new();

        for p in &self.predicates {
            let entry = bounds.entry(p.field.key.as_str()).or_default();
            match p.comparator {
                Comparator::Lt => entry.tighten_upper(p.value, true),
                Comparator::Lte => entry.tighten_upper(p.value, false),
                Comparator::Gt => entry.tighten_lower(p.value, true),
                Comparator::Gte => entry.tighten_lower(p.value, false),
                Comparator::Eq => {
                    entry.tighten_lower(p.value, false);
                    entry.tighten_upper(p.value, false);
                }
            }
        }

        bounds.values().any(Bounds::is_empty)
    }
}

/// Admissible interval for one field, accumulated over its predicates.
#[derive(Debug, Default)]
struct Bounds {
    /// (bound, strict)
    lower: Option<(f64, bool)>,
    upper: Option<(f64, bool)>,
}

impl Bounds {
    fn tighten_lower(&mut self, value: f64, strict: bool) {
        let replace = match self.lower {
            None => true,
            Some((current, current_strict)) => {
                value > current || (value == current && strict && !current_strict)
            }
        };
        if replace {
            self.lower = Some((value, strict));
        }
    }

    fn tighten_upper(&mut self, value: f64, strict: bool) {
        let replace = match self.upper {
            None => true,
            Some((current, current_strict)) => {
                value < current || (value == current && strict && !current_strict)
            }
        };
        if replace {
            self.upper = Some((value, strict));
        }
    }

    fn is_empty(&self) -> bool {
        match (self.lower, self.upper) {
            (Some((lo, lo_strict)), Some((hi, hi_strict))) => {
                lo > hi || (lo == hi && (lo_strict || hi_strict))
            }
            _ => false,
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Per-clause warning emitted while building predicates. Non-fatal: the
/// offending comparison is dropped and the rest of the query still screens.
#[derive(Debug, Clone, Error)]
pub enum BuildWarning {
    /// The field phrase matched no lexicon alias
    #[error("Unknown field in '{phrase}'")]
    UnknownField { phrase: String },

    /// The value or its unit suffix could not be normalized for the field
    #[error("Cannot read value '{raw}' for {field}: {reason}")]
    ValueParseFailure {
        field: String,
        raw: String,
        reason: String,
    },
}

/// Build a predicate set from raw comparisons.
///
/// Resolution and normalization failures produce warnings instead of
/// errors; an entirely unresolvable query yields an empty set, which the
/// facade reports as "no recognizable criteria".
pub fn build(comparisons: &[RawComparison], lexicon: &Lexicon) -> (PredicateSet, Vec<BuildWarning>) {
    let mut predicates = Vec::new();
    let mut warnings = Vec::new();

    for raw in comparisons {
        let Some(field) = lexicon.resolve(&raw.field_phrase) else {
            warnings.push(BuildWarning::UnknownField {
                phrase: raw.field_phrase.clone(),
            });
            continue;
        };

        let parsed: f64 = match raw.raw_value.parse() {
            Ok(v) => v,
            Err(e) => {
                warnings.push(BuildWarning::ValueParseFailure {
                    field: field.display.clone(),
                    raw: raw.raw_value.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let suffix = raw.unit_suffix.as_deref().unwrap_or("");
        let Some(multiplier) = field.multiplier_for(suffix) else {
            warnings.push(BuildWarning::ValueParseFailure {
                field: field.display.clone(),
                raw: format!("{}{}", raw.raw_value, suffix),
                reason: format!("unit '{suffix}' does not apply to this field"),
            });
            continue;
        };

        predicates.push(Predicate {
            field: field.clone(),
            comparator: raw.comparator,
            value: parsed * multiplier,
        });
    }

    (PredicateSet::new(predicates), warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    fn build_query(query: &str) -> (PredicateSet, Vec<BuildWarning>) {
        let lexicon = Lexicon::with_defaults();
        let extraction = extract(query);
        build(&extraction.comparisons, &lexicon)
    }

    #[test]
    fn test_build_normalizes_percent() {
        let (set, warnings) = build_query("dividend yield greater than 2%");
        assert!(warnings.is_empty());
        assert_eq!(set.len(), 1);

        let p = &set.predicates()[0];
        assert_eq!(p.field.key, "dividend_yield");
        assert_eq!(p.comparator, Comparator::Gt);
        assert!((p.value - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_bare_number_on_percent_field_scales() {
        // "yield above 2" means 2 percent
        let (set, _) = build_query("dividend yield above 2");
        assert!((set.predicates()[0].value - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_build_normalizes_magnitude() {
        let (set, warnings) = build_query("market cap over 1 billion");
        assert!(warnings.is_empty());
        assert_eq!(set.predicates()[0].value, 1e9);
    }

    #[test]
    fn test_ratio_value_unscaled() {
        let (set, _) = build_query("P/E ratio less than 18");
        assert_eq!(set.predicates()[0].value, 18.0);
    }

    #[test]
    fn test_unknown_field_warns_and_drops() {
        let (set, warnings) = build_query("froobles above 10 and pe below 20");
        assert_eq!(set.len(), 1);
        assert_eq!(set.predicates()[0].field.key, "pe");
        assert!(matches!(warnings[0], BuildWarning::UnknownField { .. }));
    }

    #[test]
    fn test_inapplicable_unit_warns_and_drops() {
        // "%" has no meaning for a ratio field
        let (set, warnings) = build_query("pe below 20%");
        assert!(set.is_empty());
        assert!(matches!(
            warnings[0],
            BuildWarning::ValueParseFailure { .. }
        ));
    }

    #[test]
    fn test_all_unresolvable_yields_empty_set() {
        let (set, warnings) = build_query("gizmos above 5");
        assert!(set.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_predicate_matches() {
        let (set, _) = build_query("pe less than 18");
        let p = &set.predicates()[0];
        assert!(p.matches(15.0));
        assert!(!p.matches(18.0));
        assert!(!p.matches(20.0));
    }

    #[test]
    fn test_infeasible_disjoint_ranges() {
        let (set, _) = build_query("pe less than 10 and pe greater than 20");
        assert!(set.is_infeasible());
    }

    #[test]
    fn test_infeasible_equal_bounds_with_strict() {
        let (set, _) = build_query("pe less than 10 and pe greater than 10");
        assert!(set.is_infeasible());
    }

    #[test]
    fn test_feasible_overlapping_ranges() {
        let (set, _) = build_query("pe greater than 5 and pe less than 25");
        assert!(!set.is_infeasible());
    }

    #[test]
    fn test_feasible_touching_inclusive_bounds() {
        let (set, _) = build_query("pe at least 10 and pe at most 10");
        assert!(!set.is_infeasible());
    }

    #[test]
    fn test_eq_outside_range_is_infeasible() {
        let (set, _) = build_query("pe equal to 30 and pe less than 10");
        assert!(set.is_infeasible());
    }

    #[test]
    fn test_duplicate_fields_kept_in_order() {
        let (set, _) = build_query("pe above 5 and pe below 25");
        assert_eq!(set.len(), 2);
        assert_eq!(set.predicates()[0].comparator, Comparator::Gt);
        assert_eq!(set.predicates()[1].comparator, Comparator::Lt);
    }
}
