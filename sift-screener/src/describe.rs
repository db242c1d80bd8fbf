//! Criteria restatement.
//!
//! Renders a resolved predicate set back into a canonical human-readable
//! string for the `extracted_criteria` response field. This is a pure
//! function of the predicate set and never references the original query
//! text, so the response always shows what was actually understood.

use crate::predicate::PredicateSet;

/// Render a predicate set as `"<field> <op> <value>"` clauses joined with
/// `" and "`. An empty set renders as the empty string.
pub fn describe(set: &PredicateSet) -> String {
    set.predicates()
        .iter()
        .map(|p| {
            format!(
                "{} {} {}",
                p.field.display,
                p.comparator.symbol(),
                format_value(p.value)
            )
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Minimal numeric formatting: integers print without a fractional part
/// ("18"), fractions keep only significant digits ("0.02").
fn format_value(value: f64) -> String {
    format!("{value}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;
    use crate::lexicon::Lexicon;
    use crate::predicate::build;

    fn describe_query(query: &str) -> String {
        let lexicon = Lexicon::with_defaults();
        let extraction = extract(query);
        let (set, _) = build(&extraction.comparisons, &lexicon);
        describe(&set)
    }

    #[test]
    fn test_describe_reference_query() {
        let criteria = describe_query(
            "Find stocks with P/E ratio less than 18 and dividend yield greater than 2%",
        );
        assert_eq!(criteria, "P/E ratio < 18 and dividend yield > 0.02");
    }

    #[test]
    fn test_describe_is_canonical_not_verbatim() {
        // Different phrasings of the same criteria produce the same string
        let a = describe_query("pe under 18");
        let b = describe_query("price to earnings below 18");
        assert_eq!(a, "P/E ratio < 18");
        assert_eq!(a, b);
    }

    #[test]
    fn test_describe_magnitudes() {
        let criteria = describe_query("market cap at least 2 billion");
        assert_eq!(criteria, "market cap >= 2000000000");
    }

    #[test]
    fn test_describe_empty_set() {
        let criteria = describe_query("nothing useful here");
        assert_eq!(criteria, "");
    }

    #[test]
    fn test_format_value_minimal_digits() {
        assert_eq!(format_value(18.0), "18");
        assert_eq!(format_value(0.02), "0.02");
        assert_eq!(format_value(1e9), "1000000000");
        assert_eq!(format_value(1.5), "1.5");
    }
}
