//! Screening engine.
//!
//! The central orchestrator for natural-language screening requests:
//! extract comparisons, build predicates, execute them against the dataset
//! snapshot, and restate what was understood. Each request is independent
//! and stateless; the lexicon and dataset snapshot are read-only.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::data::{DatasetProvider, StockRecord};
use crate::describe::describe;
use crate::extract::extract;
use crate::lexicon::Lexicon;
use crate::predicate::{build, PredicateSet};

// ============================================================================
// Errors
// ============================================================================

/// Request-scoped screening failures.
///
/// Per-clause problems (unknown fields, bad values) are warnings, not
/// errors; only a blank query, a query with nothing recognizable, or a
/// missing dataset fail the request. No failure outlives the request.
#[derive(Debug, Error)]
pub enum ScreenError {
    /// Blank or whitespace-only query, rejected before parsing
    #[error("No query provided. Use '?query=your screening criteria'")]
    EmptyQuery,

    /// Extraction produced zero usable predicates
    #[error("No recognizable screening criteria in query")]
    NoCriteriaRecognized,

    /// The dataset collaborator failed; no partial result is possible
    #[error("Stock data not available: {0}")]
    DatasetUnavailable(String),
}

// ============================================================================
// Screen Outcome
// ============================================================================

/// Successful screening result.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenOutcome {
    /// Echo of the input query
    pub query: String,
    /// Canonical restatement of the understood criteria; empty string when
    /// the predicate set is empty
    pub extracted_criteria: String,
    /// Matching records, in dataset order
    pub matches: Vec<StockRecord>,
    /// Number of matches
    pub count: usize,
}

// ============================================================================
// Executor
// ============================================================================

/// Apply the full AND-conjunction over each record.
///
/// A record matches iff every predicate evaluates true on its field value;
/// a missing or non-numeric field value fails that predicate (absent data
/// fails closed). The empty set matches the entire dataset. Result order
/// is the dataset's natural order; no ranking is imposed.
pub fn execute(set: &PredicateSet, records: &[StockRecord]) -> Vec<StockRecord> {
    records
        .iter()
        .filter(|record| {
            set.predicates().iter().all(|p| {
                record
                    .numeric(&p.field.key)
                    .is_some_and(|value| p.matches(value))
            })
        })
        .cloned()
        .collect()
}

// ============================================================================
// Engine
// ============================================================================

/// Natural-language screening engine.
///
/// Owns the read-only lexicon and the dataset provider; safe to share
/// across unboundedly many concurrent requests.
pub struct ScreenerEngine {
    lexicon: Lexicon,
    provider: Arc<dyn DatasetProvider>,
    max_results: Option<usize>,
}

impl ScreenerEngine {
    /// Create an engine over a dataset provider with the default lexicon.
    pub fn new(provider: Arc<dyn DatasetProvider>) -> Self {
        Self::with_lexicon(Lexicon::with_defaults(), provider)
    }

    /// Create an engine with a custom lexicon.
    pub fn with_lexicon(lexicon: Lexicon, provider: Arc<dyn DatasetProvider>) -> Self {
        Self {
            lexicon,
            provider,
            max_results: None,
        }
    }

    /// Cap the number of records returned per request.
    pub fn with_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    /// The engine's lexicon.
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Screen the dataset with a free-text query.
    pub async fn screen(&self, query: &str) -> Result<ScreenOutcome, ScreenError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(ScreenError::EmptyQuery);
        }

        let extraction = extract(trimmed);
        for fragment in &extraction.unparsed {
            debug!(fragment = %fragment, "Dropped unparsed clause");
        }

        let (set, warnings) = build(&extraction.comparisons, &self.lexicon);
        for warning in &warnings {
            warn!(warning = %warning, "Dropped comparison");
        }

        if set.is_empty() {
            return Err(ScreenError::NoCriteriaRecognized);
        }

        if set.is_infeasible() {
            info!("Criteria are contradictory; result is guaranteed empty");
        }

        let records = self
            .provider
            .all_records()
            .await
            .map_err(|e| ScreenError::DatasetUnavailable(e.to_string()))?;

        let mut matches = execute(&set, &records);
        if let Some(max) = self.max_results {
            matches.truncate(max);
        }

        let extracted_criteria = describe(&set);
        info!(
            count = matches.len(),
            predicates = set.len(),
            criteria = %extracted_criteria,
            "Screen complete"
        );

        Ok(ScreenOutcome {
            query: trimmed.to_string(),
            extracted_criteria,
            count: matches.len(),
            matches,
        })
    }
}
