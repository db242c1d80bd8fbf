//! Dataset provider abstraction.
//!
//! Defines the `DatasetProvider` trait the engine screens against and the
//! `StockRecord` shape every provider must return. Records are opaque
//! attribute maps, but the `symbol` attribute is an explicit contract so
//! downstream consumers never have to guess fallback keys.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Stock Record
// ============================================================================

/// One row of the stock dataset: a canonical symbol plus whatever
/// attributes the dataset exposes. The engine never mutates records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Canonical ticker symbol, always present
    pub symbol: String,
    /// Remaining attributes keyed by canonical field name
    #[serde(flatten)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl StockRecord {
    /// Create a record with a symbol and no attributes.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Read an attribute as a number.
    ///
    /// Accepts JSON numbers and numeric strings (CSV sources may carry
    /// either); anything else, including a missing attribute, is `None`.
    pub fn numeric(&self, key: &str) -> Option<f64> {
        match self.attributes.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

// ============================================================================
// Provider Error
// ============================================================================

/// Errors raised by dataset providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The dataset cannot be served (missing file, failed load)
    #[error("Dataset unavailable: {0}")]
    Unavailable(String),

    /// IO failure while reading the dataset
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The dataset is structurally invalid (bad header, missing symbol column)
    #[error("Malformed dataset: {0}")]
    Malformed(String),
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Read-only dataset collaborator.
///
/// Implementations must return records in a stable order; the engine
/// preserves that order in screening results.
#[async_trait]
pub trait DatasetProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// The full dataset snapshot.
    async fn all_records(&self) -> Result<Arc<Vec<StockRecord>>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_from_number_and_string() {
        let record = StockRecord::new("AAPL")
            .with_attr("pe", 15.2)
            .with_attr("volume", "1200000")
            .with_attr("sector", "Technology");

        assert_eq!(record.numeric("pe"), Some(15.2));
        assert_eq!(record.numeric("volume"), Some(1_200_000.0));
        assert_eq!(record.numeric("sector"), None);
        assert_eq!(record.numeric("missing"), None);
    }

    #[test]
    fn test_serialization_flattens_attributes() {
        let record = StockRecord::new("X").with_attr("pe", 15).with_attr("name", "X Corp");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value, json!({"symbol": "X", "pe": 15, "name": "X Corp"}));
    }

    #[test]
    fn test_deserialization_splits_symbol() {
        let record: StockRecord =
            serde_json::from_value(json!({"symbol": "Y", "pb": 1.1})).unwrap();
        assert_eq!(record.symbol, "Y");
        assert_eq!(record.numeric("pb"), Some(1.1));
    }
}
