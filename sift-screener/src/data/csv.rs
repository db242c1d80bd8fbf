//! CSV-backed dataset provider.
//!
//! Loads the screener CSV once at startup into an immutable in-memory
//! snapshot. Header names are cleaned into canonical field names (trimmed,
//! lowercased, `.` and spaces replaced with `_`, case-insensitive
//! duplicates suffixed `_{n}`), and numeric-looking cells are coerced to
//! JSON numbers so NaN/inf never reach a response.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use csv_async::AsyncReaderBuilder;
use futures::StreamExt;
use tokio::fs::File;
use tracing::{info, warn};

use super::provider::{DatasetProvider, ProviderError, StockRecord};

/// Attribute names accepted as the record symbol column.
const SYMBOL_COLUMNS: &[&str] = &["symbol", "ticker"];

/// Dataset provider backed by a CSV file loaded at startup.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    path: PathBuf,
    records: Arc<Vec<StockRecord>>,
}

impl CsvDataset {
    /// Load the CSV file into memory.
    ///
    /// Rows without a symbol value are skipped with a warning; a file
    /// without a symbol/ticker column is rejected outright.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).await.map_err(|e| {
            ProviderError::Unavailable(format!("cannot open {}: {e}", path.display()))
        })?;

        let mut reader = AsyncReaderBuilder::new().flexible(true).create_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();
        let columns = clean_column_names(&headers);

        let symbol_idx = columns
            .iter()
            .position(|c| SYMBOL_COLUMNS.contains(&c.as_str()))
            .ok_or_else(|| {
                ProviderError::Malformed("dataset has no symbol/ticker column".to_string())
            })?;

        let mut records = Vec::new();
        let mut skipped = 0usize;

        let mut rows = reader.records();
        while let Some(row) = rows.next().await {
            let row = row.map_err(|e| ProviderError::Malformed(e.to_string()))?;

            let symbol = row.get(symbol_idx).unwrap_or("").trim();
            if symbol.is_empty() {
                skipped += 1;
                continue;
            }

            let mut record = StockRecord::new(symbol);
            for (idx, column) in columns.iter().enumerate() {
                if idx == symbol_idx {
                    continue;
                }
                if let Some(cell) = row.get(idx) {
                    record.attributes.insert(column.clone(), coerce_cell(cell));
                }
            }
            records.push(record);
        }

        if skipped > 0 {
            warn!(skipped, "Skipped dataset rows without a symbol");
        }
        info!(
            records = records.len(),
            metrics = columns.len(),
            path = %path.display(),
            "Loaded stock dataset"
        );

        Ok(Self {
            path,
            records: Arc::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DatasetProvider for CsvDataset {
    fn name(&self) -> &str {
        "csv"
    }

    async fn all_records(&self) -> Result<Arc<Vec<StockRecord>>, ProviderError> {
        Ok(Arc::clone(&self.records))
    }
}

/// Clean raw CSV headers into canonical field names.
///
/// Trims, lowercases, replaces `.` and spaces with `_`, then resolves
/// case-insensitive duplicates by appending `_{n}` to repeats.
pub fn clean_column_names(headers: &[String]) -> Vec<String> {
    let normalized: Vec<String> = headers
        .iter()
        .map(|h| h.trim().to_lowercase().replace(['.', ' '], "_"))
        .collect();

    let mut seen: HashMap<String, usize> = HashMap::new();
    normalized
        .into_iter()
        .map(|name| match seen.get_mut(&name) {
            Some(count) => {
                *count += 1;
                format!("{name}_{count}")
            }
            None => {
                seen.insert(name.clone(), 0);
                name
            }
        })
        .collect()
}

/// Coerce a CSV cell into a JSON value.
///
/// Empty cells become null; numeric cells become numbers (non-finite
/// values become null); everything else stays a string.
fn coerce_cell(cell: &str) -> serde_json::Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return serde_json::Value::Null;
    }

    if let Ok(n) = trimmed.parse::<f64>() {
        return serde_json::Number::from_f64(n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null);
    }

    serde_json::Value::String(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_clean_column_names_normalizes() {
        let headers = vec![
            " Symbol ".to_string(),
            "Dividend Yield".to_string(),
            "Price.to.Earnings".to_string(),
        ];
        assert_eq!(
            clean_column_names(&headers),
            vec!["symbol", "dividend_yield", "price_to_earnings"]
        );
    }

    #[test]
    fn test_clean_column_names_dedupes_case_insensitive() {
        let headers = vec!["PE".to_string(), "pe".to_string(), "Pe".to_string()];
        assert_eq!(clean_column_names(&headers), vec!["pe", "pe_1", "pe_2"]);
    }

    #[test]
    fn test_coerce_cell() {
        assert_eq!(coerce_cell("15.5"), serde_json::json!(15.5));
        assert_eq!(coerce_cell(" 42 "), serde_json::json!(42.0));
        assert_eq!(coerce_cell(""), serde_json::Value::Null);
        assert_eq!(coerce_cell("NaN"), serde_json::Value::Null);
        assert_eq!(coerce_cell("Technology"), serde_json::json!("Technology"));
    }

    #[tokio::test]
    async fn test_load_csv_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Symbol,Name,PE,Dividend Yield").unwrap();
        writeln!(file, "AAA,Alpha Corp,12.5,0.03").unwrap();
        writeln!(file, "BBB,Beta Inc,22.0,").unwrap();
        writeln!(file, ",Ghost Row,9.0,0.01").unwrap();
        file.flush().unwrap();

        let dataset = CsvDataset::load(file.path()).await.unwrap();
        assert_eq!(dataset.len(), 2);

        let records = dataset.all_records().await.unwrap();
        assert_eq!(records[0].symbol, "AAA");
        assert_eq!(records[0].numeric("pe"), Some(12.5));
        assert_eq!(records[0].numeric("dividend_yield"), Some(0.03));
        assert_eq!(records[1].symbol, "BBB");
        assert_eq!(records[1].numeric("dividend_yield"), None);
    }

    #[tokio::test]
    async fn test_missing_file_is_unavailable() {
        let err = CsvDataset::load("/nonexistent/stocks.csv").await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_symbol_column_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Name,PE").unwrap();
        writeln!(file, "Alpha,10").unwrap();
        file.flush().unwrap();

        let err = CsvDataset::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }
}
