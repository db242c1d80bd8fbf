//! In-memory dataset provider.

use std::sync::Arc;

use async_trait::async_trait;

use super::provider::{DatasetProvider, ProviderError, StockRecord};

/// Dataset provider backed by a fixed in-memory record list.
///
/// Used in tests and when embedding the engine with an already-loaded
/// dataset.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    records: Arc<Vec<StockRecord>>,
}

impl MemoryDataset {
    /// Wrap a record list. Order is preserved.
    pub fn new(records: Vec<StockRecord>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl DatasetProvider for MemoryDataset {
    fn name(&self) -> &str {
        "memory"
    }

    async fn all_records(&self) -> Result<Arc<Vec<StockRecord>>, ProviderError> {
        Ok(Arc::clone(&self.records))
    }
}
