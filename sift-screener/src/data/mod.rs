//! Dataset access for the screening engine.
//!
//! The engine treats the stock dataset as a read-only collaborator: a
//! provider hands out an immutable snapshot of records, loaded once at
//! startup. Providers:
//!
//! - **CsvDataset**: loads a screener CSV file into memory at startup
//! - **MemoryDataset**: wraps records directly, for tests and embedding

mod csv;
mod memory;
mod provider;

pub use csv::CsvDataset;
pub use memory::MemoryDataset;
pub use provider::{DatasetProvider, ProviderError, StockRecord};
