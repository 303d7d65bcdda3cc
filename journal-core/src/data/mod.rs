//! Candle storage, ingestion and seeding

pub mod ingest;
pub mod memory;
pub mod parquet;
pub mod store;
pub mod synthetic;

pub use ingest::{canonicalize, read_csv, read_csv_from, IngestReport};
pub use memory::MemoryStore;
pub use parquet::{ParquetStore, StoreMeta};
pub use store::{snap_to_native, validate_symbol, CandleStore, StoreError};
pub use synthetic::synthetic_candles;
