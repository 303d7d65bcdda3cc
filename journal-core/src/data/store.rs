//! Candle store trait and structured error types.
//!
//! The CandleStore trait abstracts over where native 15-second candles live
//! (Parquet files on disk, in-memory maps for tests) so the chart pipeline can
//! swap implementations.

use crate::domain::{Candle, NATIVE_FRAME_MS};
use thiserror::Error;

/// Structured error types for storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid symbol name '{0}'")]
    InvalidSymbol(String),

    #[error("no stored candles for symbol '{symbol}'")]
    NoData { symbol: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parquet error: {0}")]
    Parquet(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("metadata error: {0}")]
    Meta(String),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Source of native-resolution candles.
///
/// Implementations return candles sorted ascending by time. The chart pipeline
/// relies on that order.
pub trait CandleStore: Send + Sync {
    /// Human-readable name of this store.
    fn name(&self) -> &str;

    /// Whether a native candle series exists for `symbol`.
    fn is_symbol_supported(&self, symbol: &str) -> Result<bool, StoreError>;

    /// Candles with `start <= time < end`, ascending.
    ///
    /// `start` is snapped down to the native 15-second grid first.
    fn candles_in_range(
        &self,
        start_ms: i64,
        end_ms: i64,
        symbol: &str,
    ) -> Result<Vec<Candle>, StoreError>;

    /// First and last stored candle time, or `None` when the series is empty.
    fn time_range(&self, symbol: &str) -> Result<Option<(i64, i64)>, StoreError>;
}

/// Snap a timestamp down to the native 15-second grid.
pub fn snap_to_native(time_ms: i64) -> i64 {
    time_ms.div_euclid(NATIVE_FRAME_MS) * NATIVE_FRAME_MS
}

/// Reject symbol names that could not be a series name (`^[A-Za-z0-9_]+$`).
pub fn validate_symbol(symbol: &str) -> Result<(), StoreError> {
    let valid = !symbol.is_empty()
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidSymbol(symbol.to_string()))
    }
}
