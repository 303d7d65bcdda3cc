//! Candle engine: aggregation, gap filling and the chart pipeline.
//!
//! The engine consumes ascending native candles (from the data layer) and
//! produces chart-ready series:
//!
//! 1. Aggregate: fold native candles into buckets of the target timeframe
//! 2. Gap fill: insert blanks for buckets with no data between real candles
//! 3. Chart: validate a request, read storage, run 1 and 2

pub mod aggregate;
pub mod chart;
pub mod gap_fill;

pub use aggregate::aggregate;
pub use chart::{CandleService, ChartError, ChartRequest, ErrorKind, DATA_FLOOR_YEAR};
pub use gap_fill::fill_gaps;

use crate::domain::Timeframe;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("timeframe {timeframe} is finer than the native {native_ms} ms resolution")]
    TimeframeNotSupported { timeframe: Timeframe, native_ms: i64 },
}
