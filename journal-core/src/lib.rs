//! Journal Core: candle domain types, aggregation engine and candle storage.
//!
//! This crate contains the chart data path of the trading journal:
//! - Domain types (candles, chart points, timeframes)
//! - Timeframe resolution and the request size guard
//! - Streaming OHLCV aggregation and gap filling
//! - The chart pipeline tying storage to the engine
//! - Candle stores (Parquet, in-memory), CSV ingest and synthetic seeding

pub mod data;
pub mod domain;
pub mod engine;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types handed across threads by the HTTP layer
    /// are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Candle>();
        require_sync::<domain::Candle>();
        require_send::<domain::ChartPoint>();
        require_sync::<domain::ChartPoint>();
        require_send::<domain::Timeframe>();
        require_sync::<domain::Timeframe>();

        require_send::<engine::ChartRequest>();
        require_sync::<engine::ChartRequest>();
        require_send::<engine::ChartError>();
        require_sync::<engine::ChartError>();
        require_send::<engine::CandleService<dyn data::CandleStore>>();
        require_sync::<engine::CandleService<dyn data::CandleStore>>();

        require_send::<data::ParquetStore>();
        require_sync::<data::ParquetStore>();
        require_send::<data::MemoryStore>();
        require_sync::<data::MemoryStore>();
    }

    /// Architecture contract: the engine never sees storage.
    ///
    /// `aggregate` and `fill_gaps` take plain candle slices and vectors. If
    /// either grows a store parameter this stops compiling.
    #[test]
    fn engine_functions_are_storage_free() {
        fn _check(
            candles: &[domain::Candle],
            tf: domain::Timeframe,
        ) -> Result<Vec<domain::ChartPoint>, engine::EngineError> {
            let aggregated = engine::aggregate(candles, tf)?;
            Ok(engine::fill_gaps(aggregated, tf.duration_ms()))
        }
    }
}
