//! Chart pipeline: validate a request, read native candles, aggregate, fill gaps.

use super::{aggregate, fill_gaps, EngineError};
use crate::data::{CandleStore, StoreError};
use crate::domain::{is_within_max_count, ChartPoint, Timeframe, TimeframeError, MAX_CANDLES};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Earliest year of stored data; requests starting before it cannot match.
pub const DATA_FLOOR_YEAR: i32 = 2010;

/// A validated chart request for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub start: i64,
    pub end: i64,
    #[serde(default)]
    pub timeframe: Timeframe,
}

impl ChartRequest {
    pub fn new(start: i64, end: i64, timeframe: Timeframe) -> Self {
        Self {
            start,
            end,
            timeframe,
        }
    }
}

/// How a [`ChartError`] should be reported to a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("Bad timeframe input!")]
    InvalidTimeframeToken(#[source] TimeframeError),

    #[error("Timeframe {timeframe} not supported")]
    TimeframeNotSupported { timeframe: Timeframe },

    #[error("Requested range exceeds {limit} candles at {timeframe}")]
    RangeTooLarge { timeframe: Timeframe, limit: i64 },

    #[error("Symbol not supported!")]
    SymbolNotSupported { symbol: String },

    #[error("Start must be before end")]
    EmptyRange { start: i64, end: i64 },

    #[error("No data before {}", DATA_FLOOR_YEAR)]
    BeforeDataFloor { start: i64 },

    #[error("Start timestamp out of range")]
    StartOutOfRange { start: i64 },

    #[error("No candles found for range")]
    NoCandles,

    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl ChartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChartError::InvalidTimeframeToken(_)
            | ChartError::TimeframeNotSupported { .. }
            | ChartError::RangeTooLarge { .. } => ErrorKind::BadRequest,
            ChartError::SymbolNotSupported { .. }
            | ChartError::EmptyRange { .. }
            | ChartError::BeforeDataFloor { .. }
            | ChartError::StartOutOfRange { .. }
            | ChartError::NoCandles => ErrorKind::NotFound,
            ChartError::Store(StoreError::InvalidSymbol(_)) => ErrorKind::NotFound,
            ChartError::Store(_) => ErrorKind::Internal,
        }
    }
}

impl From<TimeframeError> for ChartError {
    fn from(e: TimeframeError) -> Self {
        ChartError::InvalidTimeframeToken(e)
    }
}

impl From<EngineError> for ChartError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::TimeframeNotSupported { timeframe, .. } => {
                ChartError::TimeframeNotSupported { timeframe }
            }
        }
    }
}

/// Serves chart-ready candle series from a [`CandleStore`].
///
/// Holds no per-request state; every call reads and recomputes from scratch.
pub struct CandleService<S: ?Sized> {
    store: Arc<S>,
}

impl<S: ?Sized> Clone for CandleService<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: CandleStore + ?Sized> CandleService<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_symbol_supported(&self, symbol: &str) -> Result<bool, ChartError> {
        match self.store.is_symbol_supported(symbol) {
            Ok(supported) => Ok(supported),
            Err(StoreError::InvalidSymbol(_)) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Aggregated, gap-filled series for `symbol` over `[start, end)`.
    ///
    /// Every cheap check runs before storage is read. An empty result is an
    /// error, never an empty success.
    pub fn chart(&self, symbol: &str, req: &ChartRequest) -> Result<Vec<ChartPoint>, ChartError> {
        if !self.is_symbol_supported(symbol)? {
            return Err(ChartError::SymbolNotSupported {
                symbol: symbol.to_string(),
            });
        }

        if req.start >= req.end {
            return Err(ChartError::EmptyRange {
                start: req.start,
                end: req.end,
            });
        }

        let start_year = DateTime::<Utc>::from_timestamp_millis(req.start)
            .map(|t| t.year())
            .ok_or(ChartError::StartOutOfRange { start: req.start })?;
        if start_year < DATA_FLOOR_YEAR {
            return Err(ChartError::BeforeDataFloor { start: req.start });
        }

        if !req.timeframe.is_aggregatable() {
            return Err(ChartError::TimeframeNotSupported {
                timeframe: req.timeframe,
            });
        }

        if !is_within_max_count(req.end - req.start, req.timeframe) {
            return Err(ChartError::RangeTooLarge {
                timeframe: req.timeframe,
                limit: MAX_CANDLES,
            });
        }

        let raw = self.store.candles_in_range(req.start, req.end, symbol)?;
        let aggregated = aggregate(&raw, req.timeframe)?;
        let points = fill_gaps(aggregated, req.timeframe.duration_ms());

        tracing::debug!(
            symbol,
            store = self.store.name(),
            timeframe = %req.timeframe,
            raw = raw.len(),
            points = points.len(),
            "built chart series"
        );

        if points.is_empty() {
            return Err(ChartError::NoCandles);
        }
        Ok(points)
    }

    /// First and last stored time for a supported symbol.
    pub fn time_range(&self, symbol: &str) -> Result<(i64, i64), ChartError> {
        if !self.is_symbol_supported(symbol)? {
            return Err(ChartError::SymbolNotSupported {
                symbol: symbol.to_string(),
            });
        }
        self.store.time_range(symbol)?.ok_or(ChartError::NoCandles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryStore;
    use crate::domain::Candle;

    // 2024-01-01T00:00:00Z
    const T0: i64 = 1_704_067_200_000;

    fn service() -> CandleService<MemoryStore> {
        let candles = [0, 15_000, 30_000, 45_000, 60_000, 240_000, 255_000]
            .into_iter()
            .map(|dt| Candle::new(T0 + dt, 1.0, 2.0, 0.5, 1.5, 10.0))
            .collect();
        let store = MemoryStore::new().with_series("ES", candles).unwrap();
        CandleService::new(Arc::new(store))
    }

    #[test]
    fn builds_gap_filled_minute_series() {
        let points = service()
            .chart("ES", &ChartRequest::new(T0, T0 + 300_000, Timeframe::M1))
            .unwrap();

        let times: Vec<i64> = points.iter().map(|p| p.time() - T0).collect();
        assert_eq!(times, vec![0, 60_000, 120_000, 180_000, 240_000]);
        assert_eq!(points[0].as_candle().unwrap().volume, 40.0);
        assert!(points[2].is_blank());
        assert_eq!(points[4].as_candle().unwrap().volume, 20.0);
    }

    #[test]
    fn unknown_symbol_is_not_found() {
        let err = service()
            .chart("NQ", &ChartRequest::new(T0, T0 + 60_000, Timeframe::M1))
            .unwrap_err();
        assert!(matches!(err, ChartError::SymbolNotSupported { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = service()
            .chart("bad name", &ChartRequest::new(T0, T0 + 60_000, Timeframe::M1))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn inverted_or_empty_range_is_not_found() {
        let err = service()
            .chart("ES", &ChartRequest::new(T0, T0, Timeframe::M1))
            .unwrap_err();
        assert!(matches!(err, ChartError::EmptyRange { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn start_before_floor_is_not_found() {
        // 2009-12-31T23:59:59Z
        let start = 1_262_303_999_000;
        let err = service()
            .chart("ES", &ChartRequest::new(start, start + 60_000, Timeframe::M1))
            .unwrap_err();
        assert!(matches!(err, ChartError::BeforeDataFloor { .. }));
    }

    #[test]
    fn start_beyond_calendar_is_not_found() {
        let start = 9_000_000_000_000_000;
        let err = service()
            .chart("ES", &ChartRequest::new(start, start + 60_000, Timeframe::M1))
            .unwrap_err();
        assert!(matches!(err, ChartError::StartOutOfRange { .. }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.to_string(), "Start timestamp out of range");
    }

    #[test]
    fn oversized_range_is_bad_request() {
        let end = T0 + MAX_CANDLES * Timeframe::M1.duration_ms();
        let err = service()
            .chart("ES", &ChartRequest::new(T0, end, Timeframe::M1))
            .unwrap_err();
        assert!(matches!(err, ChartError::RangeTooLarge { .. }));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn finer_than_native_is_bad_request() {
        let err = service()
            .chart("ES", &ChartRequest::new(T0, T0 + 60_000, Timeframe::S5))
            .unwrap_err();
        assert!(matches!(
            err,
            ChartError::TimeframeNotSupported {
                timeframe: Timeframe::S5
            }
        ));
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn single_bucket_result_is_reported_as_no_candles() {
        let err = service()
            .chart("ES", &ChartRequest::new(T0, T0 + 60_000, Timeframe::M1))
            .unwrap_err();
        assert!(matches!(err, ChartError::NoCandles));
    }

    #[test]
    fn range_with_no_rows_is_no_candles() {
        let start = T0 + 86_400_000;
        let err = service()
            .chart("ES", &ChartRequest::new(start, start + 60_000, Timeframe::S15))
            .unwrap_err();
        assert!(matches!(err, ChartError::NoCandles));
    }

    #[test]
    fn time_range_of_series() {
        assert_eq!(service().time_range("ES").unwrap(), (T0, T0 + 255_000));
        assert!(service().time_range("NQ").is_err());
    }

    #[test]
    fn request_defaults_to_native_timeframe() {
        let req: ChartRequest = serde_json::from_str(r#"{"start":1,"end":2}"#).unwrap();
        assert_eq!(req.timeframe, Timeframe::S15);
    }
}
