//! In-memory candle store.

use super::store::{snap_to_native, validate_symbol, CandleStore, StoreError};
use crate::domain::Candle;
use std::collections::BTreeMap;

/// Candle series held in memory, keyed by symbol.
///
/// Series are sorted on insert, so reads need no further ordering.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    series: BTreeMap<String, Vec<Candle>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the series for `symbol`.
    pub fn insert(&mut self, symbol: &str, mut candles: Vec<Candle>) -> Result<(), StoreError> {
        validate_symbol(symbol)?;
        candles.sort_by_key(|c| c.time);
        self.series.insert(symbol.to_string(), candles);
        Ok(())
    }

    /// Builder-style [`MemoryStore::insert`].
    pub fn with_series(mut self, symbol: &str, candles: Vec<Candle>) -> Result<Self, StoreError> {
        self.insert(symbol, candles)?;
        Ok(self)
    }

    pub fn symbols(&self) -> Vec<&str> {
        self.series.keys().map(|s| s.as_str()).collect()
    }
}

impl CandleStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn is_symbol_supported(&self, symbol: &str) -> Result<bool, StoreError> {
        validate_symbol(symbol)?;
        Ok(self.series.contains_key(symbol))
    }

    fn candles_in_range(
        &self,
        start_ms: i64,
        end_ms: i64,
        symbol: &str,
    ) -> Result<Vec<Candle>, StoreError> {
        validate_symbol(symbol)?;
        let series = self.series.get(symbol).ok_or_else(|| StoreError::NoData {
            symbol: symbol.to_string(),
        })?;

        let start = snap_to_native(start_ms);
        let from = series.partition_point(|c| c.time < start);
        let to = series.partition_point(|c| c.time < end_ms);

        Ok(series[from..to.max(from)].to_vec())
    }

    fn time_range(&self, symbol: &str) -> Result<Option<(i64, i64)>, StoreError> {
        validate_symbol(symbol)?;
        Ok(self
            .series
            .get(symbol)
            .and_then(|s| Some((s.first()?.time, s.last()?.time))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> Vec<Candle> {
        [45_000, 0, 30_000, 15_000]
            .into_iter()
            .map(|t| Candle::new(t, 1.0, 2.0, 0.5, 1.5, 10.0))
            .collect()
    }

    #[test]
    fn insert_sorts_and_range_filters() {
        let store = MemoryStore::new().with_series("ES", series()).unwrap();

        let all = store.candles_in_range(0, 60_000, "ES").unwrap();
        assert_eq!(all.iter().map(|c| c.time).collect::<Vec<_>>(), vec![0, 15_000, 30_000, 45_000]);

        // Start snaps down to 15_000, end is exclusive.
        let mid = store.candles_in_range(20_000, 45_000, "ES").unwrap();
        assert_eq!(mid.iter().map(|c| c.time).collect::<Vec<_>>(), vec![15_000, 30_000]);
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = MemoryStore::new().with_series("ES", series()).unwrap();
        assert!(store.candles_in_range(45_000, 0, "ES").unwrap().is_empty());
    }

    #[test]
    fn support_and_time_range() {
        let store = MemoryStore::new().with_series("ES", series()).unwrap();
        assert!(store.is_symbol_supported("ES").unwrap());
        assert!(!store.is_symbol_supported("NQ").unwrap());
        assert_eq!(store.time_range("ES").unwrap(), Some((0, 45_000)));
        assert_eq!(store.time_range("NQ").unwrap(), None);
        assert!(store.is_symbol_supported("bad name").is_err());
    }

    #[test]
    fn missing_symbol_has_no_data() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.candles_in_range(0, 1, "ES"),
            Err(StoreError::NoData { .. })
        ));
    }
}
