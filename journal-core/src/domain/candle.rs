//! Candle: the fundamental market data unit.

use serde::{Deserialize, Serialize};

/// OHLCV candle for a single time bucket.
///
/// `time` is the bucket start in milliseconds since the Unix epoch. Candles read
/// from storage sit on the 15-second native grid; aggregated candles sit on the
/// grid of their target timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: low <= open, close <= high and volume >= 0.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= 0.0
    }

    /// Fold a later candle of the same bucket into this one.
    ///
    /// Open is first-write-wins, close is last-write-wins.
    pub fn merge(&mut self, later: &Candle) {
        self.high = self.high.max(later.high);
        self.low = self.low.min(later.low);
        self.close = later.close;
        self.volume += later.volume;
    }
}

/// One entry of a chart-ready series.
///
/// A `Blank` marks a bucket with no data. It carries only its time so the chart
/// renderer can show a hole instead of invented prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChartPoint {
    Candle(Candle),
    Blank { time: i64 },
}

impl ChartPoint {
    pub fn time(&self) -> i64 {
        match self {
            ChartPoint::Candle(c) => c.time,
            ChartPoint::Blank { time } => *time,
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, ChartPoint::Blank { .. })
    }

    pub fn as_candle(&self) -> Option<&Candle> {
        match self {
            ChartPoint::Candle(c) => Some(c),
            ChartPoint::Blank { .. } => None,
        }
    }
}

impl From<Candle> for ChartPoint {
    fn from(candle: Candle) -> Self {
        ChartPoint::Candle(candle)
    }
}
