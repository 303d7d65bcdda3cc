//! Timeframe tokens and their millisecond durations.
//!
//! The canonical set is closed: seventeen tokens from `1s` to `1w`, each with an
//! exact duration. The table is explicit rather than parsed from the token text,
//! so `1d` and `1w` are plain entries like the rest.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Resolution of the persisted candle store, in milliseconds.
pub const NATIVE_FRAME_MS: i64 = 15_000;

/// Largest number of candles a single chart request may span.
pub const MAX_CANDLES: i64 = 25_000;

/// A canonical chart timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "1s")]
    S1,
    #[serde(rename = "5s")]
    S5,
    #[serde(rename = "15s")]
    S15,
    #[serde(rename = "30s")]
    S30,
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "2m")]
    M2,
    #[serde(rename = "3m")]
    M3,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "10m")]
    M10,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "2h")]
    H2,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "6h")]
    H6,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1w")]
    W1,
}

impl Timeframe {
    /// All canonical timeframes, ascending by duration.
    pub const ALL: [Timeframe; 17] = [
        Timeframe::S1,
        Timeframe::S5,
        Timeframe::S15,
        Timeframe::S30,
        Timeframe::M1,
        Timeframe::M2,
        Timeframe::M3,
        Timeframe::M5,
        Timeframe::M10,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H2,
        Timeframe::H4,
        Timeframe::H6,
        Timeframe::D1,
        Timeframe::W1,
    ];

    /// Exact bucket duration in milliseconds.
    pub const fn duration_ms(self) -> i64 {
        match self {
            Timeframe::S1 => 1_000,
            Timeframe::S5 => 5_000,
            Timeframe::S15 => 15_000,
            Timeframe::S30 => 30_000,
            Timeframe::M1 => 60_000,
            Timeframe::M2 => 120_000,
            Timeframe::M3 => 180_000,
            Timeframe::M5 => 300_000,
            Timeframe::M10 => 600_000,
            Timeframe::M15 => 900_000,
            Timeframe::M30 => 1_800_000,
            Timeframe::H1 => 3_600_000,
            Timeframe::H2 => 7_200_000,
            Timeframe::H4 => 14_400_000,
            Timeframe::H6 => 21_600_000,
            Timeframe::D1 => 86_400_000,
            Timeframe::W1 => 604_800_000,
        }
    }

    /// Canonical token, e.g. `"15m"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Timeframe::S1 => "1s",
            Timeframe::S5 => "5s",
            Timeframe::S15 => "15s",
            Timeframe::S30 => "30s",
            Timeframe::M1 => "1m",
            Timeframe::M2 => "2m",
            Timeframe::M3 => "3m",
            Timeframe::M5 => "5m",
            Timeframe::M10 => "10m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::H6 => "6h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
        }
    }

    /// Start of the bucket containing `time_ms`.
    ///
    /// Uses floor division, so times before the epoch snap downwards too.
    pub fn align(self, time_ms: i64) -> i64 {
        let frame = self.duration_ms();
        time_ms.div_euclid(frame) * frame
    }

    /// Whether this timeframe is at least as coarse as the stored resolution.
    pub const fn is_aggregatable(self) -> bool {
        self.duration_ms() >= NATIVE_FRAME_MS
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::S15
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = TimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| TimeframeError::InvalidToken(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeframeError {
    #[error("invalid timeframe token '{0}'")]
    InvalidToken(String),

    #[error("{0} ms is not a supported timeframe")]
    NotSupportedTimeframe(i64),
}

/// Duration in milliseconds of a canonical timeframe token.
pub fn duration_of(token: &str) -> Result<i64, TimeframeError> {
    token.parse::<Timeframe>().map(Timeframe::duration_ms)
}

/// Canonical timeframe whose duration is exactly `duration_ms`.
pub fn token_of(duration_ms: i64) -> Result<Timeframe, TimeframeError> {
    Timeframe::ALL
        .into_iter()
        .find(|tf| tf.duration_ms() == duration_ms)
        .ok_or(TimeframeError::NotSupportedTimeframe(duration_ms))
}

/// Whether a range of `range_ms` spans fewer than [`MAX_CANDLES`] buckets.
///
/// Equivalent to `range_ms / duration < MAX_CANDLES` in exact arithmetic.
pub fn is_within_max_count(range_ms: i64, timeframe: Timeframe) -> bool {
    range_ms < MAX_CANDLES * timeframe.duration_ms()
}
