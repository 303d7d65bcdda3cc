//! Gap detection and blank insertion for aggregated series.

use crate::domain::{Candle, ChartPoint};

/// Insert a [`ChartPoint::Blank`] for every missing bucket between consecutive
/// candles.
///
/// A gap exists when two neighbours are more than `frame_ms` apart; it is filled
/// with `floor(diff / frame_ms) - 1` blanks at `prev.time + k * frame_ms`.
///
/// Fewer than two candles yield an empty series, including the single-candle
/// case. Callers treat an empty series as "no data". A `frame_ms` that is not
/// positive has no buckets to fill and also yields an empty series.
pub fn fill_gaps(candles: Vec<Candle>, frame_ms: i64) -> Vec<ChartPoint> {
    if frame_ms <= 0 {
        tracing::warn!(frame_ms, "rejected non-positive gap-fill frame");
        return Vec::new();
    }
    if candles.len() < 2 {
        return Vec::new();
    }

    let mut out = Vec::with_capacity(candles.len());
    let mut blanks = 0usize;
    let mut prev: Option<i64> = None;

    for candle in candles {
        if let Some(prev_time) = prev {
            let diff = candle.time - prev_time;
            if diff > frame_ms {
                let missing = diff / frame_ms - 1;
                out.extend((1..=missing).map(|k| ChartPoint::Blank {
                    time: prev_time + k * frame_ms,
                }));
                blanks += missing as usize;
            }
        }
        prev = Some(candle.time);
        out.push(ChartPoint::Candle(candle));
    }

    if blanks > 0 {
        tracing::trace!(blanks, total = out.len(), "filled gaps");
    }

    out
}
