//! Streaming OHLCV aggregation into a coarser timeframe.

use super::EngineError;
use crate::domain::{Candle, Timeframe, NATIVE_FRAME_MS};

/// Re-bucket ascending native candles into `timeframe`.
///
/// One forward pass. Each output candle opens with a copy of the first input
/// candle of its bucket (time snapped to the bucket start) and absorbs the rest
/// of that bucket through [`Candle::merge`]. Input order is trusted: candles out
/// of order produce merges that are not meaningful.
pub fn aggregate(candles: &[Candle], timeframe: Timeframe) -> Result<Vec<Candle>, EngineError> {
    let frame = timeframe.duration_ms();
    if frame < NATIVE_FRAME_MS {
        return Err(EngineError::TimeframeNotSupported {
            timeframe,
            native_ms: NATIVE_FRAME_MS,
        });
    }

    let mut out: Vec<Candle> = Vec::new();
    let mut bucket: Option<i64> = None;

    for candle in candles {
        let current = candle.time.div_euclid(frame);

        if bucket == Some(current) {
            if let Some(last) = out.last_mut() {
                last.merge(candle);
                continue;
            }
        }

        out.push(Candle {
            time: current * frame,
            ..*candle
        });
        bucket = Some(current);
    }

    tracing::trace!(
        input = candles.len(),
        output = out.len(),
        %timeframe,
        "aggregated candles"
    );

    Ok(out)
}
