//! Domain types for the candle engine

pub mod candle;
pub mod timeframe;

pub use candle::{Candle, ChartPoint};
pub use timeframe::{
    duration_of, is_within_max_count, token_of, Timeframe, TimeframeError, MAX_CANDLES,
    NATIVE_FRAME_MS,
};
