//! Journal Server: HTTP surface for the chart candle engine.
//!
//! Routes:
//! - `POST /candles/:symbol` aggregated, gap-filled series for a range
//! - `GET /candles/supported/:symbol` whether a symbol has stored candles
//! - `GET /candles/range/:symbol` first and last stored candle time
//! - `GET /ping` liveness
//!
//! Every failure body is `{ "message": String }`.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;
pub mod state;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use server::{build_app, serve, serve_with_store, ServerError};
pub use state::AppState;
