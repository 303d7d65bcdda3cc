// Candle chart routes

use crate::error::{ApiError, MessageBody};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use journal_core::domain::{ChartPoint, Timeframe};
use journal_core::engine::{ChartError, ChartRequest};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ==================== Request / Response Types ====================

/// Millisecond timestamp sent either as a JSON number or a numeric string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Millis {
    Int(i64),
    Text(String),
}

impl Millis {
    fn value(&self, field: &str) -> Result<i64, ApiError> {
        match self {
            Millis::Int(ms) => Ok(*ms),
            Millis::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ApiError::BadRequest(format!("Invalid {field} timestamp"))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartBody {
    pub start: Millis,
    pub end: Millis,
    #[serde(default)]
    pub timeframe: Option<String>,
}

impl ChartBody {
    /// Parse into a request; an omitted timeframe means the native `15s`.
    pub fn to_request(&self) -> Result<ChartRequest, ApiError> {
        let timeframe = match self.timeframe.as_deref() {
            Some(token) => token
                .parse::<Timeframe>()
                .map_err(ChartError::InvalidTimeframeToken)?,
            None => Timeframe::default(),
        };
        Ok(ChartRequest::new(
            self.start.value("start")?,
            self.end.value("end")?,
            timeframe,
        ))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CandlesResponse {
    pub candles: Vec<ChartPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RangeResponse {
    pub start: i64,
    pub end: i64,
}

// ==================== Routes ====================

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/supported/:symbol", get(supported_handler))
        .route("/range/:symbol", get(range_handler))
        .route("/:symbol", post(chart_handler))
}

// ==================== Handlers ====================

async fn chart_handler(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    body: Result<Json<ChartBody>, JsonRejection>,
) -> Result<Json<CandlesResponse>, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let req = body.to_request()?;

    let service = state.candles.clone();
    let candles = tokio::task::spawn_blocking(move || service.chart(&symbol, &req)).await??;

    Ok(Json(CandlesResponse { candles }))
}

async fn supported_handler(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<MessageBody>, ApiError> {
    let service = state.candles.clone();
    let supported = tokio::task::spawn_blocking(move || service.is_symbol_supported(&symbol)).await??;

    if supported {
        Ok(Json(MessageBody::new("Symbol is supported")))
    } else {
        Err(ApiError::NotSupported)
    }
}

async fn range_handler(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<RangeResponse>, ApiError> {
    let service = state.candles.clone();
    let (start, end) = tokio::task::spawn_blocking(move || service.time_range(&symbol)).await??;

    Ok(Json(RangeResponse { start, end }))
}
