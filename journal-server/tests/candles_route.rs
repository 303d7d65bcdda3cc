//! Route tests driven through the full router with an in-memory store.

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use journal_core::data::{synthetic_candles, MemoryStore};
use journal_core::domain::Candle;
use journal_server::{build_app, AppState, ServerConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

// 2024-01-01T00:00:00Z
const T0: i64 = 1_704_067_200_000;

fn native(offset: i64, o: f64, h: f64, l: f64, c: f64, v: f64) -> Candle {
    Candle::new(T0 + offset, o, h, l, c, v)
}

fn app() -> Router {
    let es = vec![
        native(0, 1.0, 2.0, 0.0, 1.0, 10.0),
        native(15_000, 1.0, 3.0, 1.0, 2.0, 10.0),
        native(30_000, 2.0, 2.0, 1.0, 1.0, 10.0),
        native(45_000, 1.0, 2.0, 0.0, 2.0, 10.0),
        native(60_000, 2.0, 2.0, 2.0, 2.0, 1.0),
        native(240_000, 3.0, 3.0, 3.0, 3.0, 1.0),
    ];
    let store = MemoryStore::new()
        .with_series("ES", es)
        .unwrap()
        .with_series("NQ", synthetic_candles(T0, 100, 9, 16_000.0))
        .unwrap();
    build_app(
        Arc::new(AppState::new(Arc::new(store))),
        &ServerConfig::default(),
    )
    .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_chart(symbol: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/candles/{symbol}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app(), request).await
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app(), request).await
}

#[tokio::test]
async fn chart_returns_aggregated_filled_candles() {
    let (status, body) = post_chart(
        "ES",
        json!({ "start": T0, "end": (T0 + 300_000).to_string(), "timeframe": "1m" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let candles = body["candles"].as_array().unwrap();
    assert_eq!(candles.len(), 5);
    assert_eq!(
        candles[0],
        json!({ "time": T0, "open": 1.0, "high": 3.0, "low": 0.0, "close": 2.0, "volume": 40.0 })
    );
    assert_eq!(candles[2], json!({ "time": T0 + 120_000 }));
    assert_eq!(candles[3], json!({ "time": T0 + 180_000 }));
    assert_eq!(candles[4]["close"], json!(3.0));
}

#[tokio::test]
async fn omitted_timeframe_serves_native_candles() {
    let (status, body) = post_chart("NQ", json!({ "start": T0, "end": T0 + 1_500_000 })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["candles"].as_array().unwrap().len(), 100);
}

#[tokio::test]
async fn bad_timeframe_is_400() {
    let (status, body) =
        post_chart("ES", json!({ "start": T0, "end": T0 + 60_000, "timeframe": "7m" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "message": "Bad timeframe input!" }));
}

#[tokio::test]
async fn sub_native_timeframe_is_400() {
    let (status, _) =
        post_chart("ES", json!({ "start": T0, "end": T0 + 60_000, "timeframe": "5s" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_range_is_400() {
    let (status, body) = post_chart(
        "ES",
        json!({ "start": T0, "end": T0 + 25_000 * 60_000, "timeframe": "1m" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("25000"));
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (status, body) = post_chart("ES", json!({ "start": "soon", "end": T0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid start timestamp");

    let (status, body) = post_chart("ES", json!({ "end": T0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn unknown_symbol_is_404() {
    let (status, body) = post_chart("GC", json!({ "start": T0, "end": T0 + 60_000 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "Symbol not supported!" }));
}

#[tokio::test]
async fn empty_range_is_404() {
    let (status, _) = post_chart("ES", json!({ "start": T0, "end": T0 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn range_before_2010_is_404() {
    let (status, body) = post_chart(
        "ES",
        json!({ "start": 1_230_768_000_000_i64, "end": 1_230_768_060_000_i64 }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No data before 2010");
}

#[tokio::test]
async fn range_without_candles_is_404() {
    let (status, body) = post_chart(
        "ES",
        json!({ "start": T0 + 3_600_000, "end": T0 + 7_200_000, "timeframe": "1m" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "message": "No candles found for range" }));
}

#[tokio::test]
async fn supported_symbol_check() {
    let (status, body) = get("/candles/supported/ES").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Symbol is supported" }));

    let (status, body) = get("/candles/supported/GC").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body, json!({ "message": "Symbol is not supported" }));

    let (status, _) = get("/candles/supported/bad-name").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn stored_range() {
    let (status, body) = get("/candles/range/ES").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "start": T0, "end": T0 + 240_000 }));

    let (status, _) = get("/candles/range/GC").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ping() {
    let (status, body) = get("/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "pong" }));
}

#[tokio::test]
async fn cors_allows_dev_origin() {
    let request = Request::builder()
        .uri("/ping")
        .header(header::ORIGIN, "http://localhost:5173")
        .body(Body::empty())
        .unwrap();
    let response = app().oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
}
