use crate::error::MessageBody;
use crate::state::AppState;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

pub mod candles;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .nest("/candles", candles::routes())
        .with_state(state)
}

async fn ping() -> Json<MessageBody> {
    Json(MessageBody::new("pong"))
}
