//! Server lifecycle: router assembly, binding, and graceful shutdown.

use crate::config::{ConfigError, ServerConfig};
use crate::routes;
use crate::state::AppState;
use axum::http::{header, Method};
use axum::Router;
use journal_core::data::{CandleStore, ParquetStore};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Build the application with all routes and middleware.
pub fn build_app(state: Arc<AppState>, config: &ServerConfig) -> Result<Router, ConfigError> {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.origin_headers()?))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Ok(routes::create_router(state)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http()))
}

/// Serve candles from the Parquet store in `config.data_dir`.
///
/// Blocks until ctrl-c.
pub async fn serve(config: ServerConfig) -> Result<(), ServerError> {
    let store = ParquetStore::new(config.data_dir.clone());
    serve_with_store(config, Arc::new(store)).await
}

pub async fn serve_with_store(
    config: ServerConfig,
    store: Arc<dyn CandleStore>,
) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;
    let store_name = store.name().to_string();
    let app = build_app(Arc::new(AppState::new(store)), &config)?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.to_string(),
            source,
        })?;

    tracing::info!(
        %addr,
        store = %store_name,
        data_dir = %config.data_dir.display(),
        "journal server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("journal server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
