use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use journal_core::engine::{ChartError, ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON body of every non-data response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request body or parameters.
    #[error("{0}")]
    BadRequest(String),

    #[error("Symbol is not supported")]
    NotSupported,

    #[error(transparent)]
    Chart(#[from] ChartError),

    #[error("blocking task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotSupported => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Chart(e) => match e.kind() {
                ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
            self.to_string()
        };
        (status, Json(MessageBody { message })).into_response()
    }
}
