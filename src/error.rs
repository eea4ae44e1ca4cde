//! Error taxonomy shared by the resolver, the audio fetcher, the batch
//! orchestrator and the HTTP layer.
//!
//! Every failure the backend can report maps to one [`AppError`] variant.
//! Handlers return `Result<_, AppError>` and rely on the [`IntoResponse`]
//! implementation to turn the error into a structured JSON body of the
//! shape `{ "error": "<message>" }` with a matching status code.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Credential acquisition failed (unreachable endpoint, non-2xx, missing token).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The Spotify Web API could not be reached or answered with a non-success status.
    #[error("spotify api returned {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The Spotify Web API answered with a body of unexpected shape.
    #[error("malformed response from spotify: {0}")]
    MalformedResponse(String),

    /// No audio source matched the query.
    #[error("no audio found: {0}")]
    NotFound(String),

    /// The search tool could not be run or exited unsuccessfully.
    #[error("search failed: {0}")]
    Search(String),

    /// The download/transcode step failed or produced no output.
    #[error("transcode failed: {0}")]
    Transcode(String),

    /// Unrecognised URL, empty query or empty batch.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl AppError {
    /// HTTP status the backend answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Auth(_) | AppError::Upstream { .. } | AppError::MalformedResponse(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Search(_) | AppError::Transcode(_) | AppError::Io(_) | AppError::Http(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (self.status_code(), body).into_response()
    }
}
