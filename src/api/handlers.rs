use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderValue, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::{ShortenRequest, ShortenResponse};
use crate::storage::Storage;

pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<Config>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn error_response(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// Plain-text banner served at `/`
pub async fn welcome() -> &'static str {
    "Welcome to the URL Shortener Service"
}

/// `GET /shorten` is not a short code either
pub async fn shorten_not_found() -> ApiError {
    error_response(StatusCode::NOT_FOUND, "Short URL not found")
}

/// Create (or look up) the short URL for a long one.
///
/// The body is parsed as JSON regardless of the Content-Type header. A
/// missing `original_url` is treated as the empty URL.
pub async fn shorten_url(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ShortenResponse>, ApiError> {
    let payload: ShortenRequest = serde_json::from_slice(&body).map_err(|e| {
        warn!(error = %e, "rejected shorten request body");
        error_response(StatusCode::BAD_REQUEST, "Invalid JSON payload")
    })?;

    // The URL ends up verbatim in a Location header
    if HeaderValue::from_bytes(payload.original_url.as_bytes()).is_err() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "original_url contains characters not allowed in a redirect",
        ));
    }

    match state.storage.create(&payload.original_url).await {
        Ok(mapping) => {
            info!(short_code = %mapping.short_code, "shortened URL");
            Ok(Json(ShortenResponse {
                short_url: state.config.short_url(&mapping.short_code),
            }))
        }
        Err(e) => {
            error!(error = %e, "failed to shorten URL");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to shorten URL: {}", e),
            ))
        }
    }
}
