use axum::{
    extract::{ConnectInfo, Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::net::SocketAddr;
use std::sync::Arc;

use crate::analytics::resolve_client_address;
use crate::api::ErrorResponse;
use crate::config::{AnalyticsConfig, RedirectMode};
use crate::models::AnalyticsEvent;
use crate::storage::{Storage, StorageError};

pub struct RedirectState {
    pub storage: Arc<dyn Storage>,
    pub analytics_config: AnalyticsConfig,
    pub redirect_mode: RedirectMode,
}

/// Redirect to original URL, recording the visit
pub async fn redirect_url(
    State(state): State<Arc<RedirectState>>,
    Path(code): Path<String>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Response {
    let ip_address = resolve_client_address(&headers, addr, &state.analytics_config);
    let event = AnalyticsEvent::new(ip_address);

    let url = match state.storage.record_visit(&code, event).await {
        Ok(url) => url,
        Err(StorageError::NotFound) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse {
                    error: "Short URL not found".to_string(),
                }),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(short_code = %code, error = %e, "failed to record visit");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    let location = match HeaderValue::from_bytes(url.original_url.as_bytes()) {
        Ok(location) => location,
        Err(e) => {
            tracing::error!(short_code = %code, error = %e, "stored URL is not a valid Location header");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };

    tracing::debug!(short_code = %code, target = %url.original_url, "redirecting");

    (state.redirect_mode.status_code(), [(header::LOCATION, location)]).into_response()
}
