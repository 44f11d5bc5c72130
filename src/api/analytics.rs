//! Analytics API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use super::handlers::{error_response, ApiError, AppState};
use crate::models::AnalyticsEvent;
use crate::storage::StorageError;

/// All recorded visits for a short code, in the order they happened
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Path(short_code): Path<String>,
) -> Result<Json<Vec<AnalyticsEvent>>, ApiError> {
    match state.storage.get_analytics(&short_code).await {
        Ok(events) => Ok(Json(events)),
        Err(StorageError::NotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "No analytics data found for the given short code",
        )),
        Err(e) => {
            tracing::error!("Failed to get analytics: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to retrieve analytics",
            ))
        }
    }
}
