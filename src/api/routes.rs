use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::config::Config;
use crate::storage::Storage;

use super::analytics::get_analytics;
use super::handlers::{shorten_not_found, shorten_url, welcome, AppState};

pub fn create_api_router(storage: Arc<dyn Storage>, config: Arc<Config>) -> Router {
    let state = Arc::new(AppState { storage, config });

    Router::new()
        .route("/", get(welcome))
        .route("/shorten", post(shorten_url).get(shorten_not_found))
        .route("/analytics/{code}", get(get_analytics))
        .with_state(state)
}
