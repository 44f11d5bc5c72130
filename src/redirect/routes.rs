use axum::{routing::get, Router};
use std::sync::Arc;

use crate::config::Config;
use crate::storage::Storage;

use super::handlers::{redirect_url, RedirectState};

pub fn create_redirect_router(storage: Arc<dyn Storage>, config: &Config) -> Router {
    let state = Arc::new(RedirectState {
        storage,
        analytics_config: config.analytics.clone(),
        redirect_mode: config.redirect_status,
    });

    Router::new()
        .route("/{code}", get(redirect_url))
        .with_state(state)
}
