use crate::models::{AnalyticsEvent, UrlMapping};
use crate::shortener::CodeSpaceExhausted;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("short code not found")]
    NotFound,
    #[error(transparent)]
    CodeSpaceExhausted(#[from] CodeSpaceExhausted),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Mapping and analytics store shared by all handlers.
///
/// Each method is one atomic unit: implementations must not let another
/// caller observe state between the steps of a single call.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Generate a unique short code for the URL and store the mapping.
    /// Shortening a URL that is already stored returns the existing mapping.
    async fn create(&self, original_url: &str) -> StorageResult<UrlMapping>;

    /// Get a mapping by short code
    async fn get(&self, short_code: &str) -> StorageResult<UrlMapping>;

    /// Look up the mapping and append the visit to its analytics.
    /// Unknown codes yield `NotFound` and record nothing.
    async fn record_visit(
        &self,
        short_code: &str,
        event: AnalyticsEvent,
    ) -> StorageResult<UrlMapping>;

    /// All recorded visits for a short code, oldest first
    async fn get_analytics(&self, short_code: &str) -> StorageResult<Vec<AnalyticsEvent>>;
}
