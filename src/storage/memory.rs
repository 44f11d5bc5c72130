use crate::models::{AnalyticsEvent, UrlMapping};
use crate::shortener::generate_unique_short_code;
use crate::storage::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Both maps, always accessed through the single lock in [`MemoryStorage`]
#[derive(Debug, Default)]
struct Tables {
    urls: HashMap<String, UrlMapping>,
    analytics: HashMap<String, Vec<AnalyticsEvent>>,
}

impl Tables {
    /// Insert or overwrite the mapping for `short_code`
    fn put(&mut self, short_code: &str, original_url: &str) -> UrlMapping {
        let mapping = UrlMapping {
            short_code: short_code.to_string(),
            original_url: original_url.to_string(),
        };
        self.urls.insert(short_code.to_string(), mapping.clone());
        mapping
    }

    fn get(&self, short_code: &str) -> StorageResult<&UrlMapping> {
        self.urls.get(short_code).ok_or(StorageError::NotFound)
    }

    fn exists(&self, short_code: &str) -> bool {
        self.urls.contains_key(short_code)
    }

    fn append_analytics(&mut self, short_code: &str, event: AnalyticsEvent) {
        self.analytics
            .entry(short_code.to_string())
            .or_default()
            .push(event);
    }

    fn get_analytics(&self, short_code: &str) -> StorageResult<&[AnalyticsEvent]> {
        self.analytics
            .get(short_code)
            .map(Vec::as_slice)
            .ok_or(StorageError::NotFound)
    }
}

/// Volatile in-process storage. Everything is lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings
    pub async fn mapping_count(&self) -> usize {
        self.tables.lock().await.urls.len()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create(&self, original_url: &str) -> StorageResult<UrlMapping> {
        let mut tables = self.tables.lock().await;

        let short_code = generate_unique_short_code(original_url, |code| {
            tables.exists(code)
                && tables
                    .get(code)
                    .is_ok_and(|mapping| mapping.original_url != original_url)
        })?;

        if tables.exists(&short_code) {
            debug!(short_code = %short_code, "URL already shortened, reusing mapping");
        }

        let mapping = tables.put(&short_code, original_url);
        debug!(
            short_code = %mapping.short_code,
            total = tables.urls.len(),
            "stored mapping"
        );

        Ok(mapping)
    }

    async fn get(&self, short_code: &str) -> StorageResult<UrlMapping> {
        let tables = self.tables.lock().await;
        tables.get(short_code).cloned()
    }

    async fn record_visit(
        &self,
        short_code: &str,
        event: AnalyticsEvent,
    ) -> StorageResult<UrlMapping> {
        let mut tables = self.tables.lock().await;
        let mapping = tables.get(short_code)?.clone();
        tables.append_analytics(short_code, event);
        Ok(mapping)
    }

    async fn get_analytics(&self, short_code: &str) -> StorageResult<Vec<AnalyticsEvent>> {
        let tables = self.tables.lock().await;
        tables.get_analytics(short_code).map(<[AnalyticsEvent]>::to_vec)
    }
}
