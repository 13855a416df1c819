use std::sync::Arc;

use flexi_core::store::{self, KeyValueStore, keys};

pub const DEFAULT_SEARCH_HISTORY_LIMIT: usize = 10;

/// Most-recent-first list of distinct job searches.
pub struct SearchHistory {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
}

impl SearchHistory {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self { store, limit }
    }

    /// Saved terms, newest first; a corrupt value reads as empty.
    pub async fn entries(&self) -> Vec<String> {
        match store::load_json::<Vec<String>>(self.store.as_ref(), keys::SEARCH_HISTORY).await {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                tracing::debug!("[SearchHistory] Ignoring unreadable history: {}", e);
                Vec::new()
            }
        }
    }

    /// Moves `term` to the front. Blank terms are ignored.
    pub async fn record(&self, term: &str) {
        if term.trim().is_empty() {
            return;
        }

        let mut entries = self.entries().await;
        entries.retain(|existing| existing != term);
        entries.insert(0, term.to_string());
        entries.truncate(self.limit);

        if let Err(e) = store::save_json(self.store.as_ref(), keys::SEARCH_HISTORY, &entries).await {
            tracing::warn!("[SearchHistory] Failed to persist history: {}", e);
        }
    }

    pub async fn clear(&self) {
        if let Err(e) = self.store.remove(keys::SEARCH_HISTORY).await {
            tracing::warn!("[SearchHistory] Failed to clear history: {}", e);
        }
    }
}
