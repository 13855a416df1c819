//! Persisted key-value store trait.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{FlexiError, Result};

/// Well-known keys of the persisted store.
pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const USER: &str = "user";
    pub const THEME: &str = "theme";
    pub const SEARCH_HISTORY: &str = "search_history";
    /// Prefix of auto-saved form drafts (`draft:<form>`).
    pub const DRAFT_PREFIX: &str = "draft:";
}

/// String-keyed storage that survives process restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes `key`; removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

/// Reads `key` and decodes it as JSON.
///
/// A stored value that no longer decodes is reported as an error so callers
/// can decide whether to fall back to a default.
pub async fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encodes `value` as JSON and stores it under `key`.
pub async fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<()> {
    store.set(key, serde_json::to_string(value)?).await
}

/// Process-local store; nothing survives a restart.
///
/// Used for `--ephemeral` runs and as the store of unit tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
        }
    }

    /// Synchronous peek, for assertions.
    pub fn value(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|e| FlexiError::internal(format!("memory store poisoned: {e}")))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq, serde::Deserialize, Serialize)]
    struct Prefs {
        theme: String,
    }

    #[tokio::test]
    async fn test_json_helpers_round_trip_through_store() {
        let store = MemoryStore::new();
        save_json(&store, "prefs", &Prefs { theme: "dark".into() })
            .await
            .unwrap();
        let loaded: Option<Prefs> = load_json(&store, "prefs").await.unwrap();
        assert_eq!(loaded.map(|p| p.theme).as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_load_json_reports_corrupt_values() {
        let store = MemoryStore::with_entries([("prefs", "{not json")]);
        let loaded: Result<Option<Prefs>> = load_json(&store, "prefs").await;
        assert!(loaded.unwrap_err().is_serialization());
    }

    #[tokio::test]
    async fn test_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").await.is_ok());
        assert!(store.get("nothing").await.unwrap().is_none());
    }
}
