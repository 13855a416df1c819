//! TOML-backed [`KeyValueStore`].

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use flexi_core::error::{FlexiError, Result};
use flexi_core::store::KeyValueStore;
use serde::{Deserialize, Serialize};

use crate::storage::AtomicTomlFile;

/// On-disk shape of `state.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Persists the client's string keys in a single TOML file.
///
/// Every write is a locked read-modify-write, so two `flexi` processes
/// sharing a config directory never lose each other's keys. File I/O runs
/// on the blocking pool.
#[derive(Clone)]
pub struct TomlKeyValueStore {
    file: Arc<AtomicTomlFile<StateFile>>,
}

impl TomlKeyValueStore {
    pub fn new(path: PathBuf) -> Self {
        tracing::debug!("[Store] Using state file {}", path.display());
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    async fn blocking<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&AtomicTomlFile<StateFile>) -> Result<R> + Send + 'static,
    {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || f(&file))
            .await
            .map_err(|e| FlexiError::internal(format!("state file task failed: {e}")))?
    }
}

#[async_trait]
impl KeyValueStore for TomlKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = key.to_string();
        self.blocking(move |file| {
            Ok(file
                .load()?
                .and_then(|state| state.entries.get(&key).cloned()))
        })
        .await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            file.update(StateFile::default(), |state| {
                state.entries.insert(key, value);
                Ok(())
            })
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.blocking(move |file| {
            if file.load()?.is_none() {
                return Ok(());
            }
            file.update(StateFile::default(), |state| {
                state.entries.remove(&key);
                Ok(())
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexi_core::store::{keys, load_json, save_json};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_values_survive_a_new_store_instance() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");

        let store = TomlKeyValueStore::new(path.clone());
        store.set(keys::ACCESS_TOKEN, "tok-1".to_string()).await.unwrap();
        store.set(keys::THEME, "dark".to_string()).await.unwrap();

        let reopened = TomlKeyValueStore::new(path);
        assert_eq!(reopened.get(keys::ACCESS_TOKEN).await.unwrap().as_deref(), Some("tok-1"));
        assert_eq!(reopened.get(keys::THEME).await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_remove_and_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        let store = TomlKeyValueStore::new(path.clone());

        store.remove(keys::USER).await.unwrap();
        assert!(!path.exists(), "removing from a missing file does not create it");
        assert!(store.get(keys::USER).await.unwrap().is_none());

        store.set(keys::USER, "{}".to_string()).await.unwrap();
        store.remove(keys::USER).await.unwrap();
        assert!(store.get(keys::USER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_values_with_quotes_and_newlines() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlKeyValueStore::new(temp_dir.path().join("state.toml"));

        let history = vec!["rust \"async\"".to_string(), "line\nbreak".to_string()];
        save_json(&store, keys::SEARCH_HISTORY, &history).await.unwrap();

        let loaded: Option<Vec<String>> = load_json(&store, keys::SEARCH_HISTORY).await.unwrap();
        assert_eq!(loaded, Some(history));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_writers_keep_every_key() {
        let temp_dir = TempDir::new().unwrap();
        let store = TomlKeyValueStore::new(temp_dir.path().join("state.toml"));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.set(&format!("draft:{i}"), i.to_string()).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for i in 0..8 {
            assert_eq!(
                store.get(&format!("draft:{i}")).await.unwrap(),
                Some(i.to_string())
            );
        }
    }
}
