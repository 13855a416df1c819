use std::str::FromStr;
use std::sync::Arc;

use flexi_core::store::{KeyValueStore, keys};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Reads and flips the persisted colour theme.
pub struct ThemeService {
    store: Arc<dyn KeyValueStore>,
}

impl ThemeService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The stored theme; unreadable or unknown values mean light.
    pub async fn current(&self) -> Theme {
        match self.store.get(keys::THEME).await {
            Ok(Some(raw)) => Theme::from_str(raw.trim()).unwrap_or_default(),
            Ok(None) => Theme::default(),
            Err(e) => {
                tracing::warn!("[Theme] Failed to read theme: {}", e);
                Theme::default()
            }
        }
    }

    pub async fn toggle(&self) -> Theme {
        let next = self.current().await.toggled();
        if let Err(e) = self.store.set(keys::THEME, next.to_string()).await {
            tracing::warn!("[Theme] Failed to persist theme: {}", e);
        }
        next
    }
}
