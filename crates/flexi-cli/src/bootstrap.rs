//! Composition root: turns configuration into a running [`AppRoot`].

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use flexi_application::{AppParts, AppRoot};
use flexi_core::config::ClientConfig;
use flexi_core::gateway::BackendGateway;
use flexi_core::navigation::PageId;
use flexi_core::store::{KeyValueStore, MemoryStore};
use flexi_infrastructure::config_service::{ConfigService, apply_env_overrides};
use flexi_infrastructure::{FlexiPaths, TomlKeyValueStore};
use flexi_interaction::HttpGateway;

use crate::location::CommandLocation;
use crate::terminal::TerminalUi;

/// Where state lives for one run.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Overrides the platform config directory.
    pub config_dir: Option<PathBuf>,
    /// Keeps everything in memory: no config, state or log files are touched.
    pub ephemeral: bool,
}

impl Environment {
    pub fn paths(&self) -> FlexiPaths {
        FlexiPaths::new(self.config_dir.clone())
    }

    /// Loads `config.toml` (writing defaults on first run); ephemeral runs use
    /// the defaults with environment overrides only.
    pub fn load_config(&self) -> Result<ClientConfig> {
        if self.ephemeral {
            return Ok(apply_env_overrides(ClientConfig::default(), |key| {
                std::env::var(key).ok()
            }));
        }
        let paths = self.paths();
        paths
            .ensure_config_dir()
            .context("Failed to create the config directory")?;
        ConfigService::new(paths)
            .load()
            .context("Failed to load config.toml")
    }

    pub fn logs_dir(&self) -> Result<Option<PathBuf>> {
        if self.ephemeral {
            return Ok(None);
        }
        Ok(Some(self.paths().logs_dir()?))
    }

    fn store(&self) -> Result<Arc<dyn KeyValueStore>> {
        if self.ephemeral {
            return Ok(Arc::new(MemoryStore::new()));
        }
        let state_file = self.paths().state_file()?;
        tracing::debug!("[Bootstrap] State file {}", state_file.display());
        Ok(Arc::new(TomlKeyValueStore::new(state_file)))
    }
}

/// Wires the client from its collaborators. The terminal renderer plays every
/// presentation role.
pub fn assemble(
    config: &ClientConfig,
    gateway: Arc<dyn BackendGateway>,
    store: Arc<dyn KeyValueStore>,
    ui: &Arc<TerminalUi>,
    start_page: Option<PageId>,
) -> AppRoot {
    AppRoot::new(AppParts {
        gateway,
        store,
        notifier: ui.clone(),
        location: Arc::new(CommandLocation::at(start_page)),
        regions: ui.regions().into_iter().collect(),
        page_view: ui.clone(),
        message_view: ui.clone(),
        poll_interval: config.poll_interval(),
        search_history_limit: config.search_history_limit,
    })
}

/// Builds the client against the configured backend and store.
pub fn build(
    env: &Environment,
    config: &ClientConfig,
    ui: &Arc<TerminalUi>,
    start_page: Option<PageId>,
) -> Result<AppRoot> {
    let gateway = HttpGateway::from_config(config).context("Failed to create HTTP client")?;
    tracing::info!("[Bootstrap] Backend at {}", gateway.base_url());

    Ok(assemble(config, Arc::new(gateway), env.store()?, ui, start_page))
}
