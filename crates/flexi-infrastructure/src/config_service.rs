//! Loads `config.toml`, creating it with defaults on first run.

use flexi_core::config::ClientConfig;
use flexi_core::error::Result;

use crate::paths::FlexiPaths;
use crate::storage::AtomicTomlFile;

pub const ENV_API_URL: &str = "FLEXI_API_URL";
pub const ENV_LOG_LEVEL: &str = "FLEXI_LOG_LEVEL";

pub struct ConfigService {
    paths: FlexiPaths,
}

impl ConfigService {
    pub fn new(paths: FlexiPaths) -> Self {
        Self { paths }
    }

    /// Reads the config file, writing the defaults when it does not exist,
    /// then applies environment overrides.
    pub fn load(&self) -> Result<ClientConfig> {
        let file = AtomicTomlFile::<ClientConfig>::new(self.paths.config_file()?);

        let config = match file.load()? {
            Some(config) => config,
            None => {
                let config = ClientConfig::default();
                file.save(&config)?;
                tracing::info!("[Config] Wrote default config to {}", file.path().display());
                config
            }
        };

        Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
    }
}

/// Overlays `FLEXI_API_URL` and `FLEXI_LOG_LEVEL`; blank values are ignored.
pub fn apply_env_overrides(
    mut config: ClientConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> ClientConfig {
    let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_blank(ENV_API_URL) {
        config.api_base_url = url;
    }
    if let Some(level) = non_blank(ENV_LOG_LEVEL) {
        config.log_level = level;
    }
    config
}
