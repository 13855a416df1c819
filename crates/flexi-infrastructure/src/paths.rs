//! Where the client keeps its files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/flexilance/        # Config directory (dirs::config_dir)
//! ├── config.toml              # Client configuration
//! ├── state.toml               # Persisted key-value store (token, theme, drafts...)
//! └── logs/                    # Daily-rolling log files
//!     └── flexi.log.YYYY-MM-DD
//! ```

use std::path::PathBuf;

use flexi_core::error::{FlexiError, Result};

const APP_DIR_NAME: &str = "flexilance";

/// Resolves every path the client reads or writes.
///
/// `base` replaces the platform config directory; the CLI sets it from
/// `--config-dir` and tests point it at a temp dir.
#[derive(Debug, Clone, Default)]
pub struct FlexiPaths {
    base: Option<PathBuf>,
}

impl FlexiPaths {
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// The configuration directory (e.g. `~/.config/flexilance/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR_NAME))
                .ok_or_else(|| FlexiError::config("Cannot find the platform config directory")),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    pub fn state_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("state.toml"))
    }

    pub fn logs_dir(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("logs"))
    }

    /// Creates the config directory if needed and returns it.
    pub fn ensure_config_dir(&self) -> Result<PathBuf> {
        let dir = self.config_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}
