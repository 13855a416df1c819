pub mod config_service;
pub mod paths;
pub mod storage;
pub mod toml_store;

pub use crate::config_service::ConfigService;
pub use crate::paths::FlexiPaths;
pub use crate::toml_store::TomlKeyValueStore;
