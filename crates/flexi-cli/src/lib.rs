//! Terminal front end of the FlexiLance client.

pub mod bootstrap;
pub mod commands;
pub mod location;
pub mod logging;
pub mod terminal;

pub use bootstrap::Environment;
pub use commands::Command;
pub use terminal::TerminalUi;
