//! Core domain of the FlexiLance client: session, navigation, messaging and
//! the capability traits the outer layers implement.

pub mod amount;
pub mod config;
pub mod error;
pub mod gateway;
pub mod marketplace;
pub mod messaging;
pub mod navigation;
pub mod session;
pub mod store;
pub mod ui;
pub mod user;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::{FlexiError, Result};
