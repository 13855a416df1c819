//! Messaging domain module.
//!
//! # Module Structure
//!
//! - `model`: conversations and messages as the backend returns them
//! - `polling`: the timer-driven channel that keeps one open conversation fresh

mod model;
pub mod polling;

pub use model::{Conversation, ConversationId, Message};
pub use polling::{DEFAULT_POLL_INTERVAL, GatewayMessageSource, MessageSource, MessageView, PollingChannel};
