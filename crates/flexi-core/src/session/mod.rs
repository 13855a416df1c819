//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the client-side record of who is signed in
//! - `signal`: notifications emitted when the session changes
//! - `state`: [`SessionState`], the single writer of the session and its persisted token

mod model;
mod signal;
mod state;

pub use model::Session;
pub use signal::SessionSignal;
pub use state::{LOGIN_REQUIRED_TOAST, SessionState};
