//! User domain module.
//!
//! # Module Structure
//!
//! - `model`: the marketplace user record and its role
//! - `validation`: client-side checks applied before registration

mod model;
pub mod validation;

pub use model::{ProfileUpdate, User, UserType};
