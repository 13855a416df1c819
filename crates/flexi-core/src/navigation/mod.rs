//! Navigation domain module.
//!
//! # Module Structure
//!
//! - `page`: the closed set of pages and which of them are protected
//! - `router`: [`NavigationRouter`], the access-gated single writer of the visible page

mod page;
mod router;

pub use page::PageId;
pub use router::{Navigation, NavigationRouter, PageLoader};
