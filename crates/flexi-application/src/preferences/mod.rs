//! Client-side preferences kept in the persisted store.

mod drafts;
mod search_history;
mod theme;

pub use drafts::{DRAFT_SAVE_DELAY, DraftAutosave, DraftStore, POST_JOB_DRAFT, PROFILE_DRAFT};
pub use search_history::{DEFAULT_SEARCH_HISTORY_LIMIT, SearchHistory};
pub use theme::{Theme, ThemeService};
