use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// The known pages of the client.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PageId {
    #[default]
    Home,
    Jobs,
    Dashboard,
    Messages,
    Profile,
    Settings,
}

impl PageId {
    /// Pages that need a signed-in user.
    pub fn is_protected(self) -> bool {
        matches!(
            self,
            PageId::Dashboard | PageId::Messages | PageId::Profile | PageId::Settings
        )
    }

    /// Parses a location fragment, with or without the leading `#`.
    ///
    /// Returns `None` for blank or unknown fragments.
    pub fn from_fragment(fragment: &str) -> Option<Self> {
        let name = fragment.trim().trim_start_matches('#').trim();
        if name.is_empty() {
            return None;
        }
        PageId::from_str(name).ok()
    }

    /// The fragment pushed to history for this page.
    pub fn fragment(self) -> String {
        self.to_string()
    }

    pub fn all() -> impl Iterator<Item = PageId> {
        PageId::iter()
    }

    pub fn protected() -> impl Iterator<Item = PageId> {
        PageId::iter().filter(|page| page.is_protected())
    }
}
