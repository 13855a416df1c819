use std::sync::Mutex;

use flexi_core::navigation::PageId;
use flexi_core::ui::LocationPort;

/// Location of a single command run: starts at the page the command asked
/// for and records every pushed fragment.
#[derive(Debug, Default)]
pub struct CommandLocation {
    fragment: Mutex<Option<String>>,
    history: Mutex<Vec<String>>,
}

impl CommandLocation {
    pub fn at(page: Option<PageId>) -> Self {
        Self {
            fragment: Mutex::new(page.map(PageId::fragment)),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Fragments pushed so far, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }
}

impl LocationPort for CommandLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.lock().ok().and_then(|f| f.clone())
    }

    fn push(&self, fragment: &str) {
        tracing::debug!("[Location] #{}", fragment);
        if let Ok(mut current) = self.fragment.lock() {
            *current = Some(fragment.to_string());
        }
        if let Ok(mut history) = self.history.lock() {
            history.push(fragment.to_string());
        }
    }
}
