//! Capability traits through which the core reaches the presentation layer.
//!
//! The core never looks regions up by name: each one is handed in
//! explicitly, so a missing region is visible at construction time.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Severity of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    Info,
}

/// Shows short-lived, user-visible notifications.
pub trait Notifier: Send + Sync {
    fn toast(&self, kind: ToastKind, message: &str);

    fn success(&self, message: &str) {
        self.toast(ToastKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.toast(ToastKind::Error, message);
    }

    fn warning(&self, message: &str) {
        self.toast(ToastKind::Warning, message);
    }

    fn info(&self, message: &str) {
        self.toast(ToastKind::Info, message);
    }
}

/// The visible area that belongs to one page.
pub trait PageRegion: Send + Sync {
    fn show(&self);
    fn hide(&self);
}

/// The bookmarkable location fragment and its history stack.
pub trait LocationPort: Send + Sync {
    /// Current fragment without the leading `#`, if any.
    fn fragment(&self) -> Option<String>;

    /// Pushes a new history entry for `fragment`.
    fn push(&self, fragment: &str);
}
