use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use flexi_core::error::Result;
use flexi_core::store::{self, KeyValueStore, keys};
use serde_json::{Map, Value};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Draft key of the profile form.
pub const PROFILE_DRAFT: &str = "profile";
/// Draft key of the post-job form.
pub const POST_JOB_DRAFT: &str = "post-job";

/// Quiet period after the last edit before a form's draft is written.
pub const DRAFT_SAVE_DELAY: Duration = Duration::from_secs(1);

/// Auto-saved form contents, one JSON object per form.
///
/// Writes go straight to the store; [`DraftAutosave`] debounces them.
pub struct DraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl DraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn key(form: &str) -> String {
        format!("{}{}", keys::DRAFT_PREFIX, form)
    }

    pub async fn save(&self, form: &str, fields: &Map<String, Value>) -> Result<()> {
        store::save_json(self.store.as_ref(), &Self::key(form), fields).await
    }

    /// The saved fields of `form`; a corrupt draft is dropped and reads as none.
    pub async fn load(&self, form: &str) -> Option<Map<String, Value>> {
        match store::load_json(self.store.as_ref(), &Self::key(form)).await {
            Ok(fields) => fields,
            Err(e) => {
                tracing::warn!("[Drafts] Discarding unreadable draft '{}': {}", form, e);
                self.discard(form).await;
                None
            }
        }
    }

    /// Forgets the draft of `form`, typically after a successful submit.
    pub async fn discard(&self, form: &str) {
        if let Err(e) = self.store.remove(&Self::key(form)).await {
            tracing::warn!("[Drafts] Failed to remove draft '{}': {}", form, e);
        }
    }
}

/// Debounced writer in front of a [`DraftStore`].
///
/// Every edit of a form restarts that form's timer; only the contents of the
/// last edit within [`DRAFT_SAVE_DELAY`] reach the store.
pub struct DraftAutosave {
    drafts: Arc<DraftStore>,
    delay: Duration,
    pending: Mutex<HashMap<String, CancellationToken>>,
    // Serializes timed saves against discards so a discarded draft stays gone.
    writes: Arc<Mutex<()>>,
}

impl DraftAutosave {
    pub fn new(drafts: Arc<DraftStore>) -> Self {
        Self {
            drafts,
            delay: DRAFT_SAVE_DELAY,
            pending: Mutex::new(HashMap::new()),
            writes: Arc::new(Mutex::new(())),
        }
    }

    /// Saves `fields` as the draft of `form` once the form has been quiet
    /// for the delay, superseding any save still waiting for `form`.
    pub async fn schedule(&self, form: &str, fields: Map<String, Value>) {
        let cancel = CancellationToken::new();
        if let Some(previous) = self
            .pending
            .lock()
            .await
            .insert(form.to_string(), cancel.clone())
        {
            previous.cancel();
        }

        let drafts = self.drafts.clone();
        let writes = self.writes.clone();
        let form = form.to_string();
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    let _write = writes.lock().await;
                    if cancel.is_cancelled() {
                        return;
                    }
                    match drafts.save(&form, &fields).await {
                        Ok(()) => tracing::debug!("[Drafts] Saved draft '{}'", form),
                        Err(e) => tracing::warn!("[Drafts] Failed to save draft '{}': {}", form, e),
                    }
                }
            }
        });
    }

    /// Drops any save waiting for `form` and forgets its stored draft.
    pub async fn discard(&self, form: &str) {
        if let Some(pending) = self.pending.lock().await.remove(form) {
            pending.cancel();
        }
        let _write = self.writes.lock().await;
        self.drafts.discard(form).await;
    }
}
