//! Polling channel for the open conversation.
//!
//! At most one conversation is polled at a time. Every `open` starts a new
//! generation; every fetch carries a sequence number. A reply is applied only
//! if its generation is still current and nothing newer has been applied, so
//! a slow reply from an abandoned conversation or an earlier tick can never
//! overwrite fresher data.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use super::model::{ConversationId, Message};
use crate::error::Result;
use crate::gateway::BackendGateway;
use crate::ui::Notifier;

/// Interval between two refreshes of the open conversation.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const FETCH_FAILED_TOAST: &str = "Failed to load messages";

/// Where message snapshots come from.
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn fetch_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>>;
}

/// Adapts a [`BackendGateway`] into a [`MessageSource`].
pub struct GatewayMessageSource {
    gateway: Arc<dyn BackendGateway>,
}

impl GatewayMessageSource {
    pub fn new(gateway: Arc<dyn BackendGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl MessageSource for GatewayMessageSource {
    async fn fetch_messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        self.gateway.messages(conversation_id).await
    }
}

/// Renders the message list of the open conversation.
pub trait MessageView: Send + Sync {
    fn render_messages(&self, conversation_id: ConversationId, messages: &[Message]);
}

#[derive(Default)]
struct WorkingCopy {
    conversation_id: Option<ConversationId>,
    generation: u64,
    applied_seq: u64,
    messages: Vec<Message>,
}

struct Shared {
    source: Arc<dyn MessageSource>,
    view: Arc<dyn MessageView>,
    notifier: Arc<dyn Notifier>,
    generation: AtomicU64,
    next_seq: AtomicU64,
    working: Mutex<WorkingCopy>,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// One fetch-and-replace cycle for `conversation_id`.
    async fn refresh(&self, conversation_id: ConversationId, generation: u64) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        match self.source.fetch_messages(conversation_id).await {
            Ok(messages) => {
                self.apply(generation, seq, conversation_id, messages).await;
            }
            Err(e) => {
                if self.is_current(generation) {
                    tracing::warn!(
                        "[Polling] Failed to load messages for conversation {}: {}",
                        conversation_id,
                        e
                    );
                    self.notifier.error(FETCH_FAILED_TOAST);
                }
            }
        }
    }

    /// Replaces the working copy unless the reply is stale. Returns whether it was applied.
    async fn apply(
        &self,
        generation: u64,
        seq: u64,
        conversation_id: ConversationId,
        messages: Vec<Message>,
    ) -> bool {
        let mut working = self.working.lock().await;
        if working.generation != generation
            || working.conversation_id != Some(conversation_id)
            || seq <= working.applied_seq
        {
            tracing::debug!(
                "[Polling] Dropping stale reply for conversation {} (generation {}, seq {})",
                conversation_id,
                generation,
                seq
            );
            return false;
        }
        working.applied_seq = seq;
        working.messages = messages;
        self.view.render_messages(conversation_id, &working.messages);
        true
    }
}

struct ActivePoll {
    conversation_id: ConversationId,
    cancel: CancellationToken,
    _task: JoinHandle<()>,
}

/// Keeps the open conversation's messages approximately fresh.
///
/// Failed fetches are reported as toasts and retried on the next tick,
/// indefinitely and without backoff.
pub struct PollingChannel {
    shared: Arc<Shared>,
    interval: Duration,
    active: Mutex<Option<ActivePoll>>,
}

impl PollingChannel {
    pub fn new(
        source: Arc<dyn MessageSource>,
        view: Arc<dyn MessageView>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                source,
                view,
                notifier,
                generation: AtomicU64::new(0),
                next_seq: AtomicU64::new(0),
                working: Mutex::new(WorkingCopy::default()),
            }),
            interval: DEFAULT_POLL_INTERVAL,
            active: Mutex::new(None),
        }
    }

    /// Overrides the refresh interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling `conversation_id`, replacing any running channel.
    ///
    /// The initial snapshot is fetched and rendered before the timer is armed.
    /// The channel lock is not held during that fetch; if another `open` or a
    /// `close` lands meanwhile, this call arms nothing.
    pub async fn open(&self, conversation_id: ConversationId) {
        let generation = {
            let mut active = self.active.lock().await;
            if let Some(previous) = active.take() {
                tracing::debug!(
                    "[Polling] Cancelling channel for conversation {}",
                    previous.conversation_id
                );
                previous.cancel.cancel();
            }

            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            let mut working = self.shared.working.lock().await;
            *working = WorkingCopy {
                conversation_id: Some(conversation_id),
                generation,
                ..WorkingCopy::default()
            };
            generation
        };

        self.shared.refresh(conversation_id, generation).await;

        let mut active = self.active.lock().await;
        if !self.shared.is_current(generation) {
            tracing::debug!(
                "[Polling] Conversation {} was superseded during its first fetch",
                conversation_id
            );
            return;
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(poll_loop(
            self.shared.clone(),
            conversation_id,
            generation,
            self.interval,
            cancel.clone(),
        ));

        tracing::info!(
            "[Polling] Opened conversation {} (every {:?})",
            conversation_id,
            self.interval
        );

        *active = Some(ActivePoll {
            conversation_id,
            cancel,
            _task: task,
        });
    }

    /// Stops polling. Safe to call when nothing is open.
    ///
    /// Also abandons an `open` still waiting on its first fetch.
    pub async fn close(&self) {
        let mut active = self.active.lock().await;
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        self.shared.working.lock().await.conversation_id = None;
        if let Some(previous) = active.take() {
            previous.cancel.cancel();
            tracing::info!(
                "[Polling] Closed conversation {}",
                previous.conversation_id
            );
        }
    }

    /// Appends a message the user just sent to the working copy and re-renders.
    ///
    /// Returns `false` when `conversation_id` is not the open conversation.
    pub async fn append(&self, conversation_id: ConversationId, message: Message) -> bool {
        let mut working = self.shared.working.lock().await;
        if working.conversation_id != Some(conversation_id) {
            return false;
        }
        working.messages.push(message);
        self.shared
            .view
            .render_messages(conversation_id, &working.messages);
        true
    }

    /// Messages of the open conversation as last rendered.
    pub async fn snapshot(&self) -> Vec<Message> {
        self.shared.working.lock().await.messages.clone()
    }

    pub async fn active_conversation(&self) -> Option<ConversationId> {
        self.active.lock().await.as_ref().map(|a| a.conversation_id)
    }

    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }
}

impl Drop for PollingChannel {
    fn drop(&mut self) {
        if let Some(active) = self.active.get_mut().take() {
            active.cancel.cancel();
        }
    }
}

async fn poll_loop(
    shared: Arc<Shared>,
    conversation_id: ConversationId,
    generation: u64,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; the initial snapshot was already fetched.
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = shared.refresh(conversation_id, generation) => {}
                }
            }
        }
    }

    tracing::debug!(
        "[Polling] Timer for conversation {} stopped",
        conversation_id
    );
}
