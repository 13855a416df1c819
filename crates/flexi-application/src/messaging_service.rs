//! Conversation selection and sending.

use std::sync::Arc;

use flexi_core::gateway::BackendGateway;
use flexi_core::messaging::{ConversationId, Message, PollingChannel};
use flexi_core::session::SessionState;
use flexi_core::ui::Notifier;

pub const SEND_FAILED_TOAST: &str = "Failed to send message";

pub struct MessagingService {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionState>,
    polling: Arc<PollingChannel>,
    notifier: Arc<dyn Notifier>,
}

impl MessagingService {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        session: Arc<SessionState>,
        polling: Arc<PollingChannel>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            session,
            polling,
            notifier,
        }
    }

    /// Opens `conversation_id` and starts polling it.
    pub async fn select_conversation(&self, conversation_id: ConversationId) -> bool {
        if !self.session.require_authenticated().await {
            return false;
        }
        self.polling.open(conversation_id).await;
        true
    }

    /// Posts `content` and appends the stored message to the open conversation.
    ///
    /// Blank input is ignored without a request.
    pub async fn send_message(&self, conversation_id: ConversationId, content: &str) -> Option<Message> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        if !self.session.require_authenticated().await {
            return None;
        }

        match self.gateway.send_message(conversation_id, content).await {
            Ok(message) => {
                self.polling.append(conversation_id, message.clone()).await;
                Some(message)
            }
            Err(e) => {
                tracing::warn!("[Messaging] Failed to send to conversation {}: {}", conversation_id, e);
                self.notifier.error(SEND_FAILED_TOAST);
                None
            }
        }
    }

    pub fn polling(&self) -> &Arc<PollingChannel> {
        &self.polling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexi_core::error::FlexiError;
    use flexi_core::messaging::GatewayMessageSource;
    use flexi_core::store::MemoryStore;
    use flexi_core::test_support::{
        RecordingMessageView, RecordingNotifier, StubGateway, sample_message, sample_user,
    };

    struct Fixture {
        messaging: MessagingService,
        gateway: Arc<StubGateway>,
        session: Arc<SessionState>,
        view: Arc<RecordingMessageView>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(StubGateway::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let view = Arc::new(RecordingMessageView::default());
        let session = Arc::new(SessionState::new(
            gateway.clone(),
            Arc::new(MemoryStore::new()),
            notifier.clone(),
        ));
        let polling = Arc::new(PollingChannel::new(
            Arc::new(GatewayMessageSource::new(gateway.clone())),
            view.clone(),
            notifier.clone(),
        ));
        Fixture {
            messaging: MessagingService::new(gateway.clone(), session.clone(), polling, notifier.clone()),
            gateway,
            session,
            view,
            notifier,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_then_send_appends_without_refetch() {
        let f = fixture();
        let me = sample_user(1, "ada");
        f.session.establish(me.clone(), "tok".into()).await;
        f.gateway.set_messages(3, vec![sample_message(1, &me, "hello")]);
        f.gateway.set_sent(Ok(sample_message(2, &me, "how are you?")));

        assert!(f.messaging.select_conversation(3).await);
        let sent = f.messaging.send_message(3, "  how are you?  ").await;

        assert_eq!(sent.map(|m| m.id), Some(2));
        assert_eq!(f.gateway.call_count("messages:3"), 1);
        assert_eq!(f.view.renders(), vec![(3, 1), (3, 2)]);
        assert_eq!(f.messaging.polling().snapshot().await.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_message_is_not_sent() {
        let f = fixture();
        f.session.establish(sample_user(1, "ada"), "tok".into()).await;

        assert!(f.messaging.send_message(3, "   ").await.is_none());
        assert!(f.gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_toasts() {
        let f = fixture();
        f.session.establish(sample_user(1, "ada"), "tok".into()).await;
        f.gateway.set_sent(Err(FlexiError::transport("offline")));

        assert!(f.messaging.send_message(3, "hi").await.is_none());
        assert_eq!(f.notifier.messages(), vec![SEND_FAILED_TOAST.to_string()]);
    }

    #[tokio::test]
    async fn test_selecting_requires_session() {
        let f = fixture();

        assert!(!f.messaging.select_conversation(3).await);
        assert!(!f.messaging.polling().is_active().await);
    }
}
