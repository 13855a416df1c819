use std::sync::Arc;

use tokio::sync::{RwLock, broadcast};

use super::model::Session;
use super::signal::SessionSignal;
use crate::gateway::BackendGateway;
use crate::store::{self, KeyValueStore, keys};
use crate::ui::Notifier;
use crate::user::User;

/// Warning shown when an anonymous user reaches for a protected feature.
pub const LOGIN_REQUIRED_TOAST: &str = "Please log in to access this feature";

const SIGNAL_CAPACITY: usize = 32;

/// Owns the current [`Session`] and its persisted credential.
///
/// `SessionState` is the only writer of the session, the persisted
/// `access_token`/`user` keys and the gateway's bearer token; the three are
/// kept in step. Persistence failures are logged and never undo an
/// in-memory transition.
pub struct SessionState {
    session: RwLock<Session>,
    gateway: Arc<dyn BackendGateway>,
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    signals: broadcast::Sender<SessionSignal>,
}

impl SessionState {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        store: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (signals, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self {
            session: RwLock::new(Session::default()),
            gateway,
            store,
            notifier,
            signals,
        }
    }

    /// Receives every [`SessionSignal`] emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionSignal> {
        self.signals.subscribe()
    }

    /// Restores the session from the persisted token, if there is one.
    ///
    /// Makes a single profile request. Any failure clears the session and the
    /// persisted token and leaves the client anonymous.
    ///
    /// # Returns
    ///
    /// `true` when the session is authenticated afterwards.
    pub async fn restore(&self) -> bool {
        let token = match self.store.get(keys::ACCESS_TOKEN).await {
            Ok(token) => token.filter(|t| !t.trim().is_empty()),
            Err(e) => {
                tracing::warn!("[Session] Failed to read persisted token: {}", e);
                None
            }
        };

        let Some(token) = token else {
            tracing::debug!("[Session] No persisted token, starting anonymous");
            self.emit(SessionSignal::Refreshed(None));
            return false;
        };

        self.gateway.set_token(Some(token.clone()));

        match self.gateway.profile().await {
            Ok(user) => {
                tracing::info!("[Session] Restored session for user {}", user.username);
                {
                    let mut session = self.session.write().await;
                    session.user = Some(user.clone());
                    session.token = Some(token);
                }
                self.persist_user(&user).await;
                self.emit(SessionSignal::Refreshed(Some(user)));
                true
            }
            Err(e) => {
                tracing::warn!("[Session] Failed to restore session: {}", e);
                self.reset().await;
                self.emit(SessionSignal::Refreshed(None));
                false
            }
        }
    }

    /// Signs `user` in with `token` and persists both.
    pub async fn establish(&self, user: User, token: String) {
        self.gateway.set_token(Some(token.clone()));
        {
            let mut session = self.session.write().await;
            session.user = Some(user.clone());
            session.token = Some(token.clone());
        }

        if let Err(e) = self.store.set(keys::ACCESS_TOKEN, token).await {
            tracing::warn!("[Session] Failed to persist token: {}", e);
        }
        self.persist_user(&user).await;

        tracing::info!("[Session] Established session for user {}", user.username);
        self.emit(SessionSignal::Refreshed(Some(user)));
    }

    /// Signs out: forgets the identity and removes the persisted credential.
    pub async fn clear(&self) {
        self.reset().await;
        tracing::info!("[Session] Session cleared");
        self.emit(SessionSignal::Refreshed(None));
        self.emit(SessionSignal::NavigateHome);
    }

    /// The access-control gate.
    ///
    /// Returns `true` when authenticated. Otherwise warns the user, asks for
    /// the login prompt and returns `false`; callers must not proceed then.
    pub async fn require_authenticated(&self) -> bool {
        if self.is_authenticated().await {
            return true;
        }
        self.notifier.warning(LOGIN_REQUIRED_TOAST);
        self.emit(SessionSignal::LoginRequested);
        false
    }

    /// Swaps in an updated identity after a profile edit.
    ///
    /// Ignored (returns `false`) when nobody is signed in.
    pub async fn replace_identity(&self, user: User) -> bool {
        {
            let mut session = self.session.write().await;
            if !session.is_authenticated() {
                tracing::warn!("[Session] Ignoring identity update without a session");
                return false;
            }
            session.user = Some(user.clone());
        }
        self.persist_user(&user).await;
        self.emit(SessionSignal::Refreshed(Some(user)));
        true
    }

    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.is_authenticated()
    }

    pub async fn current_user(&self) -> Option<User> {
        self.session.read().await.user.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.session.read().await.token.clone()
    }

    pub async fn snapshot(&self) -> Session {
        self.session.read().await.clone()
    }

    async fn reset(&self) {
        *self.session.write().await = Session::default();
        self.gateway.set_token(None);
        for key in [keys::ACCESS_TOKEN, keys::USER] {
            if let Err(e) = self.store.remove(key).await {
                tracing::warn!("[Session] Failed to remove '{}': {}", key, e);
            }
        }
    }

    async fn persist_user(&self, user: &User) {
        if let Err(e) = store::save_json(self.store.as_ref(), keys::USER, user).await {
            tracing::warn!("[Session] Failed to persist user record: {}", e);
        }
    }

    fn emit(&self, signal: SessionSignal) {
        // No subscribers is fine; nothing needs to re-render yet.
        let _ = self.signals.send(signal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FlexiError;
    use crate::store::MemoryStore;
    use crate::test_support::{RecordingNotifier, StubGateway, sample_user};
    use crate::ui::ToastKind;

    fn state(
        gateway: Arc<StubGateway>,
        store: Arc<MemoryStore>,
    ) -> (SessionState, Arc<RecordingNotifier>) {
        let notifier = Arc::new(RecordingNotifier::default());
        (
            SessionState::new(gateway, store, notifier.clone()),
            notifier,
        )
    }

    #[tokio::test]
    async fn test_restore_without_token_stays_anonymous() {
        let gateway = Arc::new(StubGateway::new());
        let store = Arc::new(MemoryStore::new());
        let (state, _) = state(gateway.clone(), store);

        assert!(!state.restore().await);
        assert!(!state.is_authenticated().await);
        assert!(gateway.calls().is_empty(), "no profile request without a token");
    }

    #[tokio::test]
    async fn test_restore_with_valid_token() {
        let gateway = Arc::new(StubGateway::new());
        gateway.set_profile(Ok(sample_user(1, "ada")));
        let store = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "tok-1")]));
        let (state, _) = state(gateway.clone(), store.clone());

        assert!(state.restore().await);
        assert!(state.is_authenticated().await);
        assert_eq!(state.token().await.as_deref(), Some("tok-1"));
        assert_eq!(gateway.current_token().as_deref(), Some("tok-1"));
        assert!(store.contains(keys::USER));
    }

    #[tokio::test]
    async fn test_restore_with_rejected_token_clears_persistence() {
        let gateway = Arc::new(StubGateway::new());
        gateway.set_profile(Err(FlexiError::backend(401, "Token is invalid or expired")));
        let store = Arc::new(MemoryStore::with_entries([
            (keys::ACCESS_TOKEN, "stale"),
            (keys::USER, r#"{"id": 1, "username": "ada"}"#),
        ]));
        let (state, _) = state(gateway.clone(), store.clone());

        assert!(!state.restore().await);
        assert!(!state.is_authenticated().await);
        assert!(!store.contains(keys::ACCESS_TOKEN));
        assert!(!store.contains(keys::USER));
        assert!(gateway.current_token().is_none());
        assert_eq!(gateway.calls(), vec!["profile".to_string()], "single attempt");
    }

    #[tokio::test]
    async fn test_restore_with_network_failure_fails_open() {
        let gateway = Arc::new(StubGateway::new());
        gateway.set_profile(Err(FlexiError::transport("connection refused")));
        let store = Arc::new(MemoryStore::with_entries([(keys::ACCESS_TOKEN, "tok")]));
        let (state, _) = state(gateway, store.clone());

        assert!(!state.restore().await);
        assert!(!store.contains(keys::ACCESS_TOKEN));
    }

    #[tokio::test]
    async fn test_establish_then_clear() {
        let gateway = Arc::new(StubGateway::new());
        let store = Arc::new(MemoryStore::new());
        let (state, _) = state(gateway.clone(), store.clone());
        let mut signals = state.subscribe();

        state.establish(sample_user(2, "grace"), "tok-2".to_string()).await;
        assert!(state.is_authenticated().await);
        assert_eq!(store.value(keys::ACCESS_TOKEN).as_deref(), Some("tok-2"));
        assert_eq!(gateway.current_token().as_deref(), Some("tok-2"));

        state.clear().await;
        assert!(!state.is_authenticated().await);
        assert!(state.token().await.is_none());
        assert!(!store.contains(keys::ACCESS_TOKEN));
        assert!(gateway.current_token().is_none());

        assert!(matches!(
            signals.try_recv(),
            Ok(SessionSignal::Refreshed(Some(_)))
        ));
        assert_eq!(signals.try_recv().ok(), Some(SessionSignal::Refreshed(None)));
        assert_eq!(signals.try_recv().ok(), Some(SessionSignal::NavigateHome));
    }

    #[tokio::test]
    async fn test_require_authenticated_warns_and_requests_login() {
        let gateway = Arc::new(StubGateway::new());
        let store = Arc::new(MemoryStore::new());
        let (state, notifier) = state(gateway, store);
        let mut signals = state.subscribe();

        assert!(!state.require_authenticated().await);
        assert_eq!(
            notifier.toasts(),
            vec![(ToastKind::Warning, LOGIN_REQUIRED_TOAST.to_string())]
        );
        assert_eq!(signals.try_recv().ok(), Some(SessionSignal::LoginRequested));

        state.establish(sample_user(3, "linus"), "tok".to_string()).await;
        assert!(state.require_authenticated().await);
        assert_eq!(notifier.toasts().len(), 1);
    }

    #[tokio::test]
    async fn test_replace_identity_requires_session() {
        let gateway = Arc::new(StubGateway::new());
        let store = Arc::new(MemoryStore::new());
        let (state, _) = state(gateway, store.clone());

        assert!(!state.replace_identity(sample_user(4, "x")).await);
        assert!(state.current_user().await.is_none());

        state.establish(sample_user(4, "x"), "tok".to_string()).await;
        let mut updated = sample_user(4, "x");
        updated.first_name = "Xavier".to_string();
        assert!(state.replace_identity(updated).await);
        assert_eq!(
            state.current_user().await.map(|u| u.first_name),
            Some("Xavier".to_string())
        );
        assert!(store.value(keys::USER).unwrap().contains("Xavier"));
    }
}
