//! Sign-in, registration, sign-out and profile edits.

use std::sync::Arc;

use flexi_core::gateway::{BackendGateway, Credentials, Registration};
use flexi_core::session::SessionState;
use flexi_core::ui::Notifier;
use flexi_core::user::validation::validate_registration;
use flexi_core::user::{ProfileUpdate, User};

pub const LOGIN_SUCCESS_TOAST: &str = "Login successful!";
pub const LOGIN_FAILED_TOAST: &str = "Login failed";
pub const REGISTER_SUCCESS_TOAST: &str = "Registration successful!";
pub const REGISTER_FAILED_TOAST: &str = "Registration failed";
pub const LOGOUT_TOAST: &str = "Logged out successfully";
pub const PROFILE_UPDATED_TOAST: &str = "Profile updated successfully!";
pub const PROFILE_UPDATE_FAILED_TOAST: &str = "Failed to update profile";

/// Drives [`SessionState`] from user actions and reports the outcome as toasts.
///
/// Each operation returns the signed-in user on success and `None` after a
/// failure has been shown; the session is left untouched on failure.
pub struct AuthUseCase {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionState>,
    notifier: Arc<dyn Notifier>,
}

impl AuthUseCase {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        session: Arc<SessionState>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            gateway,
            session,
            notifier,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Option<User> {
        let credentials = Credentials {
            username: username.trim().to_string(),
            password: password.to_string(),
        };

        match self.gateway.login(&credentials).await {
            Ok(response) => {
                self.session
                    .establish(response.user.clone(), response.access)
                    .await;
                self.notifier.success(LOGIN_SUCCESS_TOAST);
                Some(response.user)
            }
            Err(e) => {
                tracing::warn!("[Auth] Login failed for '{}': {}", credentials.username, e);
                self.notifier.error(&failure_text(&e.user_message(), LOGIN_FAILED_TOAST));
                None
            }
        }
    }

    pub async fn register(&self, registration: &Registration) -> Option<User> {
        if let Err(e) = validate_registration(
            &registration.email,
            &registration.password,
            &registration.password_confirm,
        ) {
            self.notifier.error(&e.user_message());
            return None;
        }

        match self.gateway.register(registration).await {
            Ok(response) => {
                self.session
                    .establish(response.user.clone(), response.access)
                    .await;
                self.notifier.success(REGISTER_SUCCESS_TOAST);
                Some(response.user)
            }
            Err(e) => {
                tracing::warn!("[Auth] Registration failed for '{}': {}", registration.username, e);
                self.notifier
                    .error(&failure_text(&e.user_message(), REGISTER_FAILED_TOAST));
                None
            }
        }
    }

    pub async fn logout(&self) {
        self.session.clear().await;
        self.notifier.success(LOGOUT_TOAST);
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Option<User> {
        if !self.session.require_authenticated().await {
            return None;
        }

        match self.gateway.update_profile(update).await {
            Ok(user) => {
                self.session.replace_identity(user.clone()).await;
                self.notifier.success(PROFILE_UPDATED_TOAST);
                Some(user)
            }
            Err(e) => {
                tracing::warn!("[Auth] Profile update failed: {}", e);
                self.notifier
                    .error(&failure_text(&e.user_message(), PROFILE_UPDATE_FAILED_TOAST));
                None
            }
        }
    }
}

fn failure_text(message: &str, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flexi_core::error::FlexiError;
    use flexi_core::gateway::AuthResponse;
    use flexi_core::store::{MemoryStore, keys};
    use flexi_core::test_support::{RecordingNotifier, StubGateway, sample_user};
    use flexi_core::ui::ToastKind;
    use flexi_core::user::UserType;

    struct Fixture {
        auth: AuthUseCase,
        gateway: Arc<StubGateway>,
        session: Arc<SessionState>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn fixture() -> Fixture {
        let gateway = Arc::new(StubGateway::new());
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let session = Arc::new(SessionState::new(gateway.clone(), store.clone(), notifier.clone()));
        Fixture {
            auth: AuthUseCase::new(gateway.clone(), session.clone(), notifier.clone()),
            gateway,
            session,
            store,
            notifier,
        }
    }

    fn auth_response(token: &str) -> AuthResponse {
        AuthResponse {
            access: token.to_string(),
            refresh: None,
            user: sample_user(1, "ada"),
        }
    }

    fn registration(password_confirm: &str) -> Registration {
        Registration {
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
            password: "Secret123".to_string(),
            password_confirm: password_confirm.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            user_type: UserType::Freelancer,
        }
    }

    #[tokio::test]
    async fn test_login_establishes_session() {
        let f = fixture();
        f.gateway.set_auth(Ok(auth_response("tok-1")));

        let user = f.auth.login(" ada ", "Secret123").await;

        assert_eq!(user.map(|u| u.id), Some(1));
        assert!(f.session.is_authenticated().await);
        assert_eq!(f.store.value(keys::ACCESS_TOKEN).as_deref(), Some("tok-1"));
        assert_eq!(
            f.notifier.toasts(),
            vec![(ToastKind::Success, LOGIN_SUCCESS_TOAST.to_string())]
        );
    }

    #[tokio::test]
    async fn test_login_failure_shows_backend_message() {
        let f = fixture();
        f.gateway
            .set_auth(Err(FlexiError::backend(400, "Invalid credentials")));

        assert!(f.auth.login("ada", "wrong").await.is_none());
        assert!(!f.session.is_authenticated().await);
        assert_eq!(
            f.notifier.toasts(),
            vec![(ToastKind::Error, "Invalid credentials".to_string())]
        );
    }

    #[tokio::test]
    async fn test_login_failure_without_message_uses_fallback() {
        let f = fixture();
        f.gateway.set_auth(Err(FlexiError::backend(500, "")));

        f.auth.login("ada", "x").await;
        assert_eq!(f.notifier.messages(), vec![LOGIN_FAILED_TOAST.to_string()]);
    }

    #[tokio::test]
    async fn test_register_validates_before_calling_backend() {
        let f = fixture();

        assert!(f.auth.register(&registration("Secret124")).await.is_none());
        assert!(f.gateway.calls().is_empty());
        assert_eq!(f.notifier.messages(), vec!["Passwords do not match".to_string()]);
    }

    #[tokio::test]
    async fn test_register_success() {
        let f = fixture();
        f.gateway.set_auth(Ok(auth_response("tok-r")));

        assert!(f.auth.register(&registration("Secret123")).await.is_some());
        assert_eq!(f.gateway.calls(), vec!["register".to_string()]);
        assert!(f.session.is_authenticated().await);
        assert_eq!(f.notifier.messages(), vec![REGISTER_SUCCESS_TOAST.to_string()]);
    }

    #[tokio::test]
    async fn test_logout_clears_session() {
        let f = fixture();
        f.session
            .establish(sample_user(1, "ada"), "tok".to_string())
            .await;

        f.auth.logout().await;

        assert!(!f.session.is_authenticated().await);
        assert!(!f.store.contains(keys::ACCESS_TOKEN));
        assert_eq!(f.notifier.messages(), vec![LOGOUT_TOAST.to_string()]);
    }

    #[tokio::test]
    async fn test_update_profile_replaces_identity() {
        let f = fixture();
        f.session
            .establish(sample_user(1, "ada"), "tok".to_string())
            .await;
        let mut updated = sample_user(1, "ada");
        updated.first_name = "Ada".to_string();
        f.gateway.set_updated_profile(Ok(updated));

        let user = f.auth.update_profile(&ProfileUpdate::default()).await;

        assert_eq!(user.map(|u| u.first_name), Some("Ada".to_string()));
        assert_eq!(
            f.session.current_user().await.map(|u| u.display_name().to_string()),
            Some("Ada".to_string())
        );
        assert_eq!(f.notifier.messages(), vec![PROFILE_UPDATED_TOAST.to_string()]);
    }

    #[tokio::test]
    async fn test_update_profile_requires_session() {
        let f = fixture();

        assert!(f.auth.update_profile(&ProfileUpdate::default()).await.is_none());
        assert!(f.gateway.calls().is_empty());
    }
}
