use crate::user::User;

/// Emitted by [`super::SessionState`] whenever observers need to react.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionSignal {
    /// Auth-dependent chrome should re-render for this identity (`None` = signed out).
    Refreshed(Option<User>),
    /// A protected action was attempted anonymously; show the login prompt.
    LoginRequested,
    /// The session was cleared; go back to the default page.
    NavigateHome,
}
