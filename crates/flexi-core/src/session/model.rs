use serde::{Deserialize, Serialize};

use crate::user::User;

/// Who is using the client right now.
///
/// Authentication is derived from the identity, so the two can never
/// disagree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<User>,
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn user_id(&self) -> Option<u64> {
        self.user.as_ref().map(|u| u.id)
    }
}
