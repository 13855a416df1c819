use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::user::User;

pub type ConversationId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: u64,
    pub sender: User,
    pub content: String,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: String,
}

impl Message {
    /// Whether `user_id` wrote this message (drives sent/received styling).
    pub fn is_sent_by(&self, user_id: u64) -> bool {
        self.sender.id == user_id
    }

    /// `created_at` parsed as RFC 3339; `None` when the backend sent something else.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.created_at)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    #[serde(default)]
    pub participants: Vec<User>,
    #[serde(default)]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Conversation {
    /// The participant that is not `me`, if any.
    pub fn other_participant(&self, me: u64) -> Option<&User> {
        self.participants.iter().find(|p| p.id != me)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_other_participant() {
        let conversation: Conversation = serde_json::from_str(
            r#"{
                "id": 5,
                "participants": [
                    {"id": 1, "username": "me"},
                    {"id": 2, "username": "them", "first_name": "Them"}
                ],
                "last_message": null,
                "unread_count": 2
            }"#,
        )
        .unwrap();
        assert_eq!(conversation.other_participant(1).map(|u| u.id), Some(2));
        assert_eq!(conversation.other_participant(2).map(|u| u.id), Some(1));
        assert_eq!(conversation.unread_count, 2);
    }

    #[test]
    fn test_sent_at_parses_backend_timestamps() {
        let message: Message = serde_json::from_str(
            r#"{"id": 1, "sender": {"id": 1, "username": "me"}, "content": "hi",
                "created_at": "2025-03-04T10:15:00.123456+01:00"}"#,
        )
        .unwrap();
        let sent = message.sent_at().unwrap();
        assert_eq!(sent.format("%H:%M").to_string(), "09:15");

        let undated = Message {
            created_at: String::new(),
            ..message
        };
        assert!(undated.sent_at().is_none());
    }
}
