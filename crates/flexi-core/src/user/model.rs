//! User domain model.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role of an account on the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserType {
    #[default]
    Freelancer,
    Client,
    Admin,
}

/// The account currently using the client, as returned by `auth/profile/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub user_type: UserType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(
        default,
        deserialize_with = "crate::amount::deserialize_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub hourly_rate: Option<f64>,
}

impl User {
    /// Name shown in the user menu: first name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        if self.first_name.trim().is_empty() {
            &self.username
        } else {
            &self.first_name
        }
    }

    pub fn is_freelancer(&self) -> bool {
        self.user_type == UserType::Freelancer
    }

    pub fn is_client(&self) -> bool {
        self.user_type == UserType::Client
    }
}

/// Editable profile fields sent to `auth/profile/update/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub bio: String,
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
}
