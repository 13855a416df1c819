use serde::{Deserialize, Serialize};

use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    #[default]
    Active,
    Completed,
    Cancelled,
    Disputed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub id: u64,
    #[serde(default)]
    pub job: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freelancer: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<User>,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub amount: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ContractStatus,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}
