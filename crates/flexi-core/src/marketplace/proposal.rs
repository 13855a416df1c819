use serde::{Deserialize, Serialize};

use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStatus {
    #[default]
    Pending,
    Accepted,
    Declined,
    Withdrawn,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: u64,
    /// Job id, or the nested job title depending on the endpoint; kept raw.
    #[serde(default)]
    pub job: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub freelancer: Option<User>,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(deserialize_with = "crate::amount::deserialize")]
    pub bid_amount: f64,
    /// Delivery time in days.
    #[serde(default)]
    pub delivery_time: u32,
    #[serde(default)]
    pub status: ProposalStatus,
    #[serde(default)]
    pub created_at: String,
}

/// Body of `POST proposals/job/{id}/submit/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    pub cover_letter: String,
    pub bid_amount: f64,
    pub delivery_time: u32,
}
