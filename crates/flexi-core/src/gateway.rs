//! Remote access gateway trait.
//!
//! Every backend call the client makes goes through [`BackendGateway`]. The
//! HTTP implementation lives in `flexi-interaction`; tests substitute their
//! own.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::marketplace::{
    Contract, EarningsSummary, Job, JobCategory, JobFilters, NewJob, NewProposal, Payment,
    Proposal,
};
use crate::messaging::{Conversation, ConversationId, Message};
use crate::user::{ProfileUpdate, User, UserType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Body of `auth/register/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub user_type: UserType,
}

/// Answer of `auth/login/` and `auth/register/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    /// Bearer token; some deployments name it `access_token`.
    #[serde(alias = "access_token")]
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
    pub user: User,
}

/// Request/response operations keyed by backend resource paths.
///
/// Implementations attach the bearer credential set through
/// [`BackendGateway::set_token`] to authenticated calls only.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    /// Replaces the bearer credential; `None` makes later calls anonymous.
    fn set_token(&self, token: Option<String>);

    // auth
    async fn register(&self, registration: &Registration) -> Result<AuthResponse>;
    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse>;
    async fn profile(&self) -> Result<User>;
    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User>;

    // jobs
    async fn jobs(&self, filters: &JobFilters) -> Result<Vec<Job>>;
    async fn job(&self, job_id: u64) -> Result<Job>;
    async fn create_job(&self, job: &NewJob) -> Result<Job>;
    async fn my_jobs(&self) -> Result<Vec<Job>>;
    async fn job_categories(&self) -> Result<Vec<JobCategory>>;

    // proposals
    async fn submit_proposal(&self, job_id: u64, proposal: &NewProposal) -> Result<Proposal>;
    async fn my_proposals(&self) -> Result<Vec<Proposal>>;
    async fn job_proposals(&self, job_id: u64) -> Result<Vec<Proposal>>;
    async fn accept_proposal(&self, proposal_id: u64) -> Result<serde_json::Value>;

    // contracts
    async fn my_contracts(&self) -> Result<Vec<Contract>>;
    async fn contract(&self, contract_id: u64) -> Result<Contract>;

    // messaging
    async fn conversations(&self) -> Result<Vec<Conversation>>;
    async fn start_conversation(&self, recipient_id: u64) -> Result<Conversation>;
    async fn messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>>;
    async fn send_message(&self, conversation_id: ConversationId, content: &str)
    -> Result<Message>;

    // payments
    async fn payment_history(&self) -> Result<Vec<Payment>>;
    async fn earnings(&self) -> Result<Vec<Payment>>;
    async fn earnings_summary(&self) -> Result<EarningsSummary>;
}
