//! Hand-written collaborators for tests.
//!
//! Compiled for this crate's own tests and, through the `test-support`
//! feature, for the tests of downstream crates.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{FlexiError, Result};
use crate::gateway::{AuthResponse, BackendGateway, Credentials, Registration};
use crate::marketplace::{
    Contract, EarningsSummary, Job, JobCategory, JobFilters, NewJob, NewProposal, Payment,
    Proposal,
};
use crate::messaging::{Conversation, ConversationId, Message, MessageView};
use crate::ui::{LocationPort, Notifier, PageRegion, ToastKind};
use crate::user::{ProfileUpdate, User, UserType};

pub fn sample_user(id: u64, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        user_type: UserType::Freelancer,
        avatar: None,
        bio: String::new(),
        phone: String::new(),
        location: String::new(),
        website: String::new(),
        skills: Vec::new(),
        hourly_rate: None,
    }
}

pub fn sample_client(id: u64, username: &str) -> User {
    User {
        user_type: UserType::Client,
        ..sample_user(id, username)
    }
}

pub fn sample_message(id: u64, sender: &User, content: &str) -> Message {
    Message {
        id,
        sender: sender.clone(),
        content: content.to_string(),
        is_read: false,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

pub fn sample_job(id: u64, title: &str) -> Job {
    serde_json::from_value(serde_json::json!({ "id": id, "title": title }))
        .unwrap_or_else(|e| panic!("sample job should deserialize: {e}"))
}

// ============================================================================
// Notifier
// ============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    toasts: Mutex<Vec<(ToastKind, String)>>,
}

impl RecordingNotifier {
    pub fn toasts(&self) -> Vec<(ToastKind, String)> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.toasts().into_iter().map(|(_, m)| m).collect()
    }
}

impl Notifier for RecordingNotifier {
    fn toast(&self, kind: ToastKind, message: &str) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push((kind, message.to_string()));
        }
    }
}

// ============================================================================
// Message view
// ============================================================================

/// Records every render as `(conversation, message count)` and keeps the
/// last rendered list.
#[derive(Default)]
pub struct RecordingMessageView {
    renders: Mutex<Vec<(ConversationId, usize)>>,
    last: Mutex<Vec<Message>>,
}

impl RecordingMessageView {
    pub fn renders(&self) -> Vec<(ConversationId, usize)> {
        self.renders.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn last_messages(&self) -> Vec<Message> {
        self.last.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl MessageView for RecordingMessageView {
    fn render_messages(&self, conversation_id: ConversationId, messages: &[Message]) {
        if let Ok(mut renders) = self.renders.lock() {
            renders.push((conversation_id, messages.len()));
        }
        if let Ok(mut last) = self.last.lock() {
            *last = messages.to_vec();
        }
    }
}

// ============================================================================
// Location and regions
// ============================================================================

#[derive(Default)]
pub struct RecordingLocation {
    fragment: Mutex<Option<String>>,
    pushed: Mutex<Vec<String>>,
}

impl RecordingLocation {
    pub fn at(fragment: &str) -> Self {
        Self {
            fragment: Mutex::new(Some(fragment.to_string())),
            pushed: Mutex::new(Vec::new()),
        }
    }

    pub fn pushed(&self) -> Vec<String> {
        self.pushed.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LocationPort for RecordingLocation {
    fn fragment(&self) -> Option<String> {
        self.fragment.lock().ok().and_then(|f| f.clone())
    }

    fn push(&self, fragment: &str) {
        if let Ok(mut current) = self.fragment.lock() {
            *current = Some(fragment.to_string());
        }
        if let Ok(mut pushed) = self.pushed.lock() {
            pushed.push(fragment.to_string());
        }
    }
}

/// A region that remembers whether it is visible.
#[derive(Default)]
pub struct FlagRegion {
    visible: Mutex<bool>,
}

impl FlagRegion {
    pub fn is_visible(&self) -> bool {
        self.visible.lock().map(|v| *v).unwrap_or(false)
    }
}

impl PageRegion for FlagRegion {
    fn show(&self) {
        if let Ok(mut v) = self.visible.lock() {
            *v = true;
        }
    }

    fn hide(&self) {
        if let Ok(mut v) = self.visible.lock() {
            *v = false;
        }
    }
}

// ============================================================================
// Gateway
// ============================================================================

fn unset<T>(operation: &str) -> Result<T> {
    Err(FlexiError::internal(format!("stub gateway: {operation} not configured")))
}

/// Scripted gateway that records which operations were called.
///
/// Each operation answers with whatever was configured for it, or an
/// internal error when nothing was.
#[derive(Default)]
pub struct StubGateway {
    token: Mutex<Option<String>>,
    calls: Mutex<Vec<String>>,
    profile: Mutex<Option<Result<User>>>,
    auth: Mutex<Option<Result<AuthResponse>>>,
    updated_profile: Mutex<Option<Result<User>>>,
    jobs: Mutex<Option<Result<Vec<Job>>>>,
    job: Mutex<Option<Result<Job>>>,
    categories: Mutex<Option<Result<Vec<JobCategory>>>>,
    contract: Mutex<Option<Result<Contract>>>,
    my_jobs: Mutex<Option<Result<Vec<Job>>>>,
    proposals: Mutex<Option<Result<Vec<Proposal>>>>,
    contracts: Mutex<Option<Result<Vec<Contract>>>>,
    payments: Mutex<Option<Result<Vec<Payment>>>>,
    summary: Mutex<Option<Result<EarningsSummary>>>,
    conversations: Mutex<Option<Result<Vec<Conversation>>>>,
    messages: Mutex<HashMap<ConversationId, Vec<Message>>>,
    sent: Mutex<Option<Result<Message>>>,
    last_filters: Mutex<Option<JobFilters>>,
}

macro_rules! setter {
    ($name:ident, $field:ident, $ty:ty) => {
        pub fn $name(&self, value: Result<$ty>) {
            if let Ok(mut slot) = self.$field.lock() {
                *slot = Some(value);
            }
        }
    };
}

impl StubGateway {
    pub fn new() -> Self {
        Self::default()
    }

    setter!(set_profile, profile, User);
    setter!(set_auth, auth, AuthResponse);
    setter!(set_updated_profile, updated_profile, User);
    setter!(set_jobs, jobs, Vec<Job>);
    setter!(set_job, job, Job);
    setter!(set_categories, categories, Vec<JobCategory>);
    setter!(set_contract, contract, Contract);
    setter!(set_my_jobs, my_jobs, Vec<Job>);
    setter!(set_proposals, proposals, Vec<Proposal>);
    setter!(set_contracts, contracts, Vec<Contract>);
    setter!(set_payments, payments, Vec<Payment>);
    setter!(set_summary, summary, EarningsSummary);
    setter!(set_conversations, conversations, Vec<Conversation>);
    setter!(set_sent, sent, Message);

    pub fn set_messages(&self, conversation_id: ConversationId, messages: Vec<Message>) {
        if let Ok(mut map) = self.messages.lock() {
            map.insert(conversation_id, messages);
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == operation).count()
    }

    pub fn current_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    pub fn last_filters(&self) -> Option<JobFilters> {
        self.last_filters.lock().ok().and_then(|f| f.clone())
    }

    fn record(&self, operation: impl Into<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(operation.into());
        }
    }

    fn answer<T: Clone>(&self, slot: &Mutex<Option<Result<T>>>, operation: &str) -> Result<T> {
        self.record(operation);
        match slot.lock() {
            Ok(guard) => guard.clone().unwrap_or_else(|| unset(operation)),
            Err(_) => unset(operation),
        }
    }
}

#[async_trait]
impl BackendGateway for StubGateway {
    fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = token;
        }
    }

    async fn register(&self, _registration: &Registration) -> Result<AuthResponse> {
        self.answer(&self.auth, "register")
    }

    async fn login(&self, _credentials: &Credentials) -> Result<AuthResponse> {
        self.answer(&self.auth, "login")
    }

    async fn profile(&self) -> Result<User> {
        self.answer(&self.profile, "profile")
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> Result<User> {
        self.answer(&self.updated_profile, "update_profile")
    }

    async fn jobs(&self, filters: &JobFilters) -> Result<Vec<Job>> {
        if let Ok(mut last) = self.last_filters.lock() {
            *last = Some(filters.clone());
        }
        self.answer(&self.jobs, "jobs")
    }

    /// Answers with a client-less sample job unless one was configured.
    async fn job(&self, job_id: u64) -> Result<Job> {
        self.record("job");
        match self.job.lock() {
            Ok(guard) => guard.clone().unwrap_or_else(|| Ok(sample_job(job_id, "Job"))),
            Err(_) => unset("job"),
        }
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job> {
        self.record("create_job");
        Ok(sample_job(100, &job.title))
    }

    async fn my_jobs(&self) -> Result<Vec<Job>> {
        self.answer(&self.my_jobs, "my_jobs")
    }

    async fn job_categories(&self) -> Result<Vec<JobCategory>> {
        self.record("job_categories");
        match self.categories.lock() {
            Ok(guard) => guard.clone().unwrap_or_else(|| Ok(Vec::new())),
            Err(_) => unset("job_categories"),
        }
    }

    async fn submit_proposal(&self, job_id: u64, proposal: &NewProposal) -> Result<Proposal> {
        self.record("submit_proposal");
        Ok(Proposal {
            id: 1,
            job: serde_json::json!(job_id),
            freelancer: None,
            cover_letter: proposal.cover_letter.clone(),
            bid_amount: proposal.bid_amount,
            delivery_time: proposal.delivery_time,
            status: Default::default(),
            created_at: String::new(),
        })
    }

    async fn my_proposals(&self) -> Result<Vec<Proposal>> {
        self.answer(&self.proposals, "my_proposals")
    }

    async fn job_proposals(&self, _job_id: u64) -> Result<Vec<Proposal>> {
        self.answer(&self.proposals, "job_proposals")
    }

    async fn accept_proposal(&self, _proposal_id: u64) -> Result<serde_json::Value> {
        self.record("accept_proposal");
        Ok(serde_json::json!({ "status": "accepted" }))
    }

    async fn my_contracts(&self) -> Result<Vec<Contract>> {
        self.answer(&self.contracts, "my_contracts")
    }

    async fn contract(&self, contract_id: u64) -> Result<Contract> {
        self.record("contract");
        match self.contract.lock() {
            Ok(guard) => guard
                .clone()
                .unwrap_or_else(|| Err(FlexiError::not_found("contract", contract_id))),
            Err(_) => unset("contract"),
        }
    }

    async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.answer(&self.conversations, "conversations")
    }

    async fn start_conversation(&self, recipient_id: u64) -> Result<Conversation> {
        self.record("start_conversation");
        Ok(Conversation {
            id: recipient_id,
            participants: Vec::new(),
            last_message: None,
            unread_count: 0,
            created_at: String::new(),
            updated_at: String::new(),
        })
    }

    async fn messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        self.record(format!("messages:{conversation_id}"));
        match self.messages.lock() {
            Ok(map) => map
                .get(&conversation_id)
                .cloned()
                .ok_or_else(|| FlexiError::backend(404, "Not found.")),
            Err(_) => unset("messages"),
        }
    }

    async fn send_message(
        &self,
        conversation_id: ConversationId,
        _content: &str,
    ) -> Result<Message> {
        self.answer(&self.sent, &format!("send_message:{conversation_id}"))
    }

    async fn payment_history(&self) -> Result<Vec<Payment>> {
        self.answer(&self.payments, "payment_history")
    }

    async fn earnings(&self) -> Result<Vec<Payment>> {
        self.answer(&self.payments, "earnings")
    }

    async fn earnings_summary(&self) -> Result<EarningsSummary> {
        self.answer(&self.summary, "earnings_summary")
    }
}
