//! Role-gated marketplace actions.

use std::sync::Arc;

use flexi_core::gateway::BackendGateway;
use flexi_core::marketplace::{
    Contract, Job, JobCategory, NewJob, NewProposal, Payment, Proposal,
};
use flexi_core::messaging::Conversation;
use flexi_core::session::SessionState;
use flexi_core::ui::Notifier;
use flexi_core::user::User;

pub const CLIENTS_ONLY_TOAST: &str = "Only clients can post jobs";
pub const FREELANCERS_ONLY_TOAST: &str = "Only freelancers can submit proposals";
pub const JOB_POSTED_TOAST: &str = "Job posted successfully!";
pub const PROPOSAL_SUBMITTED_TOAST: &str = "Proposal submitted successfully!";
pub const CONVERSATION_STARTED_TOAST: &str = "Conversation started! Check your messages.";
pub const CLIENTS_ACCEPT_ONLY_TOAST: &str = "Only clients can accept proposals";
pub const PROPOSAL_ACCEPTED_TOAST: &str = "Proposal accepted!";
pub const NO_CLIENT_TOAST: &str = "This job has no client to contact";
pub const JOB_FAILED_TOAST: &str = "Failed to load job";
pub const CONTRACT_FAILED_TOAST: &str = "Failed to load contract";
pub const EARNINGS_FAILED_TOAST: &str = "Failed to load earnings";

/// A job plus the proposals on it, which only its own client gets to see.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDetail {
    pub job: Job,
    pub proposals: Vec<Proposal>,
}

pub struct JobsService {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionState>,
    notifier: Arc<dyn Notifier>,
}

impl JobsService {
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

    async fn signed_in_user(&self) -> Option<User> {
        if !self.session.require_authenticated().await {
            return None;
        }
        self.session.current_user().await
    }

    pub async fn post_job(&self, job: &NewJob) -> Option<Job> {
        let user = self.signed_in_user().await?;
        if !user.is_client() {
            self.notifier.error(CLIENTS_ONLY_TOAST);
            return None;
        }

        match self.gateway.create_job(job).await {
            Ok(created) => {
                tracing::info!("[Jobs] Posted job {}", created.id);
                self.notifier.success(JOB_POSTED_TOAST);
                Some(created)
            }
            Err(e) => {
                tracing::warn!("[Jobs] Failed to post job: {}", e);
                self.notifier.error(&e.user_message());
                None
            }
        }
    }

    pub async fn submit_proposal(&self, job_id: u64, proposal: &NewProposal) -> Option<Proposal> {
        let user = self.signed_in_user().await?;
        if !user.is_freelancer() {
            self.notifier.error(FREELANCERS_ONLY_TOAST);
            return None;
        }

        match self.gateway.submit_proposal(job_id, proposal).await {
            Ok(submitted) => {
                self.notifier.success(PROPOSAL_SUBMITTED_TOAST);
                Some(submitted)
            }
            Err(e) => {
                tracing::warn!("[Jobs] Failed to submit proposal for job {}: {}", job_id, e);
                self.notifier.error(&e.user_message());
                None
            }
        }
    }

    /// Opens a conversation with `recipient_id`, usually a job's client.
    pub async fn start_conversation(&self, recipient_id: u64) -> Option<Conversation> {
        self.signed_in_user().await?;

        match self.gateway.start_conversation(recipient_id).await {
            Ok(conversation) => {
                self.notifier.success(CONVERSATION_STARTED_TOAST);
                Some(conversation)
            }
            Err(e) => {
                tracing::warn!("[Jobs] Failed to start conversation with {}: {}", recipient_id, e);
                self.notifier.error(&e.user_message());
                None
            }
        }
    }

    /// Fetches a job; its owner also gets the proposals submitted to it.
    pub async fn job_detail(&self, job_id: u64) -> Option<JobDetail> {
        let job = match self.gateway.job(job_id).await {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!("[Jobs] Failed to load job {}: {}", job_id, e);
                self.notifier.error(JOB_FAILED_TOAST);
                return None;
            }
        };

        let owner = job.client.as_ref().map(|c| c.id);
        let is_owner = self
            .session
            .current_user()
            .await
            .is_some_and(|me| me.is_client() && Some(me.id) == owner);
        let proposals = if is_owner {
            self.gateway.job_proposals(job_id).await.unwrap_or_else(|e| {
                tracing::warn!("[Jobs] Failed to load proposals for job {}: {}", job_id, e);
                Vec::new()
            })
        } else {
            Vec::new()
        };

        Some(JobDetail { job, proposals })
    }

    /// Categories offered by the post-job form; empty when they cannot be loaded.
    pub async fn categories(&self) -> Vec<JobCategory> {
        self.gateway.job_categories().await.unwrap_or_else(|e| {
            tracing::warn!("[Jobs] Failed to load categories: {}", e);
            Vec::new()
        })
    }

    /// Opens the post-job form: clients only, with the category choices.
    pub async fn post_job_form(&self) -> Option<Vec<JobCategory>> {
        let user = self.signed_in_user().await?;
        if !user.is_client() {
            self.notifier.error(CLIENTS_ONLY_TOAST);
            return None;
        }
        Some(self.categories().await)
    }

    pub async fn accept_proposal(&self, proposal_id: u64) -> bool {
        let Some(user) = self.signed_in_user().await else {
            return false;
        };
        if !user.is_client() {
            self.notifier.error(CLIENTS_ACCEPT_ONLY_TOAST);
            return false;
        }

        match self.gateway.accept_proposal(proposal_id).await {
            Ok(_) => {
                tracing::info!("[Jobs] Accepted proposal {}", proposal_id);
                self.notifier.success(PROPOSAL_ACCEPTED_TOAST);
                true
            }
            Err(e) => {
                tracing::warn!("[Jobs] Failed to accept proposal {}: {}", proposal_id, e);
                self.notifier.error(&e.user_message());
                false
            }
        }
    }

    /// Starts a conversation with the client who posted `job_id`.
    pub async fn contact_client(&self, job_id: u64) -> Option<Conversation> {
        self.signed_in_user().await?;

        let client = match self.gateway.job(job_id).await {
            Ok(job) => job.client,
            Err(e) => {
                tracing::warn!("[Jobs] Failed to load job {}: {}", job_id, e);
                self.notifier.error(JOB_FAILED_TOAST);
                return None;
            }
        };
        let Some(client) = client else {
            self.notifier.error(NO_CLIENT_TOAST);
            return None;
        };
        self.start_conversation(client.id).await
    }

    pub async fn contract(&self, contract_id: u64) -> Option<Contract> {
        self.signed_in_user().await?;

        match self.gateway.contract(contract_id).await {
            Ok(contract) => Some(contract),
            Err(e) => {
                tracing::warn!("[Jobs] Failed to load contract {}: {}", contract_id, e);
                self.notifier.error(CONTRACT_FAILED_TOAST);
                None
            }
        }
    }

    /// Payments received by the signed-in freelancer.
    pub async fn earnings(&self) -> Option<Vec<Payment>> {
        self.signed_in_user().await?;

        match self.gateway.earnings().await {
            Ok(payments) => Some(payments),
            Err(e) => {
                tracing::warn!("[Jobs] Failed to load earnings: {}", e);
                self.notifier.error(EARNINGS_FAILED_TOAST);
                None
            }
        }
    }
}
