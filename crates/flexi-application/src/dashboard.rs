//! Dashboard figures, derived from the user's records.

use flexi_core::marketplace::{Contract, EarningsSummary, Job, JobStatus, Payment, Proposal};
use serde::Serialize;

const RECENT_ITEMS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreelancerDashboard {
    pub proposals_count: usize,
    pub contracts_count: usize,
    pub total_earned: f64,
    pub recent_proposals: Vec<Proposal>,
    pub recent_contracts: Vec<Contract>,
}

impl FreelancerDashboard {
    pub fn new(proposals: Vec<Proposal>, contracts: Vec<Contract>, earnings: &EarningsSummary) -> Self {
        Self {
            proposals_count: proposals.len(),
            contracts_count: contracts.len(),
            total_earned: earnings.total_earned,
            recent_proposals: proposals.into_iter().take(RECENT_ITEMS).collect(),
            recent_contracts: contracts.into_iter().take(RECENT_ITEMS).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientDashboard {
    pub active_jobs: usize,
    pub completed_jobs: usize,
    pub total_spent: f64,
    pub recent_jobs: Vec<Job>,
}

impl ClientDashboard {
    pub fn new(jobs: Vec<Job>, payments: &[Payment]) -> Self {
        let count = |status: JobStatus| jobs.iter().filter(|job| job.status == status).count();
        Self {
            active_jobs: count(JobStatus::Open),
            completed_jobs: count(JobStatus::Completed),
            total_spent: payments.iter().map(|payment| payment.amount).sum(),
            recent_jobs: jobs.into_iter().take(RECENT_ITEMS).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Dashboard {
    Freelancer(FreelancerDashboard),
    Client(ClientDashboard),
    /// Accounts with neither role (admins) have no dashboard figures.
    Empty,
}
