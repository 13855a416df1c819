//! Marketplace records consumed from the backend.
//!
//! The client never owns these; it fetches, renders and occasionally posts
//! a new one. Matching rules live on the server.

mod contract;
mod job;
mod payment;
mod proposal;

pub use contract::{Contract, ContractStatus};
pub use job::{BudgetType, ExperienceLevel, Job, JobCategory, JobFilters, JobListing, JobStatus, NewJob};
pub use payment::{EarningsSummary, Payment, PaymentStatus};
pub use proposal::{NewProposal, Proposal, ProposalStatus};
