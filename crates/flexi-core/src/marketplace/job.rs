use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BudgetType {
    #[default]
    Fixed,
    Hourly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Intermediate,
    Expert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    Open,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCategory {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<JobCategory>,
    #[serde(default)]
    pub budget_type: BudgetType,
    #[serde(default, deserialize_with = "crate::amount::deserialize")]
    pub budget_min: f64,
    #[serde(default, deserialize_with = "crate::amount::deserialize_option")]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub proposals_count: u32,
    #[serde(default)]
    pub created_at: String,
}

/// `jobs/` answers either with a paginated envelope or a bare array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum JobListing {
    Paginated { results: Vec<Job> },
    Plain(Vec<Job>),
}

impl JobListing {
    pub fn into_jobs(self) -> Vec<Job> {
        match self {
            JobListing::Paginated { results } => results,
            JobListing::Plain(jobs) => jobs,
        }
    }
}

/// Filters of the job search form, sent as query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFilters {
    pub search: Option<String>,
    pub category: Option<u64>,
    pub budget_type: Option<BudgetType>,
    pub experience_level: Option<ExperienceLevel>,
}

impl JobFilters {
    pub fn with_search(search: impl Into<String>) -> Self {
        Self {
            search: Some(search.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query_pairs().is_empty()
    }

    /// Query pairs in a stable order; blank searches are dropped.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = self.search.as_deref().map(str::trim)
            && !search.is_empty()
        {
            pairs.push(("search", search.to_string()));
        }
        if let Some(category) = self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(budget_type) = self.budget_type {
            pairs.push(("budget_type", budget_type.to_string()));
        }
        if let Some(level) = self.experience_level {
            pairs.push(("experience_level", level.to_string()));
        }
        pairs
    }
}

/// Body of `POST jobs/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJob {
    pub title: String,
    pub description: String,
    pub category: Option<u64>,
    pub budget_type: BudgetType,
    pub budget_min: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,
    pub experience_level: ExperienceLevel,
    pub skills_required: Vec<String>,
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_both_shapes() {
        let paginated: JobListing = serde_json::from_str(
            r#"{"count": 1, "next": null, "results": [{"id": 1, "title": "Logo", "budget_min": "50.00"}]}"#,
        )
        .unwrap();
        assert_eq!(paginated.into_jobs().len(), 1);

        let plain: JobListing =
            serde_json::from_str(r#"[{"id": 1, "title": "A"}, {"id": 2, "title": "B", "status": "in_progress"}]"#)
                .unwrap();
        let jobs = plain.into_jobs();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[1].status, JobStatus::InProgress);
    }

    #[test]
    fn test_query_pairs_skip_blank_search() {
        let filters = JobFilters {
            search: Some("   ".into()),
            budget_type: Some(BudgetType::Hourly),
            ..JobFilters::default()
        };
        assert_eq!(filters.query_pairs(), vec![("budget_type", "hourly".to_string())]);
        assert!(JobFilters::default().is_empty());
    }

    #[test]
    fn test_query_pairs_order() {
        let filters = JobFilters {
            search: Some(" rust ".into()),
            category: Some(4),
            budget_type: None,
            experience_level: Some(ExperienceLevel::Expert),
        };
        assert_eq!(
            filters.query_pairs(),
            vec![
                ("search", "rust".to_string()),
                ("category", "4".to_string()),
                ("experience_level", "expert".to_string()),
            ]
        );
    }
}
