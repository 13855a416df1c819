//! reqwest implementation of [`BackendGateway`].

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use flexi_core::config::ClientConfig;
use flexi_core::error::{FlexiError, Result};
use flexi_core::gateway::{AuthResponse, BackendGateway, Credentials, Registration};
use flexi_core::marketplace::{
    Contract, EarningsSummary, Job, JobCategory, JobFilters, JobListing, NewJob, NewProposal,
    Payment, Proposal,
};
use flexi_core::messaging::{Conversation, ConversationId, Message};
use flexi_core::user::{ProfileUpdate, User};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::error_normalizer::normalize_error_message;

/// Whether a call carries the bearer credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    Public,
    Authenticated,
}

pub struct HttpGateway {
    client: Client,
    base_url: String,
    token: RwLock<Option<String>>,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlexiError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn bearer(&self) -> Option<String> {
        self.token.read().ok().and_then(|token| token.clone())
    }

    fn request(&self, method: Method, path: &str, access: Access) -> RequestBuilder {
        tracing::debug!("[Gateway] {} {}", method, path);
        let mut request = self.client.request(method, self.url(path));
        if access == Access::Authenticated
            && let Some(token) = self.bearer()
        {
            request = request.bearer_auth(token);
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("[Gateway] Request failed: {}", e);
            FlexiError::transport(e.to_string())
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FlexiError::transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = normalize_error_message(
                status.as_u16(),
                status.canonical_reason().unwrap_or(""),
                &body,
            );
            tracing::warn!("[Gateway] Backend answered {}: {}", status.as_u16(), message);
            return Err(FlexiError::backend(status.as_u16(), message));
        }

        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| {
            tracing::warn!("[Gateway] Undecodable {} response: {}", status.as_u16(), e);
            FlexiError::malformed(e.to_string())
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, access: Access) -> Result<T> {
        self.send(self.request(Method::GET, path, access)).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        access: Access,
        body: &B,
    ) -> Result<T> {
        self.send(self.request(Method::POST, path, access).json(body))
            .await
    }
}

#[async_trait]
impl BackendGateway for HttpGateway {
    fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.write() {
            *slot = token;
        }
    }

    async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        self.post("auth/register/", Access::Public, registration).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        self.post("auth/login/", Access::Public, credentials).await
    }

    async fn profile(&self) -> Result<User> {
        self.get("auth/profile/", Access::Authenticated).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        let request = self
            .request(Method::PUT, "auth/profile/update/", Access::Authenticated)
            .json(update);
        self.send(request).await
    }

    async fn jobs(&self, filters: &JobFilters) -> Result<Vec<Job>> {
        let request = self
            .request(Method::GET, "jobs/", Access::Public)
            .query(&filters.query_pairs());
        let listing: JobListing = self.send(request).await?;
        Ok(listing.into_jobs())
    }

    async fn job(&self, job_id: u64) -> Result<Job> {
        self.get(&format!("jobs/{}/", job_id), Access::Public).await
    }

    async fn create_job(&self, job: &NewJob) -> Result<Job> {
        self.post("jobs/", Access::Authenticated, job).await
    }

    async fn my_jobs(&self) -> Result<Vec<Job>> {
        let listing: JobListing = self.get("jobs/my-jobs/", Access::Authenticated).await?;
        Ok(listing.into_jobs())
    }

    async fn job_categories(&self) -> Result<Vec<JobCategory>> {
        self.get("jobs/categories/", Access::Public).await
    }

    async fn submit_proposal(&self, job_id: u64, proposal: &NewProposal) -> Result<Proposal> {
        self.post(
            &format!("proposals/job/{}/submit/", job_id),
            Access::Authenticated,
            proposal,
        )
        .await
    }

    async fn my_proposals(&self) -> Result<Vec<Proposal>> {
        self.get("proposals/my-proposals/", Access::Authenticated).await
    }

    async fn job_proposals(&self, job_id: u64) -> Result<Vec<Proposal>> {
        self.get(&format!("proposals/job/{}/", job_id), Access::Authenticated)
            .await
    }

    async fn accept_proposal(&self, proposal_id: u64) -> Result<serde_json::Value> {
        self.post(
            &format!("proposals/{}/accept/", proposal_id),
            Access::Authenticated,
            &json!({}),
        )
        .await
    }

    async fn my_contracts(&self) -> Result<Vec<Contract>> {
        self.get("contracts/my-contracts/", Access::Authenticated).await
    }

    async fn contract(&self, contract_id: u64) -> Result<Contract> {
        self.get(&format!("contracts/{}/", contract_id), Access::Authenticated)
            .await
    }

    async fn conversations(&self) -> Result<Vec<Conversation>> {
        self.get("messaging/conversations/", Access::Authenticated).await
    }

    async fn start_conversation(&self, recipient_id: u64) -> Result<Conversation> {
        self.post(
            "messaging/conversations/start/",
            Access::Authenticated,
            &json!({ "recipient_id": recipient_id }),
        )
        .await
    }

    async fn messages(&self, conversation_id: ConversationId) -> Result<Vec<Message>> {
        self.get(
            &format!("messaging/conversations/{}/messages/", conversation_id),
            Access::Authenticated,
        )
        .await
    }

    async fn send_message(
        &self,
        conversation_id: ConversationId,
        content: &str,
    ) -> Result<Message> {
        self.post(
            &format!("messaging/conversations/{}/messages/", conversation_id),
            Access::Authenticated,
            &json!({ "content": content }),
        )
        .await
    }

    async fn payment_history(&self) -> Result<Vec<Payment>> {
        self.get("payments/history/", Access::Authenticated).await
    }

    async fn earnings(&self) -> Result<Vec<Payment>> {
        self.get("payments/earnings/", Access::Authenticated).await
    }

    async fn earnings_summary(&self) -> Result<EarningsSummary> {
        self.get("payments/earnings/summary/", Access::Authenticated)
            .await
    }
}
