//! Per-page content loaders invoked by the router.
//!
//! Each loader fetches through the gateway and renders through the
//! [`PageView`]; every failure ends as a toast, never as an error to the
//! caller.

use std::sync::Arc;

use async_trait::async_trait;
use flexi_core::error::Result;
use flexi_core::gateway::BackendGateway;
use flexi_core::marketplace::JobFilters;
use flexi_core::messaging::PollingChannel;
use flexi_core::navigation::{PageId, PageLoader};
use flexi_core::session::SessionState;
use flexi_core::ui::Notifier;
use flexi_core::user::{User, UserType};
use tokio::sync::Mutex;

use crate::dashboard::{ClientDashboard, Dashboard, FreelancerDashboard};
use crate::preferences::{DraftStore, PROFILE_DRAFT, SearchHistory, ThemeService};
use crate::view::PageView;

const HOME_RECENT_JOBS: usize = 5;

pub const JOBS_FAILED_TOAST: &str = "Failed to load jobs";
pub const DASHBOARD_FAILED_TOAST: &str = "Failed to load dashboard";
pub const CONVERSATIONS_FAILED_TOAST: &str = "Failed to load conversations";
pub const PROFILE_FAILED_TOAST: &str = "Failed to load profile";

pub struct PageLoaders {
    gateway: Arc<dyn BackendGateway>,
    session: Arc<SessionState>,
    view: Arc<dyn PageView>,
    notifier: Arc<dyn Notifier>,
    polling: Arc<PollingChannel>,
    search_history: Arc<SearchHistory>,
    themes: Arc<ThemeService>,
    drafts: Arc<DraftStore>,
    filters: Mutex<JobFilters>,
}

impl PageLoaders {
    pub fn new(
        gateway: Arc<dyn BackendGateway>,
        session: Arc<SessionState>,
        view: Arc<dyn PageView>,
        notifier: Arc<dyn Notifier>,
        polling: Arc<PollingChannel>,
        search_history: Arc<SearchHistory>,
        themes: Arc<ThemeService>,
        drafts: Arc<DraftStore>,
    ) -> Self {
        Self {
            gateway,
            session,
            view,
            notifier,
            polling,
            search_history,
            themes,
            drafts,
            filters: Mutex::new(JobFilters::default()),
        }
    }

    /// Filters used by the next jobs page load.
    pub async fn set_filters(&self, filters: JobFilters) {
        *self.filters.lock().await = filters;
    }

    pub async fn filters(&self) -> JobFilters {
        self.filters.lock().await.clone()
    }

    async fn load_home(&self) {
        match self.gateway.jobs(&JobFilters::default()).await {
            Ok(jobs) => {
                let recent: Vec<_> = jobs.into_iter().take(HOME_RECENT_JOBS).collect();
                self.view.render_jobs(PageId::Home, &recent);
            }
            Err(e) => {
                tracing::warn!("[Loaders] Failed to load recent jobs: {}", e);
                self.notifier.error(JOBS_FAILED_TOAST);
            }
        }
    }

    async fn load_jobs(&self) {
        let filters = self.filters().await;
        if let Some(term) = filters.search.as_deref() {
            self.search_history.record(term.trim()).await;
        }

        match self.gateway.jobs(&filters).await {
            Ok(jobs) => self.view.render_jobs(PageId::Jobs, &jobs),
            Err(e) => {
                tracing::warn!("[Loaders] Failed to load jobs: {}", e);
                self.notifier.error(JOBS_FAILED_TOAST);
            }
        }
    }

    async fn load_dashboard(&self) {
        let Some(user) = self.session.current_user().await else {
            return;
        };

        match self.fetch_dashboard(&user).await {
            Ok(dashboard) => self.view.render_dashboard(&dashboard),
            Err(e) => {
                tracing::warn!("[Loaders] Failed to load dashboard: {}", e);
                self.notifier.error(DASHBOARD_FAILED_TOAST);
            }
        }
    }

    async fn fetch_dashboard(&self, user: &User) -> Result<Dashboard> {
        match user.user_type {
            UserType::Freelancer => {
                let (proposals, contracts, earnings) = futures::try_join!(
                    self.gateway.my_proposals(),
                    self.gateway.my_contracts(),
                    self.gateway.earnings_summary(),
                )?;
                Ok(Dashboard::Freelancer(FreelancerDashboard::new(
                    proposals, contracts, &earnings,
                )))
            }
            UserType::Client => {
                let (jobs, payments) = futures::try_join!(
                    self.gateway.my_jobs(),
                    self.gateway.payment_history(),
                )?;
                Ok(Dashboard::Client(ClientDashboard::new(jobs, &payments)))
            }
            UserType::Admin => Ok(Dashboard::Empty),
        }
    }

    async fn load_messages(&self) {
        let Some(user) = self.session.current_user().await else {
            return;
        };

        match self.gateway.conversations().await {
            Ok(conversations) => self.view.render_conversations(&conversations, &user),
            Err(e) => {
                tracing::warn!("[Loaders] Failed to load conversations: {}", e);
                self.notifier.error(CONVERSATIONS_FAILED_TOAST);
            }
        }
    }

    /// Renders the profile, then lays any unsaved edits over it.
    async fn load_profile(&self) {
        match self.gateway.profile().await {
            Ok(user) => {
                self.view.render_profile(&user);
                if let Some(fields) = self.drafts.load(PROFILE_DRAFT).await {
                    self.view.restore_draft(PROFILE_DRAFT, &fields);
                }
            }
            Err(e) => {
                tracing::warn!("[Loaders] Failed to load profile: {}", e);
                self.notifier.error(PROFILE_FAILED_TOAST);
            }
        }
    }
}

#[async_trait]
impl PageLoader for PageLoaders {
    async fn load(&self, page: PageId) {
        tracing::debug!("[Loaders] Loading '{}'", page);
        match page {
            PageId::Home => self.load_home().await,
            PageId::Jobs => self.load_jobs().await,
            PageId::Dashboard => self.load_dashboard().await,
            PageId::Messages => self.load_messages().await,
            PageId::Profile => self.load_profile().await,
            PageId::Settings => self.view.render_settings(self.themes.current().await),
        }
    }

    async fn leave(&self, page: PageId) {
        if page == PageId::Messages {
            self.polling.close().await;
        }
    }
}
