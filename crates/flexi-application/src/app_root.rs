//! The composition of session, router, polling and use cases, and the one
//! table that routes UI events to them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use flexi_core::gateway::{BackendGateway, Registration};
use flexi_core::marketplace::{JobFilters, NewJob, NewProposal};
use flexi_core::messaging::{ConversationId, GatewayMessageSource, MessageView, PollingChannel};
use flexi_core::navigation::{NavigationRouter, PageId};
use flexi_core::session::{SessionSignal, SessionState};
use flexi_core::store::KeyValueStore;
use flexi_core::ui::{LocationPort, Notifier, PageRegion};
use flexi_core::user::ProfileUpdate;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use strum::{Display, EnumDiscriminants, EnumIter, IntoEnumIterator};
use tokio::sync::Mutex;
use tokio::sync::broadcast::{self, error::TryRecvError};

use crate::auth_usecase::AuthUseCase;
use crate::jobs_service::JobsService;
use crate::loaders::PageLoaders;
use crate::messaging_service::MessagingService;
use crate::preferences::{
    DraftAutosave, DraftStore, POST_JOB_DRAFT, PROFILE_DRAFT, SearchHistory, ThemeService,
};
use crate::view::PageView;

pub const CONNECTION_RESTORED_TOAST: &str = "Connection restored";
pub const CONNECTION_LOST_TOAST: &str = "No internet connection";

/// Everything the presentation layer can ask of the application.
#[derive(Debug, Clone, EnumDiscriminants)]
#[strum_discriminants(name(UiEventKind), derive(Hash, EnumIter, Display))]
pub enum UiEvent {
    NavLinkClicked(PageId),
    /// Back/forward navigation to the given fragment.
    LocationChanged(Option<String>),
    LoginSubmitted { username: String, password: String },
    RegisterSubmitted(Registration),
    LogoutClicked,
    JobSelected(u64),
    PostJobClicked,
    JobSubmitted(NewJob),
    ProposalSubmitted { job_id: u64, proposal: NewProposal },
    ProposalAccepted(u64),
    /// Contact the client who posted the job.
    ContactClientClicked(u64),
    ContractSelected(u64),
    EarningsRequested,
    /// Opens the messages page first when another page is showing.
    ConversationSelected(ConversationId),
    MessageSubmitted { conversation_id: ConversationId, content: String },
    ProfileSubmitted(ProfileUpdate),
    /// A form was edited; its draft is written once the form goes quiet.
    DraftChanged { form: String, fields: Map<String, Value> },
    ThemeToggled,
    SearchSubmitted(String),
    ConnectivityChanged { online: bool },
    EscapePressed,
}

/// Collaborators supplied by the composition root.
pub struct AppParts {
    pub gateway: Arc<dyn BackendGateway>,
    pub store: Arc<dyn KeyValueStore>,
    pub notifier: Arc<dyn Notifier>,
    pub location: Arc<dyn LocationPort>,
    pub regions: HashMap<PageId, Arc<dyn PageRegion>>,
    pub page_view: Arc<dyn PageView>,
    pub message_view: Arc<dyn MessageView>,
    pub poll_interval: Duration,
    pub search_history_limit: usize,
}

type Handler = for<'a> fn(&'a AppRoot, UiEvent) -> BoxFuture<'a, ()>;

/// Owns every long-lived object of the client; nothing is global.
pub struct AppRoot {
    session: Arc<SessionState>,
    router: NavigationRouter,
    polling: Arc<PollingChannel>,
    loaders: Arc<PageLoaders>,
    auth: AuthUseCase,
    jobs: JobsService,
    messaging: MessagingService,
    themes: Arc<ThemeService>,
    drafts: Arc<DraftStore>,
    autosave: DraftAutosave,
    search_history: Arc<SearchHistory>,
    page_view: Arc<dyn PageView>,
    notifier: Arc<dyn Notifier>,
    handlers: HashMap<UiEventKind, Handler>,
    signals: Mutex<broadcast::Receiver<SessionSignal>>,
}

impl AppRoot {
    pub fn new(parts: AppParts) -> Self {
        let AppParts {
            gateway,
            store,
            notifier,
            location,
            regions,
            page_view,
            message_view,
            poll_interval,
            search_history_limit,
        } = parts;

        let session = Arc::new(SessionState::new(
            gateway.clone(),
            store.clone(),
            notifier.clone(),
        ));
        let signals = Mutex::new(session.subscribe());

        let polling = Arc::new(
            PollingChannel::new(
                Arc::new(GatewayMessageSource::new(gateway.clone())),
                message_view,
                notifier.clone(),
            )
            .with_interval(poll_interval),
        );
        let search_history = Arc::new(SearchHistory::new(store.clone(), search_history_limit));
        let themes = Arc::new(ThemeService::new(store.clone()));
        let drafts = Arc::new(DraftStore::new(store));

        let loaders = Arc::new(PageLoaders::new(
            gateway.clone(),
            session.clone(),
            page_view.clone(),
            notifier.clone(),
            polling.clone(),
            search_history.clone(),
            themes.clone(),
            drafts.clone(),
        ));
        let router = NavigationRouter::new(session.clone(), location, loaders.clone(), regions);

        Self {
            auth: AuthUseCase::new(gateway.clone(), session.clone(), notifier.clone()),
            jobs: JobsService::new(gateway.clone(), session.clone(), notifier.clone()),
            messaging: MessagingService::new(gateway, session.clone(), polling.clone(), notifier.clone()),
            autosave: DraftAutosave::new(drafts.clone()),
            drafts,
            session,
            router,
            polling,
            loaders,
            themes,
            search_history,
            page_view,
            notifier,
            handlers: handler_table(),
            signals,
        }
    }

    /// Restores the session and shows the initial page.
    ///
    /// The initial page comes from the location fragment without pushing
    /// history; a protected page that is refused falls back to home.
    pub async fn start(&self) -> PageId {
        let restored = self.session.restore().await;
        tracing::info!("[App] Starting ({})", if restored { "signed in" } else { "anonymous" });

        self.page_view.apply_theme(self.themes.current().await);

        let initial = self.router.initial_page();
        if !self.navigate(initial, false).await {
            self.navigate(PageId::Home, false).await;
        }

        self.drain_signals().await;
        self.router.current_page().await
    }

    /// Routes `event` through the handler table, then reacts to whatever the
    /// session signalled meanwhile.
    pub async fn dispatch(&self, event: UiEvent) {
        let kind = UiEventKind::from(&event);
        tracing::debug!("[App] Dispatching {}", kind);
        match self.handlers.get(&kind) {
            Some(handler) => handler(self, event).await,
            None => tracing::warn!("[App] No handler registered for {}", kind),
        }
        self.drain_signals().await;
    }

    /// Navigates and waits for the page's load hook. Returns `false` when refused.
    pub async fn navigate(&self, page: PageId, push_history: bool) -> bool {
        let navigation = self.router.navigate_to(page, push_history).await;
        let shown = !navigation.is_refused();
        navigation.loaded().await;
        shown
    }

    /// Reloads the current page when it lists jobs, proposals or contracts.
    async fn reload_listing(&self) {
        let page = self.router.current_page().await;
        if matches!(page, PageId::Home | PageId::Jobs | PageId::Dashboard) {
            self.navigate(page, false).await;
        }
    }

    async fn drain_signals(&self) {
        let pending = {
            let mut signals = self.signals.lock().await;
            let mut pending = Vec::new();
            loop {
                match signals.try_recv() {
                    Ok(signal) => pending.push(signal),
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!("[App] Missed {} session signals", skipped);
                    }
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
            pending
        };

        for signal in pending {
            match signal {
                SessionSignal::Refreshed(user) => {
                    if user.is_none() {
                        self.polling.close().await;
                    }
                    self.page_view.refresh_auth_chrome(user.as_ref());
                }
                SessionSignal::LoginRequested => self.page_view.show_login_prompt(),
                SessionSignal::NavigateHome => {
                    self.navigate(PageId::Home, true).await;
                }
            }
        }
    }

    pub fn session(&self) -> &Arc<SessionState> {
        &self.session
    }

    pub fn router(&self) -> &NavigationRouter {
        &self.router
    }

    pub fn polling(&self) -> &Arc<PollingChannel> {
        &self.polling
    }

    pub fn loaders(&self) -> &Arc<PageLoaders> {
        &self.loaders
    }

    pub fn jobs(&self) -> &JobsService {
        &self.jobs
    }

    pub fn messaging(&self) -> &MessagingService {
        &self.messaging
    }

    pub fn themes(&self) -> &ThemeService {
        &self.themes
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn autosave(&self) -> &DraftAutosave {
        &self.autosave
    }

    pub fn search_history(&self) -> &SearchHistory {
        &self.search_history
    }
}

// ============================================================================
// Event table
// ============================================================================

fn handler_table() -> HashMap<UiEventKind, Handler> {
    UiEventKind::iter()
        .map(|kind| {
            let handler: Handler = match kind {
                UiEventKind::NavLinkClicked => on_nav_link_clicked,
                UiEventKind::LocationChanged => on_location_changed,
                UiEventKind::LoginSubmitted => on_login_submitted,
                UiEventKind::RegisterSubmitted => on_register_submitted,
                UiEventKind::LogoutClicked => on_logout_clicked,
                UiEventKind::JobSelected => on_job_selected,
                UiEventKind::PostJobClicked => on_post_job_clicked,
                UiEventKind::JobSubmitted => on_job_submitted,
                UiEventKind::ProposalSubmitted => on_proposal_submitted,
                UiEventKind::ProposalAccepted => on_proposal_accepted,
                UiEventKind::ContactClientClicked => on_contact_client_clicked,
                UiEventKind::ContractSelected => on_contract_selected,
                UiEventKind::EarningsRequested => on_earnings_requested,
                UiEventKind::ConversationSelected => on_conversation_selected,
                UiEventKind::MessageSubmitted => on_message_submitted,
                UiEventKind::ProfileSubmitted => on_profile_submitted,
                UiEventKind::DraftChanged => on_draft_changed,
                UiEventKind::ThemeToggled => on_theme_toggled,
                UiEventKind::SearchSubmitted => on_search_submitted,
                UiEventKind::ConnectivityChanged => on_connectivity_changed,
                UiEventKind::EscapePressed => on_escape_pressed,
            };
            (kind, handler)
        })
        .collect()
}

fn on_nav_link_clicked(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::NavLinkClicked(page) = event {
            root.navigate(page, true).await;
        }
    })
}

fn on_location_changed(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::LocationChanged(fragment) = event {
            root.router
                .handle_location_change(fragment.as_deref())
                .await
                .loaded()
                .await;
        }
    })
}

fn on_login_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::LoginSubmitted { username, password } = event
            && root.auth.login(&username, &password).await.is_some()
        {
            root.navigate(PageId::Dashboard, true).await;
        }
    })
}

fn on_register_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::RegisterSubmitted(registration) = event
            && root.auth.register(&registration).await.is_some()
        {
            root.navigate(PageId::Dashboard, true).await;
        }
    })
}

fn on_logout_clicked(root: &AppRoot, _event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        root.auth.logout().await;
    })
}

fn on_job_selected(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::JobSelected(job_id) = event
            && let Some(detail) = root.jobs.job_detail(job_id).await
        {
            root.page_view.render_job_detail(&detail);
        }
    })
}

fn on_post_job_clicked(root: &AppRoot, _event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let Some(categories) = root.jobs.post_job_form().await else {
            return;
        };
        root.page_view.show_post_job_form(&categories);
        if let Some(fields) = root.drafts.load(POST_JOB_DRAFT).await {
            root.page_view.restore_draft(POST_JOB_DRAFT, &fields);
        }
    })
}

fn on_job_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::JobSubmitted(job) = event
            && root.jobs.post_job(&job).await.is_some()
        {
            root.autosave.discard(POST_JOB_DRAFT).await;
            root.page_view.close_modals();
            root.reload_listing().await;
        }
    })
}

fn on_proposal_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ProposalSubmitted { job_id, proposal } = event
            && root.jobs.submit_proposal(job_id, &proposal).await.is_some()
        {
            root.page_view.close_modals();
            root.reload_listing().await;
        }
    })
}

fn on_proposal_accepted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ProposalAccepted(proposal_id) = event
            && root.jobs.accept_proposal(proposal_id).await
        {
            root.reload_listing().await;
        }
    })
}

fn on_contact_client_clicked(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ContactClientClicked(job_id) = event {
            root.jobs.contact_client(job_id).await;
        }
    })
}

fn on_contract_selected(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ContractSelected(contract_id) = event
            && let Some(contract) = root.jobs.contract(contract_id).await
        {
            root.page_view.render_contract(&contract);
        }
    })
}

fn on_earnings_requested(root: &AppRoot, _event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let Some(payments) = root.jobs.earnings().await {
            root.page_view.render_earnings(&payments);
        }
    })
}

fn on_conversation_selected(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ConversationSelected(conversation_id) = event {
            // Polling lives only as long as the messages page.
            if root.router.current_page().await != PageId::Messages
                && !root.navigate(PageId::Messages, true).await
            {
                return;
            }
            root.messaging.select_conversation(conversation_id).await;
        }
    })
}

fn on_message_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::MessageSubmitted {
            conversation_id,
            content,
        } = event
        {
            root.messaging.send_message(conversation_id, &content).await;
        }
    })
}

fn on_profile_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ProfileSubmitted(update) = event
            && let Some(user) = root.auth.update_profile(&update).await
        {
            root.autosave.discard(PROFILE_DRAFT).await;
            root.page_view.render_profile(&user);
        }
    })
}

fn on_draft_changed(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::DraftChanged { form, fields } = event {
            root.autosave.schedule(&form, fields).await;
        }
    })
}

fn on_theme_toggled(root: &AppRoot, _event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        let theme = root.themes.toggle().await;
        root.page_view.apply_theme(theme);
    })
}

fn on_search_submitted(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::SearchSubmitted(term) = event {
            let filters = if term.trim().is_empty() {
                JobFilters::default()
            } else {
                JobFilters::with_search(term.trim())
            };
            root.loaders.set_filters(filters).await;
            root.navigate(PageId::Jobs, true).await;
        }
    })
}

fn on_connectivity_changed(root: &AppRoot, event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        if let UiEvent::ConnectivityChanged { online } = event {
            if online {
                root.notifier.success(CONNECTION_RESTORED_TOAST);
            } else {
                root.notifier.warning(CONNECTION_LOST_TOAST);
            }
        }
    })
}

fn on_escape_pressed(root: &AppRoot, _event: UiEvent) -> BoxFuture<'_, ()> {
    Box::pin(async move {
        root.page_view.close_modals();
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_event_kind_has_a_handler() {
        let table = handler_table();
        for kind in UiEventKind::iter() {
            assert!(table.contains_key(&kind), "missing handler for {kind}");
        }
    }

    #[test]
    fn test_event_kind_of_event() {
        assert_eq!(
            UiEventKind::from(&UiEvent::ConnectivityChanged { online: true }),
            UiEventKind::ConnectivityChanged
        );
        assert_eq!(
            UiEventKind::from(&UiEvent::NavLinkClicked(PageId::Jobs)),
            UiEventKind::NavLinkClicked
        );
    }
}
