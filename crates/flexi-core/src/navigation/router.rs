use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use super::page::PageId;
use crate::session::SessionState;
use crate::ui::{LocationPort, PageRegion};

/// Per-page content hooks invoked by the router.
#[async_trait]
pub trait PageLoader: Send + Sync {
    /// Fetches and renders the content of `page`. Runs on its own task.
    async fn load(&self, page: PageId);

    /// Called when `page` stops being the visible page.
    async fn leave(&self, _page: PageId) {}
}

/// Result of [`NavigationRouter::navigate_to`].
#[derive(Debug)]
pub enum Navigation {
    /// The page is protected and nobody is signed in; nothing changed.
    Refused,
    /// The page is visible and its load hook is running.
    Completed { page: PageId, load: JoinHandle<()> },
}

impl Navigation {
    pub fn is_refused(&self) -> bool {
        matches!(self, Navigation::Refused)
    }

    pub fn page(&self) -> Option<PageId> {
        match self {
            Navigation::Refused => None,
            Navigation::Completed { page, .. } => Some(*page),
        }
    }

    /// Waits for the load hook to finish.
    pub async fn loaded(self) {
        if let Navigation::Completed { page, load } = self
            && let Err(e) = load.await
        {
            tracing::warn!("[Router] Load hook for '{}' did not complete: {}", page, e);
        }
    }
}

/// Single writer of the visible page.
///
/// Navigations are serialized: hide-then-show happens under one lock, so two
/// pages are never visible at the same time.
pub struct NavigationRouter {
    session: Arc<SessionState>,
    location: Arc<dyn LocationPort>,
    loader: Arc<dyn PageLoader>,
    regions: HashMap<PageId, Arc<dyn PageRegion>>,
    current: Mutex<PageId>,
}

impl NavigationRouter {
    pub fn new(
        session: Arc<SessionState>,
        location: Arc<dyn LocationPort>,
        loader: Arc<dyn PageLoader>,
        regions: HashMap<PageId, Arc<dyn PageRegion>>,
    ) -> Self {
        let missing: Vec<String> = PageId::all()
            .filter(|page| !regions.contains_key(page))
            .map(|page| page.to_string())
            .collect();
        if !missing.is_empty() {
            tracing::warn!(
                "[Router] No region registered for: {}; those pages will load without being shown",
                missing.join(", ")
            );
        }

        Self {
            session,
            location,
            loader,
            regions,
            current: Mutex::new(PageId::default()),
        }
    }

    /// The page named by the current location fragment, or home.
    pub fn initial_page(&self) -> PageId {
        self.location
            .fragment()
            .as_deref()
            .and_then(PageId::from_fragment)
            .unwrap_or_default()
    }

    pub async fn current_page(&self) -> PageId {
        *self.current.lock().await
    }

    /// Makes `page` the visible page.
    ///
    /// Protected pages go through [`SessionState::require_authenticated`]; a
    /// refusal changes nothing. `push_history` is `false` when replaying
    /// back/forward navigation.
    pub async fn navigate_to(&self, page: PageId, push_history: bool) -> Navigation {
        let mut current = self.current.lock().await;

        if page.is_protected() && !self.session.require_authenticated().await {
            tracing::info!("[Router] Refused navigation to protected page '{}'", page);
            return Navigation::Refused;
        }

        let previous = *current;
        if previous != page {
            self.loader.leave(previous).await;
        }

        for (other, region) in &self.regions {
            if *other != page {
                region.hide();
            }
        }
        match self.regions.get(&page) {
            Some(region) => region.show(),
            None => tracing::debug!("[Router] No region for '{}', skipping show", page),
        }

        *current = page;
        if push_history {
            self.location.push(&page.fragment());
        }
        tracing::debug!(
            "[Router] {} -> {} (history: {})",
            previous,
            page,
            push_history
        );

        let loader = self.loader.clone();
        let load = tokio::spawn(async move { loader.load(page).await });
        Navigation::Completed { page, load }
    }

    /// Replays a back/forward location change without pushing history.
    ///
    /// Blank and unknown fragments go home.
    pub async fn handle_location_change(&self, fragment: Option<&str>) -> Navigation {
        let page = fragment
            .and_then(PageId::from_fragment)
            .unwrap_or_default();
        self.navigate_to(page, false).await
    }
}
