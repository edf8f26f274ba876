use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::domain::{Application, ApplicationListPage, ApplicationStatus, ReferenceNo};
use crate::gateway::{Acknowledgement, ApplicationDirectory, ExportFile, GatewayError};

/// Status filter applied to the held page in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ApplicationStatus),
}

impl StatusFilter {
    pub fn admits(self, status: ApplicationStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }
}

/// Dashboard tabs; each is a preset [`StatusFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    All,
    Pending,
    Called,
}

impl DashboardTab {
    pub const ALL: [DashboardTab; 3] = [DashboardTab::All, DashboardTab::Pending, DashboardTab::Called];

    pub const fn filter(self) -> StatusFilter {
        match self {
            DashboardTab::All => StatusFilter::All,
            DashboardTab::Pending => StatusFilter::Only(ApplicationStatus::Pending),
            DashboardTab::Called => StatusFilter::Only(ApplicationStatus::Called),
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            DashboardTab::All => "All Applications",
            DashboardTab::Pending => "Pending",
            DashboardTab::Called => "Called",
        }
    }

    pub fn from_filter(filter: StatusFilter) -> Option<Self> {
        Self::ALL.into_iter().find(|tab| tab.filter() == filter)
    }
}

/// Cached result set of the active search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub term: String,
    pub matches: Vec<Application>,
}

/// Everything the dashboard renders from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    pub page: ApplicationListPage,
    pub search: Option<SearchResults>,
    pub filter: StatusFilter,
    pub loading: bool,
    /// User-facing text for the last failed operation.
    pub error_message: Option<&'static str>,
}

impl ListSnapshot {
    pub fn is_search_mode(&self) -> bool {
        self.search.is_some()
    }

    pub fn active_tab(&self) -> Option<DashboardTab> {
        DashboardTab::from_filter(self.filter)
    }

    /// Held page narrowed by the status filter.
    pub fn visible(&self) -> Vec<Application> {
        self.page
            .applications
            .iter()
            .filter(|application| self.filter.admits(application.status))
            .cloned()
            .collect()
    }
}

impl Default for ListSnapshot {
    fn default() -> Self {
        Self {
            page: empty_page(),
            search: None,
            filter: StatusFilter::All,
            loading: false,
            error_message: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded,
    /// Requested page fell outside `[1, total_pages]`; nothing changed.
    OutOfRange { requested: u32, total_pages: u32 },
    /// A newer fetch was issued while this one was in flight; its response was dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Searched { matches: usize },
    /// Newer input arrived within the debounce interval; no request was sent.
    Debounced,
    Superseded,
    /// Empty term: search mode ended and page 1 of the listing was reloaded.
    Cleared(LoadOutcome),
}

#[derive(Debug, thiserror::Error)]
pub enum ListStateError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ListStateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ListStateError::Gateway(err) => err.user_message(),
        }
    }
}

/// Admin list view state. Shared behind `Arc`; every operation takes `&self` so page loads
/// and searches may overlap, with the most recently issued fetch winning.
pub struct AdminApplicationListState<D> {
    directory: Arc<D>,
    page_size: usize,
    debounce: Duration,
    snapshot: Mutex<ListSnapshot>,
    fetch_seq: AtomicU64,
    search_generation: AtomicU64,
}

impl<D: ApplicationDirectory> AdminApplicationListState<D> {
    pub fn new(directory: Arc<D>, page_size: usize, debounce: Duration) -> Self {
        Self {
            directory,
            page_size: page_size.max(1),
            debounce,
            snapshot: Mutex::new(ListSnapshot::default()),
            fetch_seq: AtomicU64::new(0),
            search_generation: AtomicU64::new(0),
        }
    }

    pub fn from_config(directory: Arc<D>, config: &DashboardConfig) -> Self {
        Self::new(directory, config.page_size, config.search_debounce)
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn snapshot(&self) -> ListSnapshot {
        self.lock().clone()
    }

    pub fn visible(&self) -> Vec<Application> {
        self.lock().visible()
    }

    fn lock(&self) -> MutexGuard<'_, ListSnapshot> {
        self.snapshot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_fetch(&self, snapshot: &mut ListSnapshot) -> u64 {
        snapshot.loading = true;
        self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.fetch_seq.load(Ordering::SeqCst) == seq
    }

    /// Loads page `page`. In search mode the cached matches are sliced instead.
    pub async fn load_page(&self, page: u32) -> Result<LoadOutcome, ListStateError> {
        let seq = {
            let mut guard = self.lock();
            let snapshot = &mut *guard;
            let total_pages = snapshot.page.total_pages.max(1);
            if page < 1 || page > total_pages {
                debug!(page, total_pages, "ignoring out-of-range page request");
                return Ok(LoadOutcome::OutOfRange {
                    requested: page,
                    total_pages,
                });
            }
            if let Some(search) = &snapshot.search {
                snapshot.page = paginate_locally(&search.matches, page, self.page_size);
                return Ok(LoadOutcome::Loaded);
            }
            self.issue_fetch(snapshot)
        };

        let result = self.directory.list(page).await;

        let mut snapshot = self.lock();
        if !self.is_latest(seq) {
            debug!(page, seq, "discarding stale page response");
            return Ok(LoadOutcome::Superseded);
        }
        snapshot.loading = false;
        match result {
            Ok(fetched) => {
                snapshot.page = fetched;
                snapshot.error_message = None;
                Ok(LoadOutcome::Loaded)
            }
            Err(err) => {
                warn!(page, error = %err, "failed to load applications page");
                snapshot.page = empty_page();
                snapshot.error_message = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Re-fetches whatever page is currently held.
    pub async fn refresh(&self) -> Result<LoadOutcome, ListStateError> {
        let current = self.lock().page.current_page.max(1);
        self.load_page(current).await
    }

    /// Debounced search. An empty term leaves search mode and reloads page 1 at once.
    pub async fn set_search(&self, term: &str) -> Result<SearchOutcome, ListStateError> {
        let generation = self.search_generation.fetch_add(1, Ordering::SeqCst) + 1;
        let term = term.trim().to_string();

        if term.is_empty() {
            self.lock().search = None;
            let outcome = self.load_page(1).await?;
            return Ok(SearchOutcome::Cleared(outcome));
        }

        tokio::time::sleep(self.debounce).await;
        if self.search_generation.load(Ordering::SeqCst) != generation {
            return Ok(SearchOutcome::Debounced);
        }

        let seq = {
            let mut snapshot = self.lock();
            self.issue_fetch(&mut snapshot)
        };

        let result = self.directory.search(&term).await;

        let mut guard = self.lock();
        if !self.is_latest(seq) {
            debug!(term = %term, seq, "discarding stale search response");
            return Ok(SearchOutcome::Superseded);
        }
        let snapshot = &mut *guard;
        snapshot.loading = false;
        match result {
            Ok(matches) => {
                let count = matches.len();
                snapshot.page = paginate_locally(&matches, 1, self.page_size);
                snapshot.search = Some(SearchResults { term, matches });
                snapshot.error_message = None;
                Ok(SearchOutcome::Searched { matches: count })
            }
            Err(err) => {
                warn!(term = %term, error = %err, "application search failed");
                snapshot.page = empty_page();
                snapshot.search = Some(SearchResults {
                    term,
                    matches: Vec::new(),
                });
                snapshot.error_message = Some(err.user_message());
                Err(err.into())
            }
        }
    }

    pub fn set_status_filter(&self, filter: StatusFilter) {
        self.lock().filter = filter;
    }

    pub fn set_active_tab(&self, tab: DashboardTab) {
        self.set_status_filter(tab.filter());
    }

    /// Sends the change, then patches the matching held item on success.
    pub async fn update_status(
        &self,
        reference: &ReferenceNo,
        status: ApplicationStatus,
    ) -> Result<Acknowledgement, ListStateError> {
        let ack = match self.directory.update_status(reference, status).await {
            Ok(ack) => ack,
            Err(err) => {
                warn!(reference = %reference, error = %err, "status update failed");
                self.lock().error_message = Some(err.user_message());
                return Err(err.into());
            }
        };

        let mut guard = self.lock();
        let snapshot = &mut *guard;
        let on_page = patch_status(&mut snapshot.page.applications, reference, status);
        if let Some(search) = snapshot.search.as_mut() {
            patch_status(&mut search.matches, reference, status);
        }
        if !on_page {
            debug!(reference = %reference, "updated application is not on the held page");
        }
        snapshot.error_message = None;
        info!(reference = %reference, status = status.label(), "dashboard status updated");
        Ok(ack)
    }

    pub async fn download_export(&self) -> Result<ExportFile, ListStateError> {
        match self.directory.download_export().await {
            Ok(file) => Ok(file),
            Err(err) => {
                warn!(error = %err, "export download failed");
                self.lock().error_message = Some(err.user_message());
                Err(err.into())
            }
        }
    }
}

fn empty_page() -> ApplicationListPage {
    ApplicationListPage {
        applications: Vec::new(),
        current_page: 1,
        total_pages: 0,
        total_count: 0,
        count_is_estimate: false,
    }
}

fn paginate_locally(matches: &[Application], page: u32, page_size: usize) -> ApplicationListPage {
    let total_pages = matches.len().div_ceil(page_size).max(1);
    let page = (page as usize).clamp(1, total_pages);
    let applications = matches
        .iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .cloned()
        .collect();

    ApplicationListPage {
        applications,
        current_page: u32::try_from(page).unwrap_or(u32::MAX),
        total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
        total_count: matches.len() as u64,
        count_is_estimate: false,
    }
}

fn patch_status(
    applications: &mut [Application],
    reference: &ReferenceNo,
    status: ApplicationStatus,
) -> bool {
    match applications
        .iter_mut()
        .find(|application| &application.reference == reference)
    {
        Some(application) => {
            application.status = status;
            true
        }
        None => false,
    }
}
