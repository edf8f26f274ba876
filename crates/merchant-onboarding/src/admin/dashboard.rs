use std::sync::Arc;

use super::list_state::{AdminApplicationListState, ListSnapshot, ListStateError, LoadOutcome};
use super::pagination::{visible_pages, DEFAULT_MAX_VISIBLE_PAGES};
use crate::domain::{Application, ApplicationStatus, ReferenceNo};
use crate::export::{write_applications_csv, ExportError};
use crate::gateway::{Acknowledgement, ApplicationDirectory, ExportFile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Warning,
    Info,
    Success,
    Danger,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub tone: BadgeTone,
}

impl StatusBadge {
    pub const fn for_status(status: ApplicationStatus) -> Self {
        let (label, tone) = match status {
            ApplicationStatus::Pending => ("Pending", BadgeTone::Warning),
            ApplicationStatus::UnderReview => ("Under Review", BadgeTone::Info),
            ApplicationStatus::Approved => ("Approved", BadgeTone::Success),
            ApplicationStatus::Rejected => ("Rejected", BadgeTone::Danger),
            ApplicationStatus::Called => ("Called", BadgeTone::Accent),
        };
        Self { label, tone }
    }
}

/// Triage buttons offered in the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Approve,
    Reject,
    MarkCalled,
    MarkUnderReview,
}

impl StatusAction {
    pub const ALL: [StatusAction; 4] = [
        StatusAction::MarkUnderReview,
        StatusAction::MarkCalled,
        StatusAction::Approve,
        StatusAction::Reject,
    ];

    pub const fn target(self) -> ApplicationStatus {
        match self {
            StatusAction::Approve => ApplicationStatus::Approved,
            StatusAction::Reject => ApplicationStatus::Rejected,
            StatusAction::MarkCalled => ApplicationStatus::Called,
            StatusAction::MarkUnderReview => ApplicationStatus::UnderReview,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            StatusAction::Approve => "Approve",
            StatusAction::Reject => "Reject",
            StatusAction::MarkCalled => "Mark as Called",
            StatusAction::MarkUnderReview => "Mark Under Review",
        }
    }

    /// Actions that would actually change `current`.
    pub fn available_for(current: ApplicationStatus) -> Vec<StatusAction> {
        Self::ALL
            .into_iter()
            .filter(|action| action.target() != current)
            .collect()
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardRow {
    pub reference: ReferenceNo,
    pub business_name: String,
    pub contact_person_name: String,
    pub contact_number: String,
    pub business_email: String,
    pub submitted_on: String,
    pub badge: StatusBadge,
}

impl From<&Application> for DashboardRow {
    fn from(application: &Application) -> Self {
        Self {
            reference: application.reference.clone(),
            business_name: application.business_name.clone(),
            contact_person_name: application.contact_person_name.clone(),
            contact_number: application.contact_number.clone(),
            business_email: application.business_email.clone(),
            submitted_on: application
                .submitted_at
                .map(|at| at.format("%b %d, %Y").to_string())
                .unwrap_or_else(|| "-".to_string()),
            badge: StatusBadge::for_status(application.status),
        }
    }
}

/// Contents of the detail modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDetail {
    pub application: Application,
    pub badge: StatusBadge,
    pub payment_modes: Vec<&'static str>,
    pub actions: Vec<StatusAction>,
}

impl ApplicationDetail {
    fn new(application: Application) -> Self {
        Self {
            badge: StatusBadge::for_status(application.status),
            payment_modes: application
                .current_mode_of_payment
                .enabled()
                .into_iter()
                .map(|mode| mode.label())
                .collect(),
            actions: StatusAction::available_for(application.status),
            application,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub count_is_estimate: bool,
    pub pages: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationView {
    fn from_snapshot(snapshot: &ListSnapshot, max_visible: usize) -> Self {
        let page = &snapshot.page;
        Self {
            current_page: page.current_page,
            total_pages: page.total_pages,
            total_count: page.total_count,
            count_is_estimate: page.count_is_estimate,
            pages: visible_pages(page.current_page, page.total_pages, max_visible),
            has_previous: page.current_page > 1,
            has_next: page.current_page < page.total_pages,
        }
    }

    pub fn summary(&self) -> String {
        let qualifier = if self.count_is_estimate { "about " } else { "" };
        format!(
            "Page {} of {} ({qualifier}{} applications)",
            self.current_page,
            self.total_pages.max(1),
            self.total_count
        )
    }
}

/// Presentation layer over the list state. Holds only the detail selection itself.
pub struct AdminDashboardView<D> {
    state: Arc<AdminApplicationListState<D>>,
    selected: Option<ReferenceNo>,
    max_visible_pages: usize,
}

impl<D: ApplicationDirectory> AdminDashboardView<D> {
    pub fn new(state: Arc<AdminApplicationListState<D>>) -> Self {
        Self {
            state,
            selected: None,
            max_visible_pages: DEFAULT_MAX_VISIBLE_PAGES,
        }
    }

    pub fn with_max_visible_pages(mut self, max_visible_pages: usize) -> Self {
        self.max_visible_pages = max_visible_pages;
        self
    }

    pub fn state(&self) -> &Arc<AdminApplicationListState<D>> {
        &self.state
    }

    pub fn rows(&self) -> Vec<DashboardRow> {
        self.state.visible().iter().map(DashboardRow::from).collect()
    }

    pub fn pagination(&self) -> PaginationView {
        PaginationView::from_snapshot(&self.state.snapshot(), self.max_visible_pages)
    }

    pub async fn go_to_page(&self, page: u32) -> Result<LoadOutcome, ListStateError> {
        self.state.load_page(page).await
    }

    pub async fn next_page(&self) -> Result<LoadOutcome, ListStateError> {
        let current = self.state.snapshot().page.current_page;
        self.state.load_page(current.saturating_add(1)).await
    }

    pub async fn previous_page(&self) -> Result<LoadOutcome, ListStateError> {
        let current = self.state.snapshot().page.current_page;
        self.state.load_page(current.saturating_sub(1)).await
    }

    /// Opens the modal if the reference is on the held page.
    pub fn open_detail(&mut self, reference: &ReferenceNo) -> Option<ApplicationDetail> {
        let detail = self.find(reference).map(ApplicationDetail::new);
        if detail.is_some() {
            self.selected = Some(reference.clone());
        }
        detail
    }

    pub fn close_detail(&mut self) {
        self.selected = None;
    }

    /// Current contents of the open modal, reflecting any status change since it opened.
    pub fn detail(&self) -> Option<ApplicationDetail> {
        let reference = self.selected.as_ref()?;
        self.find(reference).map(ApplicationDetail::new)
    }

    fn find(&self, reference: &ReferenceNo) -> Option<Application> {
        self.state
            .snapshot()
            .page
            .applications
            .into_iter()
            .find(|application| &application.reference == reference)
    }

    pub async fn apply(
        &self,
        reference: &ReferenceNo,
        action: StatusAction,
    ) -> Result<Acknowledgement, ListStateError> {
        self.state.update_status(reference, action.target()).await
    }

    pub async fn approve(&self, reference: &ReferenceNo) -> Result<Acknowledgement, ListStateError> {
        self.apply(reference, StatusAction::Approve).await
    }

    pub async fn reject(&self, reference: &ReferenceNo) -> Result<Acknowledgement, ListStateError> {
        self.apply(reference, StatusAction::Reject).await
    }

    pub async fn mark_called(
        &self,
        reference: &ReferenceNo,
    ) -> Result<Acknowledgement, ListStateError> {
        self.apply(reference, StatusAction::MarkCalled).await
    }

    pub async fn mark_under_review(
        &self,
        reference: &ReferenceNo,
    ) -> Result<Acknowledgement, ListStateError> {
        self.apply(reference, StatusAction::MarkUnderReview).await
    }

    /// CSV of the rows currently shown (held page after filtering).
    pub fn export_csv(&self) -> Result<Vec<u8>, ExportError> {
        write_applications_csv(&self.state.visible())
    }

    /// Full workbook as produced by the backend.
    pub async fn download_excel(&self) -> Result<ExportFile, ListStateError> {
        self.state.download_export().await
    }
}
