use super::common::*;
use std::sync::Arc;

use crate::admin::{AdminDashboardView, BadgeTone, LoadOutcome, StatusAction, StatusBadge};
use crate::domain::{ApplicationStatus, ReferenceNo};

async fn dashboard() -> (AdminDashboardView<FakeDirectory>, Arc<FakeDirectory>) {
    let directory = FakeDirectory::with_pages(three_pages());
    let state = Arc::new(list_state(&directory));
    state.load_page(1).await.expect("page 1");
    (AdminDashboardView::new(state), directory)
}

#[tokio::test]
async fn rows_carry_status_badges() {
    let (view, _) = dashboard().await;
    let rows = view.rows();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].badge, StatusBadge::for_status(ApplicationStatus::Pending));
    assert_eq!(rows[1].badge.label, "Called");
    assert_eq!(rows[1].badge.tone, BadgeTone::Accent);
    assert_eq!(rows[0].submitted_on, "Aug 15, 2025");
}

#[tokio::test]
async fn detail_tracks_status_changes_while_open() {
    let (mut view, directory) = dashboard().await;
    let reference = ReferenceNo("REF-003".to_string());

    let detail = view.open_detail(&reference).expect("row on page");
    assert_eq!(detail.payment_modes, vec!["Cash"]);
    assert_eq!(detail.actions.len(), 4);

    view.approve(&reference).await.expect("approved");
    let detail = view.detail().expect("still open");
    assert_eq!(detail.application.status, ApplicationStatus::Approved);
    assert_eq!(detail.badge.tone, BadgeTone::Success);
    assert!(!detail.actions.contains(&StatusAction::Approve));
    assert!(directory
        .calls()
        .contains(&DirectoryCall::UpdateStatus(reference.clone(), ApplicationStatus::Approved)));

    view.close_detail();
    assert!(view.detail().is_none());
    assert!(view.open_detail(&ReferenceNo("REF-999".to_string())).is_none());
}

#[tokio::test]
async fn pagination_window_and_navigation() {
    let (view, directory) = dashboard().await;

    let pagination = view.pagination();
    assert_eq!(pagination.pages, vec![1, 2, 3]);
    assert!(!pagination.has_previous);
    assert!(pagination.has_next);
    assert_eq!(pagination.summary(), "Page 1 of 3 (9 applications)");

    assert_eq!(
        view.previous_page().await.expect("no-op"),
        LoadOutcome::OutOfRange {
            requested: 0,
            total_pages: 3
        }
    );
    assert_eq!(view.next_page().await.expect("page 2"), LoadOutcome::Loaded);
    assert_eq!(view.pagination().current_page, 2);
    assert_eq!(directory.list_calls(), vec![1, 2]);
}

#[tokio::test]
async fn csv_export_follows_the_active_filter() {
    let (view, directory) = dashboard().await;
    view.state().set_active_tab(crate::admin::DashboardTab::Called);

    let bytes = view.export_csv().expect("csv");
    let text = String::from_utf8(bytes).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("REF-002,Merchant 2,"));

    let file = view.download_excel().await.expect("download");
    assert!(file.content_type.starts_with("text/csv"));
    assert!(directory.calls().contains(&DirectoryCall::Export));
}
