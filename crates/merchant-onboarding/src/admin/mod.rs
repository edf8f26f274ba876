//! Admin dashboard: list state over the application directory, the dashboard view, and
//! the admin session.

pub mod dashboard;
pub mod list_state;
pub mod pagination;
pub mod session;

#[cfg(test)]
mod tests;

pub use dashboard::{
    AdminDashboardView, ApplicationDetail, BadgeTone, DashboardRow, PaginationView, StatusAction,
    StatusBadge,
};
pub use list_state::{
    AdminApplicationListState, DashboardTab, ListSnapshot, ListStateError, LoadOutcome,
    SearchOutcome, SearchResults, StatusFilter,
};
pub use pagination::{visible_pages, DEFAULT_MAX_VISIBLE_PAGES};
pub use session::{AdminSession, AdminUser, SessionError, ADMIN_TOKEN_KEY, USER_ACCOUNTS_KEY};
