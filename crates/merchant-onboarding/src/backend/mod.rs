//! Bundled merchant API: submission intake, paginated dashboard, search, status triage,
//! spreadsheet export, and admin credentials, all held in process memory.

pub mod auth;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use auth::{AdminAccounts, AuthError};
pub use memory::InMemoryApplicationRepository;
pub use repository::{ApplicationRepository, RepositoryError, StatusChange, StoredPage};
pub use router::merchant_router;
pub use service::{BackendError, DashboardPage, MerchantBackendService};
