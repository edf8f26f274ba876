use chrono::{DateTime, Utc};

use crate::domain::{Application, ApplicationStatus, ReferenceNo};

/// One slice of the stored applications, newest submission first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    pub applications: Vec<Application>,
    pub total: u64,
}

/// Review metadata written alongside a status change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub reviewed_by: Option<String>,
    pub reviewed_at: DateTime<Utc>,
}

/// Storage abstraction so the backend service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn set_status(
        &self,
        reference: &ReferenceNo,
        change: StatusChange,
    ) -> Result<Application, RepositoryError>;
    fn page(&self, offset: usize, limit: usize) -> Result<StoredPage, RepositoryError>;
    fn all(&self) -> Result<Vec<Application>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
