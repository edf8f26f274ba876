use std::sync::{Mutex, PoisonError};

use super::repository::{ApplicationRepository, RepositoryError, StatusChange, StoredPage};
use crate::domain::{Application, ReferenceNo};

/// Process-local store; rows are kept in submission order.
#[derive(Debug, Default)]
pub struct InMemoryApplicationRepository {
    rows: Mutex<Vec<Application>>,
}

impl InMemoryApplicationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        if rows.iter().any(|row| row.reference == application.reference) {
            return Err(RepositoryError::Conflict);
        }
        rows.push(application.clone());
        Ok(application)
    }

    fn set_status(
        &self,
        reference: &ReferenceNo,
        change: StatusChange,
    ) -> Result<Application, RepositoryError> {
        let mut rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        let row = rows
            .iter_mut()
            .find(|row| &row.reference == reference)
            .ok_or(RepositoryError::NotFound)?;
        row.status = change.status;
        row.reviewed_by = change.reviewed_by;
        row.reviewed_at = Some(change.reviewed_at);
        Ok(row.clone())
    }

    fn page(&self, offset: usize, limit: usize) -> Result<StoredPage, RepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(StoredPage {
            applications: rows.iter().rev().skip(offset).take(limit).cloned().collect(),
            total: rows.len() as u64,
        })
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(rows.iter().rev().cloned().collect())
    }
}
