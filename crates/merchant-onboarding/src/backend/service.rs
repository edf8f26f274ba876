use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing::info;

use super::auth::{AdminAccounts, AuthError};
use super::repository::{ApplicationRepository, RepositoryError, StatusChange, StoredPage};
use crate::domain::{Application, ApplicationStatus, ReferenceNo};
use crate::export::{write_applications_csv, ExportError};
use crate::gateway::SubmissionPayload;
use crate::onboarding::{ApplicationFormModel, WizardStep};

/// Server side of the merchant API: intake, dashboard listing, triage, and admin auth.
pub struct MerchantBackendService<R> {
    repository: Arc<R>,
    accounts: Arc<AdminAccounts>,
    form: ApplicationFormModel,
    page_size: usize,
}

static REFERENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_reference() -> ReferenceNo {
    let id = REFERENCE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let year = Utc::now().year() % 100;
    ReferenceNo(format!("ngsi-{year:02}-{id:05}"))
}

/// One dashboard page as the backend computes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardPage {
    pub applications: Vec<Application>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
}

impl<R> MerchantBackendService<R>
where
    R: ApplicationRepository + 'static,
{
    pub fn new(repository: Arc<R>, accounts: Arc<AdminAccounts>, page_size: usize) -> Self {
        Self {
            repository,
            accounts,
            form: ApplicationFormModel::build(),
            page_size: page_size.max(1),
        }
    }

    pub fn accounts(&self) -> &AdminAccounts {
        &self.accounts
    }

    /// Validate and store a new submission under a fresh reference.
    pub fn submit(&self, payload: SubmissionPayload) -> Result<Application, BackendError> {
        let fields = payload.to_fields();
        let report = self.form.check_step(WizardStep::Review, &fields);
        if !report.is_valid() {
            let mut messages: BTreeMap<String, String> = self
                .form
                .messages(&report)
                .into_iter()
                .map(|(field, message)| (field.key().to_string(), message))
                .collect();
            if report.missing_payment_mode {
                messages.insert(
                    "currentModeOfPayment".to_string(),
                    "Select at least one mode of payment".to_string(),
                );
            }
            return Err(BackendError::Invalid { messages });
        }

        let application = Application {
            reference: next_reference(),
            registered_by_name: fields.registered_by_name,
            registered_by_contact_number: fields.registered_by_contact_number,
            contact_person_name: fields.contact_person_name,
            contact_number: fields.contact_number,
            business_name: fields.business_name,
            business_email: fields.business_email,
            business_address: fields.business_address,
            telephone_no: payload.telephone_no,
            has_existing_payment_portal: fields.has_existing_payment_portal,
            current_mode_of_payment: fields.current_mode_of_payment,
            estimated_transaction_numbers: fields.estimated_transaction_numbers,
            estimated_average_amount: fields.estimated_average_amount,
            status: ApplicationStatus::Pending,
            submitted_at: Some(Utc::now()),
            reviewed_at: None,
            reviewed_by: None,
            notes: None,
        };

        let stored = self.repository.insert(application)?;
        info!(reference = %stored.reference, business = %stored.business_name, "merchant application stored");
        Ok(stored)
    }

    /// Pages are 1-based; a page past the end comes back empty with the real totals.
    pub fn dashboard_page(&self, page: u32) -> Result<DashboardPage, BackendError> {
        let page = page.max(1);
        let offset = (page as usize - 1).saturating_mul(self.page_size);
        let StoredPage {
            applications,
            total,
        } = self.repository.page(offset, self.page_size)?;
        let total_pages = total.div_ceil(self.page_size as u64).max(1);

        Ok(DashboardPage {
            applications,
            current_page: page,
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            total,
        })
    }

    pub fn search(&self, term: &str) -> Result<Vec<Application>, BackendError> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let matches = self
            .repository
            .all()?
            .into_iter()
            .filter(|application| application.matches_term(term))
            .collect();
        Ok(matches)
    }

    pub fn update_status(
        &self,
        reference: &ReferenceNo,
        status: &str,
        reviewed_by: Option<String>,
    ) -> Result<Application, BackendError> {
        let status = ApplicationStatus::from_label(status)
            .ok_or_else(|| BackendError::InvalidStatus(status.to_string()))?;
        let updated = self.repository.set_status(
            reference,
            StatusChange {
                status,
                reviewed_by,
                reviewed_at: Utc::now(),
            },
        )?;
        info!(reference = %reference, status = status.label(), "application status changed");
        Ok(updated)
    }

    pub fn export(&self) -> Result<Vec<u8>, BackendError> {
        let applications = self.repository.all()?;
        Ok(write_applications_csv(&applications)?)
    }
}

/// Error raised by the backend service.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("submission failed validation")]
    Invalid { messages: BTreeMap<String, String> },
    #[error("unknown application status '{0}'")]
    InvalidStatus(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
