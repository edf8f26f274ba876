use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use chrono::{TimeZone, Utc};

use crate::admin::AdminApplicationListState;
use crate::domain::{
    Application, ApplicationListPage, ApplicationStatus, PaymentModes, PaymentPortal, ReferenceNo,
};
use crate::gateway::{Acknowledgement, ApplicationDirectory, ExportFile, GatewayError};

pub(super) const DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum DirectoryCall {
    List(u32),
    Search(String),
    UpdateStatus(ReferenceNo, ApplicationStatus),
    Export,
}

/// In-memory directory with scripted pages, per-page latency, and one-shot failures.
#[derive(Default)]
pub(super) struct FakeDirectory {
    pages: Mutex<HashMap<u32, ApplicationListPage>>,
    delays: Mutex<HashMap<u32, Duration>>,
    searchable: Mutex<Vec<Application>>,
    failures: Mutex<Vec<GatewayError>>,
    calls: Mutex<Vec<DirectoryCall>>,
}

impl FakeDirectory {
    pub(super) fn with_pages(pages: Vec<ApplicationListPage>) -> Arc<Self> {
        let directory = Self::default();
        {
            let mut stored = directory.pages.lock().expect("pages mutex poisoned");
            for page in pages {
                stored.insert(page.current_page, page);
            }
        }
        Arc::new(directory)
    }

    pub(super) fn delay_page(&self, page: u32, delay: Duration) {
        self.delays
            .lock()
            .expect("delays mutex poisoned")
            .insert(page, delay);
    }

    pub(super) fn set_searchable(&self, applications: Vec<Application>) {
        *self.searchable.lock().expect("search mutex poisoned") = applications;
    }

    pub(super) fn fail_next(&self, error: GatewayError) {
        self.failures
            .lock()
            .expect("failures mutex poisoned")
            .push(error);
    }

    pub(super) fn calls(&self) -> Vec<DirectoryCall> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    pub(super) fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DirectoryCall::Search(term) => Some(term),
                _ => None,
            })
            .collect()
    }

    pub(super) fn list_calls(&self) -> Vec<u32> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                DirectoryCall::List(page) => Some(page),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: DirectoryCall) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }

    fn take_failure(&self) -> Option<GatewayError> {
        self.failures.lock().expect("failures mutex poisoned").pop()
    }
}

#[async_trait]
impl ApplicationDirectory for FakeDirectory {
    async fn list(&self, page: u32) -> Result<ApplicationListPage, GatewayError> {
        self.record(DirectoryCall::List(page));
        let delay = self
            .delays
            .lock()
            .expect("delays mutex poisoned")
            .get(&page)
            .copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        self.pages
            .lock()
            .expect("pages mutex poisoned")
            .get(&page)
            .cloned()
            .ok_or_else(|| GatewayError::Status {
                status: StatusCode::NOT_FOUND,
                message: format!("page {page} not scripted"),
            })
    }

    async fn search(&self, term: &str) -> Result<Vec<Application>, GatewayError> {
        self.record(DirectoryCall::Search(term.to_string()));
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(self
            .searchable
            .lock()
            .expect("search mutex poisoned")
            .iter()
            .filter(|application| application.matches_term(term))
            .cloned()
            .collect())
    }

    async fn update_status(
        &self,
        reference: &ReferenceNo,
        status: ApplicationStatus,
    ) -> Result<Acknowledgement, GatewayError> {
        self.record(DirectoryCall::UpdateStatus(reference.clone(), status));
        if let Some(error) = self.take_failure() {
            return Err(error);
        }
        Ok(Acknowledgement {
            message: Some(format!("{reference} updated")),
        })
    }

    async fn download_export(&self) -> Result<ExportFile, GatewayError> {
        self.record(DirectoryCall::Export);
        Ok(ExportFile {
            content_type: "text/csv; charset=utf-8".to_string(),
            bytes: Bytes::from_static(b"Reference No,Business Name\n"),
        })
    }
}

pub(super) fn application(reference: &str, business: &str, status: ApplicationStatus) -> Application {
    Application {
        reference: ReferenceNo(reference.to_string()),
        registered_by_name: "Liza Manalo".to_string(),
        registered_by_contact_number: "09171234567".to_string(),
        contact_person_name: "Paolo Reyes".to_string(),
        contact_number: "09281234567".to_string(),
        business_name: business.to_string(),
        business_email: "hello@example.ph".to_string(),
        business_address: "12 Rizal Avenue, Makati City".to_string(),
        telephone_no: None,
        has_existing_payment_portal: Some(PaymentPortal::No),
        current_mode_of_payment: PaymentModes {
            cash: true,
            ..PaymentModes::default()
        },
        estimated_transaction_numbers: None,
        estimated_average_amount: None,
        status,
        submitted_at: Utc.with_ymd_and_hms(2025, 8, 15, 10, 30, 0).single(),
        reviewed_at: None,
        reviewed_by: None,
        notes: None,
    }
}

pub(super) fn page(current_page: u32, total_pages: u32, applications: Vec<Application>) -> ApplicationListPage {
    ApplicationListPage {
        total_count: u64::from(total_pages) * 3,
        applications,
        current_page,
        total_pages,
        count_is_estimate: false,
    }
}

/// Three pages of three; page 1 holds REF-001..REF-003.
pub(super) fn three_pages() -> Vec<ApplicationListPage> {
    (1..=3)
        .map(|number| {
            let offset = (number - 1) * 3;
            let rows = (1..=3)
                .map(|i| {
                    let status = if i == 2 {
                        ApplicationStatus::Called
                    } else {
                        ApplicationStatus::Pending
                    };
                    application(
                        &format!("REF-{:03}", offset + i),
                        &format!("Merchant {}", offset + i),
                        status,
                    )
                })
                .collect();
            page(number, 3, rows)
        })
        .collect()
}

pub(super) fn list_state(directory: &Arc<FakeDirectory>) -> AdminApplicationListState<FakeDirectory> {
    AdminApplicationListState::new(directory.clone(), 3, DEBOUNCE)
}
