use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request};
use axum::response::Response;
use serde_json::Value;

use crate::backend::repository::{ApplicationRepository, RepositoryError, StatusChange, StoredPage};
use crate::backend::{AdminAccounts, InMemoryApplicationRepository, MerchantBackendService};
use crate::domain::{Application, ReferenceNo};
use crate::gateway::SubmissionPayload;
use crate::onboarding::form::tests::complete_fields;

pub(super) const PAGE_SIZE: usize = 2;

pub(super) fn build_service() -> (
    Arc<MerchantBackendService<InMemoryApplicationRepository>>,
    Arc<InMemoryApplicationRepository>,
) {
    let repository = Arc::new(InMemoryApplicationRepository::new());
    let accounts = Arc::new(AdminAccounts::new("admin", "admin123"));
    let service = MerchantBackendService::new(repository.clone(), accounts, PAGE_SIZE);
    (Arc::new(service), repository)
}

pub(super) fn payload(business_name: &str) -> SubmissionPayload {
    let mut fields = complete_fields();
    fields.business_name = business_name.to_string();
    SubmissionPayload::from_fields(&fields)
}

pub(super) fn admin_token<R: ApplicationRepository + 'static>(
    service: &MerchantBackendService<R>,
) -> String {
    service
        .accounts()
        .login("admin", "admin123")
        .expect("seeded admin logs in")
}

pub(super) fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request builds")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableRepository;

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn set_status(
        &self,
        _reference: &ReferenceNo,
        _change: StatusChange,
    ) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn page(&self, _offset: usize, _limit: usize) -> Result<StoredPage, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn all(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}
