use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::warn;

use super::auth::AuthError;
use super::repository::{ApplicationRepository, RepositoryError};
use super::service::{BackendError, MerchantBackendService};
use crate::config::ApiConfig;
use crate::domain::{Application, ReferenceNo};
use crate::export::EXPORT_FILE_NAME;
use crate::gateway::mapping::record_from_application;
use crate::gateway::wire::{
    AckResponse, ChangePasswordRequest, ChangeUsernameRequest, CompanyRecord,
    DashboardPageResponse, LoginRequest, LoginResponse, StatusUpdateRequest, SubmitResponse,
};
use crate::gateway::SubmissionPayload;

type Service<R> = Arc<MerchantBackendService<R>>;

/// Router exposing the merchant API under the configured base path.
pub fn merchant_router<R>(service: Service<R>, api: &ApiConfig) -> Router
where
    R: ApplicationRepository + 'static,
{
    let routes = Router::new()
        .route("/company_data", post(submit_handler::<R>))
        .route("/admin/dashboard", get(first_page_handler::<R>))
        .route("/admin/dashboard/:page", get(page_handler::<R>))
        .route(
            "/admin/dashboard/find-company/:term",
            get(search_handler::<R>),
        )
        .route("/admin/dashboard/download", get(download_handler::<R>))
        .route(
            "/admin/update-application-status",
            post(update_status_handler::<R>),
        )
        .route("/auth/login", post(login_handler::<R>))
        .route("/auth/change-password", post(change_password_handler::<R>))
        .route("/auth/change-username", post(change_username_handler::<R>))
        .with_state(service);

    if api.base_path.is_empty() {
        routes
    } else {
        Router::new().nest(&api.base_path, routes)
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Service<R>>,
    axum::Json(payload): axum::Json<SubmissionPayload>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.submit(payload) {
        Ok(application) => {
            let body = SubmitResponse {
                success: true,
                message: "Application submitted successfully".to_string(),
                reference: Some(application.reference.0.clone()),
                data: Some(record_from_application(&application)),
            };
            (StatusCode::CREATED, axum::Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn first_page_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    dashboard_response(&service, &headers, 1)
}

pub(crate) async fn page_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
    Path(page): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match page.parse::<u32>() {
        Ok(page) if page >= 1 => dashboard_response(&service, &headers, page),
        _ => {
            let payload = json!({
                "success": false,
                "message": format!("'{page}' is not a valid page number"),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
    }
}

fn dashboard_response<R>(service: &MerchantBackendService<R>, headers: &HeaderMap, page: u32) -> Response
where
    R: ApplicationRepository + 'static,
{
    if let Err(err) = service.accounts().authorize(bearer_token(headers)) {
        return error_response(err.into());
    }
    match service.dashboard_page(page) {
        Ok(page) => {
            let body = DashboardPageResponse {
                total_pages: page.total_pages,
                total: Some(page.total),
                current_page: Some(page.current_page),
                companies: records(&page.applications),
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
    Path(term): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    if let Err(err) = service.accounts().authorize(bearer_token(&headers)) {
        return error_response(err.into());
    }
    match service.search(&term) {
        Ok(matches) => (StatusCode::OK, axum::Json(records(&matches))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn download_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    if let Err(err) = service.accounts().authorize(bearer_token(&headers)) {
        return error_response(err.into());
    }
    match service.export() {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_status_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<StatusUpdateRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    let reviewer = match service.accounts().authorize(bearer_token(&headers)) {
        Ok(username) => username,
        Err(err) => return error_response(err.into()),
    };
    let reference = ReferenceNo(request.reference_no);
    match service.update_status(&reference, &request.status, Some(reviewer)) {
        Ok(updated) => acknowledge(format!(
            "Application {} marked as {}",
            updated.reference,
            updated.status.label()
        )),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn login_handler<R>(
    State(service): State<Service<R>>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.accounts().login(&request.username, &request.password) {
        Ok(token) => {
            let body = LoginResponse {
                message: "Login successful".to_string(),
                token,
            };
            (StatusCode::OK, axum::Json(body)).into_response()
        }
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn change_password_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ChangePasswordRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.accounts().change_password(
        bearer_token(&headers),
        &request.current_password,
        &request.new_password,
    ) {
        Ok(()) => acknowledge("Password updated successfully".to_string()),
        Err(err) => error_response(err.into()),
    }
}

pub(crate) async fn change_username_handler<R>(
    State(service): State<Service<R>>,
    headers: HeaderMap,
    axum::Json(request): axum::Json<ChangeUsernameRequest>,
) -> Response
where
    R: ApplicationRepository + 'static,
{
    match service.accounts().change_username(
        bearer_token(&headers),
        &request.new_username,
        &request.current_password,
    ) {
        Ok(username) => acknowledge(format!("Username changed to {username}")),
        Err(err) => error_response(err.into()),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn records(applications: &[Application]) -> Vec<CompanyRecord> {
    applications.iter().map(record_from_application).collect()
}

fn acknowledge(message: String) -> Response {
    let body = AckResponse {
        success: true,
        message: Some(message),
    };
    (StatusCode::OK, axum::Json(body)).into_response()
}

fn error_response(err: BackendError) -> Response {
    let status = match &err {
        BackendError::Invalid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        BackendError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        BackendError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        BackendError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        BackendError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        BackendError::Auth(AuthError::InvalidCredentials | AuthError::InvalidToken) => {
            StatusCode::UNAUTHORIZED
        }
        BackendError::Auth(_) => StatusCode::BAD_REQUEST,
        BackendError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        warn!(error = %err, "merchant api request failed");
    }

    let payload = match &err {
        BackendError::Invalid { messages } => json!({
            "success": false,
            "message": err.to_string(),
            "errors": messages,
        }),
        _ => json!({
            "success": false,
            "message": err.to_string(),
        }),
    };
    (status, axum::Json(payload)).into_response()
}
