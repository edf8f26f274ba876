use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::http::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::mapping::{application_from_record, applications_from_records};
use super::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use super::wire::{
    AckResponse, ChangePasswordRequest, ChangeUsernameRequest, DashboardPageResponse,
    LoginRequest, LoginResponse, StatusUpdateRequest, SubmissionPayload, SubmitResponse,
};
use crate::domain::{Application, ApplicationListPage, ApplicationStatus, ReferenceNo};

/// Failure at the gateway boundary. Nothing here is retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("authentication required")]
    Unauthorized,
    #[error("backend returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("backend rejected the request: {message}")]
    Rejected { message: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Generic text suitable for an alert or inline message.
    pub fn user_message(&self) -> &'static str {
        match self {
            GatewayError::Transport(_) => {
                "Unable to connect to server. Please check your internet connection."
            }
            GatewayError::Unauthorized => "Authentication required. Please log in again.",
            GatewayError::Status { status, .. } => match status.as_u16() {
                400 | 422 => "Invalid data submitted. Please check your information.",
                401 => "Authentication required. Please log in again.",
                403 => "Access denied. You don't have permission for this action.",
                404 => "Resource not found. Please check the URL.",
                500 => "Server error. Please try again later.",
                code if code > 500 => {
                    "Server is temporarily unavailable. Please try again later."
                }
                _ => "An error occurred. Please try again.",
            },
            GatewayError::Rejected { .. } | GatewayError::Decode(_) => {
                "An error occurred. Please try again."
            }
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub reference: ReferenceNo,
    pub message: String,
    pub application: Option<Application>,
}

/// Acknowledged mutation, with the backend's optional message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgement {
    pub message: Option<String>,
}

/// Downloaded export blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub content_type: String,
    pub bytes: Bytes,
}

/// What the wizard needs from the backend.
#[async_trait]
pub trait ApplicationSubmitter: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, GatewayError>;
}

/// What the admin list state needs from the backend.
#[async_trait]
pub trait ApplicationDirectory: Send + Sync {
    async fn list(&self, page: u32) -> Result<ApplicationListPage, GatewayError>;
    async fn search(&self, term: &str) -> Result<Vec<Application>, GatewayError>;
    async fn update_status(
        &self,
        reference: &ReferenceNo,
        status: ApplicationStatus,
    ) -> Result<Acknowledgement, GatewayError>;
    async fn download_export(&self) -> Result<ExportFile, GatewayError>;
}

/// Shape-translating client for the merchant backend.
pub struct ApplicationGateway<T> {
    transport: Arc<T>,
    base_path: String,
    page_size: usize,
    token: RwLock<Option<String>>,
}

impl<T: Transport> ApplicationGateway<T> {
    pub fn new(transport: Arc<T>, base_path: impl Into<String>, page_size: usize) -> Self {
        Self {
            transport,
            base_path: base_path.into(),
            page_size: page_size.max(1),
            token: RwLock::new(None),
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_bearer_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    pub fn bearer_token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_path, endpoint)
    }

    async fn execute(&self, context: &'static str, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(context, error = %err, "backend unreachable");
                return Err(err.into());
            }
        };

        if response.status.is_success() {
            return Ok(response);
        }

        let message = error_message(&response.body);
        warn!(context, status = %response.status, %message, "backend returned an error");
        if response.status == StatusCode::UNAUTHORIZED {
            Err(GatewayError::Unauthorized)
        } else {
            Err(GatewayError::Status {
                status: response.status,
                message,
            })
        }
    }

    async fn execute_json<R: DeserializeOwned>(
        &self,
        context: &'static str,
        request: ApiRequest,
    ) -> Result<R, GatewayError> {
        let response = self.execute(context, request).await?;
        serde_json::from_slice(&response.body).map_err(|err| {
            warn!(context, error = %err, "backend response did not match the expected shape");
            GatewayError::Decode(err.to_string())
        })
    }

    fn admin_get(&self, endpoint: &str) -> ApiRequest {
        ApiRequest::get(self.url(endpoint)).with_bearer(self.bearer_token())
    }

    fn admin_post<B: Serialize>(&self, endpoint: &str, body: &B) -> Result<ApiRequest, GatewayError> {
        Ok(ApiRequest::post(self.url(endpoint), to_json(body)?).with_bearer(self.bearer_token()))
    }

    pub async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, GatewayError> {
        let request = ApiRequest::post(self.url("/company_data"), to_json(payload)?);
        let response: SubmitResponse = self.execute_json("submit", request).await?;

        if !response.success {
            return Err(GatewayError::Rejected {
                message: response.message,
            });
        }

        let application = match response.data {
            Some(record) => match application_from_record(record) {
                Ok(application) => Some(application),
                Err(err) => {
                    warn!(error = %err, "submission echoed an unidentifiable record");
                    None
                }
            },
            None => None,
        };

        let reference = response
            .reference
            .map(ReferenceNo)
            .or_else(|| application.as_ref().map(|app| app.reference.clone()))
            .ok_or_else(|| GatewayError::Decode("submission response carried no reference".to_string()))?;

        info!(reference = %reference, "application submitted");
        Ok(SubmitReceipt {
            reference,
            message: response.message,
            application,
        })
    }

    pub async fn list(&self, page: u32) -> Result<ApplicationListPage, GatewayError> {
        let page = page.max(1);
        let response: DashboardPageResponse = self
            .execute_json("list", self.admin_get(&format!("/admin/dashboard/{page}")))
            .await?;

        let total_pages = response.total_pages.max(1);
        let (total_count, count_is_estimate) = match response.total {
            Some(total) => (total, false),
            None => (u64::from(total_pages) * self.page_size as u64, true),
        };

        Ok(ApplicationListPage {
            applications: applications_from_records(response.companies),
            current_page: response.current_page.unwrap_or(page),
            total_pages,
            total_count,
            count_is_estimate,
        })
    }

    pub async fn search(&self, term: &str) -> Result<Vec<Application>, GatewayError> {
        let endpoint = format!(
            "/admin/dashboard/find-company/{}",
            encode_path_segment(term.trim())
        );
        let records = self.execute_json("search", self.admin_get(&endpoint)).await?;
        Ok(applications_from_records(records))
    }

    pub async fn update_status(
        &self,
        reference: &ReferenceNo,
        status: ApplicationStatus,
    ) -> Result<Acknowledgement, GatewayError> {
        let body = StatusUpdateRequest {
            reference_no: reference.0.clone(),
            status: status.label().to_string(),
        };
        let request = self.admin_post("/admin/update-application-status", &body)?;
        let ack: AckResponse = self.execute_json("update_status", request).await?;
        if !ack.success {
            return Err(GatewayError::Rejected {
                message: ack.message.unwrap_or_else(|| "status update refused".to_string()),
            });
        }
        info!(reference = %reference, status = status.label(), "application status updated");
        Ok(Acknowledgement {
            message: ack.message,
        })
    }

    pub async fn download_export(&self) -> Result<ExportFile, GatewayError> {
        let response = self
            .execute("download_export", self.admin_get("/admin/dashboard/download"))
            .await?;
        Ok(ExportFile {
            content_type: response
                .content_type
                .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
            bytes: response.body,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, GatewayError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = ApiRequest::post(self.url("/auth/login"), to_json(&body)?);
        self.execute_json("login", request).await
    }

    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<Acknowledgement, GatewayError> {
        let body = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };
        let request = self.admin_post("/auth/change-password", &body)?;
        self.acknowledge("change_password", request).await
    }

    pub async fn change_username(
        &self,
        new_username: &str,
        current_password: &str,
    ) -> Result<Acknowledgement, GatewayError> {
        let body = ChangeUsernameRequest {
            new_username: new_username.to_string(),
            current_password: current_password.to_string(),
        };
        let request = self.admin_post("/auth/change-username", &body)?;
        self.acknowledge("change_username", request).await
    }

    async fn acknowledge(&self, context: &'static str, request: ApiRequest) -> Result<Acknowledgement, GatewayError> {
        let ack: AckResponse = self.execute_json(context, request).await?;
        if ack.success {
            Ok(Acknowledgement {
                message: ack.message,
            })
        } else {
            Err(GatewayError::Rejected {
                message: ack.message.unwrap_or_default(),
            })
        }
    }
}

#[async_trait]
impl<T: Transport> ApplicationSubmitter for ApplicationGateway<T> {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmitReceipt, GatewayError> {
        ApplicationGateway::submit(self, payload).await
    }
}

#[async_trait]
impl<T: Transport> ApplicationDirectory for ApplicationGateway<T> {
    async fn list(&self, page: u32) -> Result<ApplicationListPage, GatewayError> {
        ApplicationGateway::list(self, page).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Application>, GatewayError> {
        ApplicationGateway::search(self, term).await
    }

    async fn update_status(
        &self,
        reference: &ReferenceNo,
        status: ApplicationStatus,
    ) -> Result<Acknowledgement, GatewayError> {
        ApplicationGateway::update_status(self, reference, status).await
    }

    async fn download_export(&self) -> Result<ExportFile, GatewayError> {
        ApplicationGateway::download_export(self).await
    }
}

fn to_json<B: Serialize>(body: &B) -> Result<Value, GatewayError> {
    serde_json::to_value(body).map_err(|err| GatewayError::Decode(err.to_string()))
}

fn error_message(body: &[u8]) -> String {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();
    parsed
        .as_ref()
        .and_then(|value| value.get("message").or_else(|| value.get("error")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string())
}

/// Percent-encodes everything outside the RFC 3986 unreserved set.
pub(crate) fn encode_path_segment(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{other:02X}")),
        }
    }
    encoded
}
