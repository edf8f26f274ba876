use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::{json, Value};

use crate::gateway::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use crate::gateway::ApplicationGateway;

/// Replays queued responses and records every request it sees.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<ApiResponse, TransportError>>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn reply(&self, status: StatusCode, body: Value) -> &Self {
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .push_back(Ok(ApiResponse::json(status, &body)));
        self
    }

    pub(crate) fn fail(&self, error: TransportError) -> &Self {
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .push_back(Err(error));
        self
    }

    pub(crate) fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    pub(crate) fn last_request(&self) -> ApiRequest {
        self.requests()
            .pop()
            .expect("at least one request was sent")
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request);
        self.responses
            .lock()
            .expect("responses mutex poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Connection("no scripted response".to_string())))
    }
}

pub(crate) fn gateway() -> (ApplicationGateway<ScriptedTransport>, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::default());
    (ApplicationGateway::new(transport.clone(), "/api", 10), transport)
}

pub(crate) fn company_row(reference: &str, business: &str, status: &str) -> Value {
    json!({
        "reference_no": reference,
        "registered_by_name": "Liza Manalo",
        "registered_by_contact_number": "09171234567",
        "contact_person_name": "Paolo Reyes",
        "contact_number": "09281234567",
        "business_name": business,
        "business_email": "hello@example.ph",
        "business_address": "12 Rizal Avenue, Makati City",
        "has_existing_payment_portal": "NO",
        "current_mode_of_payment": "{\"cash\":true,\"eWallets\":false,\"qrph\":true,\"cardPayment\":false}",
        "estimated_transaction_numbers": "51 – 100",
        "estimated_average_amount": "1 – 10,000",
        "status": status,
        "submitted_at": "2025-08-15T10:30:00Z"
    })
}
