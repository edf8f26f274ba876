use axum::http::{Method, StatusCode};
use serde_json::json;

use super::common::{company_row, gateway};
use crate::domain::{ApplicationStatus, PaymentModes, ReferenceNo};
use crate::gateway::transport::TransportError;
use crate::gateway::wire::SubmissionPayload;
use crate::gateway::GatewayError;
use crate::onboarding::form::tests::complete_fields;

#[tokio::test]
async fn submit_sends_stringified_payment_modes() {
    let (gateway, transport) = gateway();
    transport.reply(
        StatusCode::CREATED,
        json!({
            "success": true,
            "message": "Application received",
            "reference": "ngsi-25-00042",
            "data": company_row("ngsi-25-00042", "Test Co", "pending")
        }),
    );

    let mut fields = complete_fields();
    fields.current_mode_of_payment = PaymentModes {
        cash: true,
        ..PaymentModes::default()
    };
    let receipt = gateway
        .submit(&SubmissionPayload::from_fields(&fields))
        .await
        .expect("submission accepted");

    assert_eq!(receipt.reference, ReferenceNo("ngsi-25-00042".to_string()));
    assert!(receipt.application.is_some());

    let request = transport.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/company_data");
    let body = request.body.expect("json body");
    assert_eq!(
        body["currentModeOfPayment"],
        json!(r#"{"cash":true,"eWallets":false,"qrph":false,"cardPayment":false}"#)
    );
    assert_eq!(body["businessName"], "Test Co");
    assert_eq!(body["businessEmail"], "a@b.com");
    assert!(body.get("telephoneNo").is_none());
}

#[tokio::test]
async fn submit_surfaces_unsuccessful_envelope() {
    let (gateway, transport) = gateway();
    transport.reply(
        StatusCode::OK,
        json!({"success": false, "message": "duplicate business email"}),
    );

    let error = gateway
        .submit(&SubmissionPayload::from_fields(&complete_fields()))
        .await
        .expect_err("rejected");
    assert!(matches!(error, GatewayError::Rejected { ref message } if message == "duplicate business email"));
}

#[tokio::test]
async fn list_unwraps_backend_page_with_exact_total() {
    let (gateway, transport) = gateway();
    transport.reply(
        StatusCode::OK,
        json!({
            "totalPages": 3,
            "total": 23,
            "companies": [
                company_row("ngsi-25-00001", "Alpha", "pending"),
                company_row("ngsi-25-00002", "Beta", "called")
            ]
        }),
    );

    let page = gateway.list(2).await.expect("page loads");
    assert_eq!(transport.last_request().path, "/api/admin/dashboard/2");
    assert_eq!(page.current_page, 2);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.total_count, 23);
    assert!(!page.count_is_estimate);
    assert_eq!(page.applications.len(), 2);
    assert_eq!(page.applications[1].status, ApplicationStatus::Called);
}

#[tokio::test]
async fn list_keeps_rows_beside_one_with_null_columns() {
    let (gateway, transport) = gateway();
    let mut sparse = company_row("ngsi-25-00003", "Gamma", "pending");
    sparse["registered_by_name"] = serde_json::Value::Null;
    sparse["business_name"] = serde_json::Value::Null;
    transport.reply(
        StatusCode::OK,
        json!({
            "totalPages": 1,
            "total": 3,
            "companies": [
                company_row("ngsi-25-00001", "Alpha", "pending"),
                sparse,
                company_row("ngsi-25-00002", "Beta", "called")
            ]
        }),
    );

    let page = gateway.list(1).await.expect("page loads");
    assert_eq!(page.applications.len(), 3);
    assert_eq!(page.applications[0].business_name, "Alpha");
    assert_eq!(page.applications[1].reference.as_str(), "ngsi-25-00003");
    assert_eq!(page.applications[1].business_name, "");
    assert_eq!(page.applications[2].business_name, "Beta");
}

#[tokio::test]
async fn list_estimates_total_when_backend_omits_it() {
    let (gateway, transport) = gateway();
    transport.reply(StatusCode::OK, json!({"totalPages": 4, "companies": []}));

    let page = gateway.list(1).await.expect("page loads");
    assert_eq!(page.total_count, 40);
    assert!(page.count_is_estimate);
}

#[tokio::test]
async fn admin_requests_carry_bearer_token() {
    let (gateway, transport) = gateway();
    gateway.set_bearer_token(Some("tok-123".to_string()));
    transport.reply(StatusCode::OK, json!([company_row("ngsi-25-00003", "Acme Hardware", "pending")]));

    let results = gateway.search("acme & sons").await.expect("search works");
    assert_eq!(results.len(), 1);

    let request = transport.last_request();
    assert_eq!(request.bearer.as_deref(), Some("tok-123"));
    assert_eq!(request.path, "/api/admin/dashboard/find-company/acme%20%26%20sons");
}

#[tokio::test]
async fn update_status_posts_reference_and_label() {
    let (gateway, transport) = gateway();
    transport.reply(StatusCode::OK, json!({"success": true, "message": "Status updated"}));

    let ack = gateway
        .update_status(&ReferenceNo("REF-001".to_string()), ApplicationStatus::Called)
        .await
        .expect("update accepted");
    assert_eq!(ack.message.as_deref(), Some("Status updated"));

    let body = transport.last_request().body.expect("body");
    assert_eq!(body, json!({"referenceNo": "REF-001", "status": "called"}));
}

#[tokio::test]
async fn http_errors_map_to_typed_failures() {
    let (gateway, transport) = gateway();
    transport
        .reply(StatusCode::UNAUTHORIZED, json!({"message": "token expired"}))
        .reply(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "db down"}))
        .fail(TransportError::Connection("refused".to_string()));

    let unauthorized = gateway.list(1).await.expect_err("401");
    assert!(matches!(unauthorized, GatewayError::Unauthorized));

    let server = gateway.list(1).await.expect_err("500");
    match &server {
        GatewayError::Status { status, message } => {
            assert_eq!(*status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(message, "db down");
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert_eq!(server.user_message(), "Server error. Please try again later.");

    let offline = gateway.list(1).await.expect_err("transport");
    assert!(matches!(offline, GatewayError::Transport(_)));
    assert!(offline.user_message().starts_with("Unable to connect"));
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let (gateway, transport) = gateway();
    transport.reply(StatusCode::OK, json!({"totalPages": "many"}));
    assert!(matches!(gateway.list(1).await, Err(GatewayError::Decode(_))));
}
