//! Unit tests for the HTTP layer
//!
//! Routes run against in-memory backends, so only status mapping and bodies
//! are under test here.

use actix_web::{http::StatusCode, test, web, App};
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use clinic_notifier::models::Role;
use clinic_notifier::routes;

use crate::common::{appointment, user, Backends, FakeDirectory, FakeGateway, FakeHistory};

fn directory() -> FakeDirectory {
    FakeDirectory::new()
        .with_user(user("staff-1", Role::Staff, "Somchai", &["staff-token"]))
        .with_user(user("doc-1", Role::Doctor, "Prasert", &["doc-token"]))
        .with_user(user("pat-1", Role::Patient, "Anong", &["pat-a", "pat-b"]))
        .with_appointment(appointment(
            "appt-1",
            "pat-1",
            Utc.with_ymd_and_hms(2025, 2, 17, 3, 0, 0).unwrap(),
            "10:00",
        ))
}

async fn post(backends: &Backends, uri: &str, body: Value) -> (StatusCode, Value) {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(backends.context()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri(uri)
        .set_json(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body: Value = test::read_body_json(resp).await;
    (status, body)
}

// =============================================================================
// Single-target routes
// =============================================================================

#[actix_web::test]
async fn test_payment_due_partial_delivery_is_ok() {
    let backends = Backends::new(
        directory(),
        FakeGateway::new().rejecting(&["pat-b"]),
        FakeHistory::new(),
    );

    let (status, body) = post(
        &backends,
        "/payment-due-notification",
        json!({"patient_id": "pat-1", "amount": 500}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["delivered"], 1);
    assert_eq!(body["failed"], 1);
    assert_eq!(backends.directory.tokens_of("pat-1"), vec!["pat-a".to_string()]);
}

#[actix_web::test]
async fn test_nothing_delivered_is_500() {
    let backends = Backends::new(
        directory(),
        FakeGateway::new().rejecting(&["pat-a", "pat-b"]),
        FakeHistory::new(),
    );

    let (status, body) = post(
        &backends,
        "/payment-due-notification",
        json!({"patient_id": "pat-1", "amount": 500}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "DeliveryFailed");
    assert!(backends.history.records().is_empty());
}

#[actix_web::test]
async fn test_push_credentials_failure_is_500_and_keeps_tokens() {
    let backends = Backends::new(directory(), FakeGateway::new().unauthorized(), FakeHistory::new());

    let (status, body) = post(
        &backends,
        "/new-appointment-notification",
        json!({"appointment_id": "appt-1", "title": "New booking", "body": "Anong, 10:00"}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["type"], "PushUnavailable");
    assert_eq!(backends.directory.tokens_of("staff-1"), vec!["staff-token".to_string()]);
    assert!(backends.directory.prune_calls().is_empty());
}

#[actix_web::test]
async fn test_missing_fields_is_400() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());

    let (status, body) = post(
        &backends,
        "/notify-staff-payment-upload",
        json!({"appointment_id": "appt-1", "patient_id": "pat-1"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "ValidationError");
    assert!(backends.gateway.calls().is_empty());
}

#[actix_web::test]
async fn test_malformed_json_is_400() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());

    let (status, body) = post(
        &backends,
        "/appointment-status-notification",
        json!({"patient_id": "pat-1", "status": "done"}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "ValidationError");
}

#[actix_web::test]
async fn test_unknown_doctor_is_404() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());

    let (status, body) = post(
        &backends,
        "/notify-doctor-schedule-updated",
        json!({
            "doctor_id": "doc-404",
            "schedule_date": "2025-02-17",
            "start_time": "08:00",
            "end_time": "16:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "UserNotFound");
}

#[actix_web::test]
async fn test_no_addresses_is_400() {
    let backends = Backends::new(
        directory().with_user(user("doc-2", Role::Doctor, "Wichai", &[])),
        FakeGateway::new(),
        FakeHistory::new(),
    );

    let (status, body) = post(
        &backends,
        "/notify-doctor-schedule-updated",
        json!({
            "doctor_id": "doc-2",
            "schedule_date": "2025-02-17",
            "start_time": "08:00",
            "end_time": "16:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "NoAddresses");
}

#[actix_web::test]
async fn test_unknown_appointment_is_404() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());

    let (status, _) = post(
        &backends,
        "/notify-payment-status",
        json!({"patient_id": "pat-1", "appointment_id": "appt-404", "status": "approved"}),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_new_appointment_reaches_staff() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());

    let (status, body) = post(
        &backends,
        "/new-appointment-notification",
        json!({"appointment_id": "appt-1"}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Notification sent to staff");
    assert_eq!(backends.gateway.sent_tokens(), vec!["staff-token".to_string()]);
}

// =============================================================================
// Two-target routes
// =============================================================================

#[actix_web::test]
async fn test_schedule_change_both_delivered_is_200() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());

    let (status, body) = post(
        &backends,
        "/notify-schedule-change-request",
        json!({
            "doctor_id": "doc-1",
            "schedule_date": "2025-02-17",
            "schedule_time": "08:00",
            "reason": "Conference"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Notification sent to staff and doctor");
    assert_eq!(backends.history.records().len(), 2);
}

#[actix_web::test]
async fn test_schedule_change_staff_only_is_207() {
    let backends = Backends::new(
        directory(),
        FakeGateway::new().rejecting(&["doc-token"]),
        FakeHistory::new(),
    );

    let (status, body) = post(
        &backends,
        "/notify-schedule-change-request",
        json!({
            "doctor_id": "doc-1",
            "schedule_date": "2025-02-17",
            "schedule_time": "08:00",
            "reason": "Conference"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::MULTI_STATUS);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Sent to staff only, doctor notification failed");
}

#[actix_web::test]
async fn test_appointment_status_none_delivered_is_500() {
    let backends = Backends::new(
        directory(),
        FakeGateway::new().rejecting(&["pat-a", "pat-b", "doc-token"]),
        FakeHistory::new(),
    );

    let (status, body) = post(
        &backends,
        "/appointment-status-notification",
        json!({
            "patient_id": "pat-1",
            "doctor_id": "doc-1",
            "status": "cancelled",
            "appointment_date": "17 February 2025",
            "appointment_time": "10:00"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(body["failed"], 3);
}

// =============================================================================
// History
// =============================================================================

#[actix_web::test]
async fn test_history_lists_recipient_records() {
    let backends = Backends::new(directory(), FakeGateway::new(), FakeHistory::new());
    post(
        &backends,
        "/payment-due-notification",
        json!({"patient_id": "pat-1", "amount": "750"}),
    )
    .await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(backends.context()))
            .configure(routes::history::configure),
    )
    .await;
    let req = test::TestRequest::get()
        .uri("/notifications/pat-1?limit=500")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let records = body.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["role"], "Patient");
    assert_eq!(records[0]["data"]["amount"], "750");
}
