use actix_web::{http::StatusCode, web, HttpResponse};
use serde::Serialize;

use crate::context::AppContext;
use crate::error::{AppError, AppResult};
use crate::models::event::{
    AppointmentStatusEvent, NewAppointmentEvent, PaymentDueEvent, PaymentStatusEvent,
    PaymentUploadEvent, ScheduleChangeRequestEvent, ScheduleUpdatedEvent,
};
use crate::models::{DispatchOutcome, Recipient, RecipientId};
use crate::services::FanoutReport;

/// Body returned by every notification route that reached the gateway
#[derive(Debug, Serialize)]
pub struct DispatchResponse {
    pub success: bool,
    pub message: String,
    /// Device addresses that accepted the message
    pub delivered: usize,
    /// Device addresses the gateway rejected
    pub failed: usize,
}

/// 200 when at least one device accepted the message, `DeliveryFailed` otherwise
fn single_target(outcome: DispatchOutcome, sent_to: &str) -> AppResult<HttpResponse> {
    if !outcome.is_delivered() {
        return Err(AppError::DeliveryFailed(format!(
            "no device accepted the notification for {}",
            sent_to
        )));
    }

    Ok(HttpResponse::Ok().json(DispatchResponse {
        success: true,
        message: format!("Notification sent to {}", sent_to),
        delivered: outcome.succeeded.len(),
        failed: outcome.failed.len(),
    }))
}

fn audience(recipient: &Recipient) -> String {
    match recipient.id {
        RecipientId::AllStaff => "staff".to_string(),
        RecipientId::User(_) => recipient.role.as_str().to_lowercase(),
    }
}

/// 200 when every recipient got it, 207 when only some did, 500 when none did
fn multi_target(report: FanoutReport) -> HttpResponse {
    let (delivered, failed) = report
        .targets
        .iter()
        .filter_map(|t| t.result.as_ref().ok())
        .fold((0, 0), |(d, f), o| (d + o.succeeded.len(), f + o.failed.len()));

    let reached: Vec<String> = report
        .targets
        .iter()
        .filter(|t| t.is_delivered())
        .map(|t| audience(&t.recipient))
        .collect();
    let missed: Vec<String> = report.undelivered().map(audience).collect();

    let (status, success, message) = if report.all_delivered() {
        (
            StatusCode::OK,
            true,
            format!("Notification sent to {}", reached.join(" and ")),
        )
    } else if report.none_delivered() {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            false,
            "Failed to send notifications".to_string(),
        )
    } else {
        (
            StatusCode::MULTI_STATUS,
            false,
            format!(
                "Sent to {} only, {} notification failed",
                reached.join(" and "),
                missed.join(" and ")
            ),
        )
    };

    HttpResponse::build(status).json(DispatchResponse {
        success,
        message,
        delivered,
        failed,
    })
}

/// POST /new-appointment-notification
pub async fn new_appointment(
    ctx: web::Data<AppContext>,
    body: web::Json<NewAppointmentEvent>,
) -> AppResult<HttpResponse> {
    let outcome = ctx.clinic().new_appointment(&body).await?;
    single_target(outcome, "staff")
}

/// POST /appointment-status-notification
pub async fn appointment_status(
    ctx: web::Data<AppContext>,
    body: web::Json<AppointmentStatusEvent>,
) -> AppResult<HttpResponse> {
    let report = ctx.clinic().appointment_status(&body).await?;
    Ok(multi_target(report))
}

/// POST /payment-due-notification
pub async fn payment_due(
    ctx: web::Data<AppContext>,
    body: web::Json<PaymentDueEvent>,
) -> AppResult<HttpResponse> {
    let outcome = ctx.clinic().payment_due(&body).await?;
    single_target(outcome, "patient")
}

/// POST /notify-staff-payment-upload
pub async fn payment_uploaded(
    ctx: web::Data<AppContext>,
    body: web::Json<PaymentUploadEvent>,
) -> AppResult<HttpResponse> {
    let outcome = ctx.clinic().payment_uploaded(&body).await?;
    single_target(outcome, "staff")
}

/// POST /notify-payment-status
pub async fn payment_status(
    ctx: web::Data<AppContext>,
    body: web::Json<PaymentStatusEvent>,
) -> AppResult<HttpResponse> {
    let outcome = ctx.clinic().payment_status(&body).await?;
    single_target(outcome, "patient")
}

/// POST /notify-schedule-change-request
pub async fn schedule_change_request(
    ctx: web::Data<AppContext>,
    body: web::Json<ScheduleChangeRequestEvent>,
) -> AppResult<HttpResponse> {
    let report = ctx.clinic().schedule_change_request(&body).await?;
    Ok(multi_target(report))
}

/// POST /notify-doctor-schedule-updated
pub async fn schedule_updated(
    ctx: web::Data<AppContext>,
    body: web::Json<ScheduleUpdatedEvent>,
) -> AppResult<HttpResponse> {
    let outcome = ctx.clinic().schedule_updated(&body).await?;
    single_target(outcome, "doctor")
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/new-appointment-notification", web::post().to(new_appointment))
        .route(
            "/appointment-status-notification",
            web::post().to(appointment_status),
        )
        .route("/payment-due-notification", web::post().to(payment_due))
        .route("/notify-staff-payment-upload", web::post().to(payment_uploaded))
        .route("/notify-payment-status", web::post().to(payment_status))
        .route(
            "/notify-schedule-change-request",
            web::post().to(schedule_change_request),
        )
        .route(
            "/notify-doctor-schedule-updated",
            web::post().to(schedule_updated),
        );
}
