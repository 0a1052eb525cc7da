//! Inbound event payloads.
//!
//! Required string fields default to empty so that a missing field and a
//! blank one are reported the same way by `validate`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::AppointmentStatus;
use crate::error::{AppError, AppResult};

fn require(fields: &[&str]) -> AppResult<()> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AppError::Validation("Missing required fields".to_string()));
    }
    Ok(())
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS[.fff]` or RFC 3339
pub fn parse_iso_date(value: &str) -> AppResult<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| AppError::Validation("Invalid date format".to_string()))
}

#[derive(Debug, Deserialize)]
pub struct NewAppointmentEvent {
    #[serde(default)]
    pub appointment_id: String,
    pub title: Option<String>,
    pub body: Option<String>,
}

impl NewAppointmentEvent {
    pub fn validate(&self) -> AppResult<()> {
        require(&[&self.appointment_id])
    }

    /// Caller-supplied wording, when both title and body are present
    pub fn custom_text(&self) -> Option<(&str, &str)> {
        match (self.title.as_deref(), self.body.as_deref()) {
            (Some(title), Some(body)) if !title.trim().is_empty() && !body.trim().is_empty() => {
                Some((title, body))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppointmentStatusEvent {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub doctor_id: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub appointment_time: String,
}

impl AppointmentStatusEvent {
    pub fn validate(&self) -> AppResult<()> {
        require(&[
            &self.patient_id,
            &self.doctor_id,
            &self.appointment_date,
            &self.appointment_time,
        ])
    }
}

/// Amounts arrive either as JSON numbers or as strings
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(serde_json::Number),
    Text(String),
}

impl Amount {
    /// Numeric zero and blank text count as no amount at all
    pub fn is_missing(&self) -> bool {
        match self {
            Amount::Number(n) => n.as_f64() == Some(0.0),
            Amount::Text(s) => s.trim().is_empty(),
        }
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s.trim()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentDueEvent {
    #[serde(default)]
    pub patient_id: String,
    pub amount: Option<Amount>,
}

impl PaymentDueEvent {
    /// Validated amount, rendered as it will appear in the message
    pub fn amount(&self) -> AppResult<String> {
        require(&[&self.patient_id])?;
        match &self.amount {
            Some(amount) if !amount.is_missing() => Ok(amount.to_string()),
            _ => Err(AppError::Validation("Missing required fields".to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentUploadEvent {
    #[serde(default)]
    pub appointment_id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub slip_url: String,
}

impl PaymentUploadEvent {
    pub fn validate(&self) -> AppResult<()> {
        require(&[&self.appointment_id, &self.patient_id, &self.slip_url])
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentStatusEvent {
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub appointment_id: String,
    #[serde(default)]
    pub status: String,
}

impl PaymentStatusEvent {
    pub fn validate(&self) -> AppResult<()> {
        require(&[&self.patient_id, &self.appointment_id, &self.status])
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleChangeRequestEvent {
    #[serde(default)]
    pub doctor_id: String,
    #[serde(default)]
    pub schedule_date: String,
    #[serde(default)]
    pub schedule_time: String,
    #[serde(default)]
    pub reason: String,
}

impl ScheduleChangeRequestEvent {
    /// Checks required fields and returns the parsed schedule date
    pub fn validate(&self) -> AppResult<NaiveDate> {
        require(&[
            &self.doctor_id,
            &self.schedule_date,
            &self.schedule_time,
            &self.reason,
        ])?;
        parse_iso_date(&self.schedule_date)
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleUpdatedEvent {
    #[serde(default)]
    pub doctor_id: String,
    #[serde(default)]
    pub schedule_date: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

impl ScheduleUpdatedEvent {
    /// Checks required fields and returns the parsed schedule date
    pub fn validate(&self) -> AppResult<NaiveDate> {
        require(&[
            &self.doctor_id,
            &self.schedule_date,
            &self.start_time,
            &self.end_time,
        ])?;
        parse_iso_date(&self.schedule_date)
    }
}
