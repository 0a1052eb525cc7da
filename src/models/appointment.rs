use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Display format for calendar dates in message bodies, e.g. "17 February 2025"
pub const DISPLAY_DATE_FORMAT: &str = "%d %B %Y";

/// Appointment record (read-only to this service)
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Appointment {
    pub id: String,
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub appointment_date: DateTime<Utc>,
    /// Free-form time slot as entered by staff, e.g. "09:30"
    pub appointment_time: Option<String>,
}

impl Appointment {
    /// Appointment date in the server's local calendar
    pub fn display_date(&self) -> String {
        self.appointment_date
            .with_timezone(&Local)
            .format(DISPLAY_DATE_FORMAT)
            .to_string()
    }

    pub fn display_time(&self) -> String {
        self.appointment_time
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or("unspecified time")
            .to_string()
    }
}

/// Appointment status values sent by the clinic app.
///
/// The mobile client still sends the Thai literals, accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Confirmed by staff, waiting for the patient's payment
    #[serde(alias = "รอชำระเงิน")]
    AwaitingPayment,
    #[serde(alias = "ยกเลิก")]
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::AwaitingPayment => "awaiting_payment",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Wording used in status-change message bodies
    pub fn outcome_phrase(&self) -> &'static str {
        match self {
            AppointmentStatus::AwaitingPayment => "has been confirmed",
            AppointmentStatus::Cancelled => "has been cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
