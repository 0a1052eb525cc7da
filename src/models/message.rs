//! Push message payloads.

use serde::Serialize;
use std::collections::BTreeMap;

/// Event discriminator carried in `data["type"]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewAppointment,
    AppointmentStatus,
    AppointmentReminder,
    PaymentDue,
    PaymentUpload,
    PaymentStatus,
    ScheduleChangeRequest,
    ScheduleRequestSubmitted,
    ScheduleUpdated,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewAppointment => "NEW_APPOINTMENT",
            NotificationKind::AppointmentStatus => "APPOINTMENT_STATUS",
            NotificationKind::AppointmentReminder => "APPOINTMENT_REMINDER",
            NotificationKind::PaymentDue => "PAYMENT_DUE",
            NotificationKind::PaymentUpload => "PAYMENT_UPLOAD",
            NotificationKind::PaymentStatus => "PAYMENT_STATUS",
            NotificationKind::ScheduleChangeRequest => "SCHEDULE_CHANGE_REQUEST",
            NotificationKind::ScheduleRequestSubmitted => "SCHEDULE_REQUEST_SUBMITTED",
            NotificationKind::ScheduleUpdated => "SCHEDULE_UPDATED",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title, body and string-valued data for one notification.
///
/// The gateway only accepts string values in `data`, so every field is
/// stringified on insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl Message {
    pub const TYPE_KEY: &'static str = "type";

    /// Creates a message tagged with `kind`
    pub fn new(kind: NotificationKind, title: impl Into<String>, body: impl Into<String>) -> Self {
        let mut data = BTreeMap::new();
        data.insert(Self::TYPE_KEY.to_string(), kind.as_str().to_string());
        Self {
            title: title.into(),
            body: body.into(),
            data,
        }
    }

    /// Adds a data field, stringifying the value
    pub fn with_data(mut self, key: &str, value: impl ToString) -> Self {
        self.data.insert(key.to_string(), value.to_string());
        self
    }

    pub fn kind(&self) -> Option<&str> {
        self.data.get(Self::TYPE_KEY).map(String::as_str)
    }
}
