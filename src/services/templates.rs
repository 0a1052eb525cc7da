//! Title/body/data composition for each notification type.

use chrono::NaiveDate;

use crate::models::{Appointment, AppointmentStatus, Message, NotificationKind, DISPLAY_DATE_FORMAT};

pub fn display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Staff broadcast for a freshly booked appointment
pub fn new_appointment(appointment: &Appointment) -> Message {
    Message::new(
        NotificationKind::NewAppointment,
        "New appointment",
        format!(
            "A new appointment was booked for {} at {}. Please review it.",
            appointment.display_date(),
            appointment.display_time()
        ),
    )
    .with_data("appointment_id", &appointment.id)
}

/// Staff broadcast with caller-supplied wording
pub fn new_appointment_custom(appointment_id: &str, title: &str, body: &str) -> Message {
    Message::new(NotificationKind::NewAppointment, title, body)
        .with_data("appointment_id", appointment_id)
}

pub fn appointment_status(status: AppointmentStatus, date: &str, time: &str) -> Message {
    Message::new(
        NotificationKind::AppointmentStatus,
        "Appointment status",
        format!("Your appointment {} for {} at {}", status.outcome_phrase(), date, time),
    )
    .with_data("status", status)
}

pub fn appointment_reminder(appointment: &Appointment) -> Message {
    Message::new(
        NotificationKind::AppointmentReminder,
        "Appointment reminder",
        format!(
            "You have an appointment tomorrow at {}",
            appointment.display_time()
        ),
    )
    .with_data("appointment_id", &appointment.id)
}

pub fn payment_due(amount: &str) -> Message {
    Message::new(
        NotificationKind::PaymentDue,
        "Treatment fee due",
        format!(
            "You have a treatment fee of {} THB due. Please complete your payment.",
            amount
        ),
    )
    .with_data("amount", amount)
}

pub fn payment_uploaded(
    patient_id: &str,
    patient_name: &str,
    appointment: &Appointment,
    slip_url: &str,
) -> Message {
    let date = appointment.display_date();
    let time = appointment.display_time();

    Message::new(
        NotificationKind::PaymentUpload,
        "Payment slip uploaded",
        format!(
            "Patient {} uploaded a payment slip for the appointment on {} at {}",
            patient_name, date, time
        ),
    )
    .with_data("patient_id", patient_id)
    .with_data("patient_name", patient_name)
    .with_data("appointment_date", date)
    .with_data("appointment_time", time)
    .with_data("slip_url", slip_url)
}

pub fn payment_status(appointment: &Appointment, status: &str) -> Message {
    let date = appointment.display_date();
    let time = appointment.display_time();

    Message::new(
        NotificationKind::PaymentStatus,
        "Payment status",
        format!(
            "Payment status for your appointment on {} at {}: {}",
            date, time, status
        ),
    )
    .with_data("appointment_id", &appointment.id)
    .with_data("appointment_date", date)
    .with_data("appointment_time", time)
    .with_data("status", status)
}

/// Staff broadcast when a doctor asks to change a shift
pub fn schedule_change_request(
    doctor_name: &str,
    date: NaiveDate,
    time: &str,
    reason: &str,
) -> Message {
    let date = display_date(date);

    Message::new(
        NotificationKind::ScheduleChangeRequest,
        "Schedule change request",
        format!(
            "{} requested a schedule change for {} at {}. Reason: {}",
            doctor_name, date, time, reason
        ),
    )
    .with_data("doctor_name", doctor_name)
    .with_data("schedule_date", date)
    .with_data("schedule_time", time)
}

/// Acknowledgement to the doctor who filed a schedule change request
pub fn schedule_request_submitted(date: NaiveDate, time: &str) -> Message {
    let date = display_date(date);

    Message::new(
        NotificationKind::ScheduleRequestSubmitted,
        "Schedule change request submitted",
        format!(
            "Your schedule change request for {} at {} was submitted. Please wait for staff review.",
            date, time
        ),
    )
    .with_data("schedule_date", date)
    .with_data("schedule_time", time)
    .with_data("status", "pending")
}

pub fn schedule_updated(date: NaiveDate, start_time: &str, end_time: &str) -> Message {
    Message::new(
        NotificationKind::ScheduleUpdated,
        "Schedule updated",
        format!(
            "Your shift was changed to {} from {} to {}. Please check the details.",
            display_date(date),
            start_time,
            end_time
        ),
    )
    .with_data("schedule_date", date.format("%Y-%m-%d"))
    .with_data("start_time", start_time)
    .with_data("end_time", end_time)
}
