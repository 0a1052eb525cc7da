//! One operation per clinic event: validate, compose, dispatch.

use std::sync::Arc;

use crate::directory::Directory;
use crate::error::{AppError, AppResult};
use crate::models::event::{
    AppointmentStatusEvent, NewAppointmentEvent, PaymentDueEvent, PaymentStatusEvent,
    PaymentUploadEvent, ScheduleChangeRequestEvent, ScheduleUpdatedEvent,
};
use crate::models::{DispatchOutcome, Recipient, Role};
use crate::services::dispatch::DispatchEngine;
use crate::services::templates;

/// Result of one leg of a multi-recipient event
#[derive(Debug)]
pub struct TargetReport {
    pub recipient: Recipient,
    pub result: AppResult<DispatchOutcome>,
}

impl TargetReport {
    pub fn is_delivered(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.is_delivered())
    }
}

/// Per-recipient results of an event that notifies several parties independently
#[derive(Debug, Default)]
pub struct FanoutReport {
    pub targets: Vec<TargetReport>,
}

impl FanoutReport {
    fn push(&mut self, recipient: Recipient, result: AppResult<DispatchOutcome>) {
        if let Err(e) = &result {
            log::warn!("Notification to {} not delivered: {}", recipient, e);
        }
        self.targets.push(TargetReport { recipient, result });
    }

    pub fn delivered_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_delivered()).count()
    }

    pub fn all_delivered(&self) -> bool {
        !self.targets.is_empty() && self.delivered_count() == self.targets.len()
    }

    pub fn none_delivered(&self) -> bool {
        self.delivered_count() == 0
    }

    /// Recipients that received nothing
    pub fn undelivered(&self) -> impl Iterator<Item = &Recipient> {
        self.targets
            .iter()
            .filter(|t| !t.is_delivered())
            .map(|t| &t.recipient)
    }
}

/// Event flows of the clinic app
#[derive(Clone)]
pub struct ClinicNotifier {
    directory: Arc<dyn Directory>,
    engine: DispatchEngine,
}

impl ClinicNotifier {
    pub fn new(directory: Arc<dyn Directory>, engine: DispatchEngine) -> Self {
        Self { directory, engine }
    }

    /// Broadcasts a new appointment to all staff
    pub async fn new_appointment(&self, event: &NewAppointmentEvent) -> AppResult<DispatchOutcome> {
        event.validate()?;

        let message = match event.custom_text() {
            Some((title, body)) => {
                templates::new_appointment_custom(&event.appointment_id, title, body)
            }
            None => {
                let appointment = self
                    .directory
                    .appointment_by_id(&event.appointment_id)
                    .await?;
                templates::new_appointment(&appointment)
            }
        };

        self.engine.notify(&Recipient::all_staff(), &message).await
    }

    /// Tells both the patient and the doctor about a confirmation or cancellation
    pub async fn appointment_status(&self, event: &AppointmentStatusEvent) -> AppResult<FanoutReport> {
        event.validate()?;

        let message = templates::appointment_status(
            event.status,
            &event.appointment_date,
            &event.appointment_time,
        );

        let patient = Recipient::user(Role::Patient, &event.patient_id);
        let doctor = Recipient::user(Role::Doctor, &event.doctor_id);

        let mut report = FanoutReport::default();
        let result = self.engine.notify(&patient, &message).await;
        report.push(patient, result);
        let result = self.engine.notify(&doctor, &message).await;
        report.push(doctor, result);

        Ok(report)
    }

    pub async fn payment_due(&self, event: &PaymentDueEvent) -> AppResult<DispatchOutcome> {
        let amount = event.amount()?;
        let message = templates::payment_due(&amount);

        self.engine
            .notify(&Recipient::user(Role::Patient, &event.patient_id), &message)
            .await
    }

    /// Broadcasts an uploaded payment slip to all staff
    pub async fn payment_uploaded(&self, event: &PaymentUploadEvent) -> AppResult<DispatchOutcome> {
        event.validate()?;

        let patient = self.directory.user_by_id(&event.patient_id).await?;
        let appointment = self
            .directory
            .appointment_by_id(&event.appointment_id)
            .await?;

        let message = templates::payment_uploaded(
            &event.patient_id,
            &patient.display_name(),
            &appointment,
            &event.slip_url,
        );

        self.engine.notify(&Recipient::all_staff(), &message).await
    }

    pub async fn payment_status(&self, event: &PaymentStatusEvent) -> AppResult<DispatchOutcome> {
        event.validate()?;

        let appointment = self
            .directory
            .appointment_by_id(&event.appointment_id)
            .await?;
        let message = templates::payment_status(&appointment, &event.status);

        self.engine
            .notify(&Recipient::user(Role::Patient, &event.patient_id), &message)
            .await
    }

    /// Notifies staff of the request and acknowledges it to the doctor
    pub async fn schedule_change_request(
        &self,
        event: &ScheduleChangeRequestEvent,
    ) -> AppResult<FanoutReport> {
        let date = event.validate()?;
        let doctor_name = self.doctor_name(&event.doctor_id).await?;

        let staff_message = templates::schedule_change_request(
            &doctor_name,
            date,
            &event.schedule_time,
            &event.reason,
        );
        let doctor_message = templates::schedule_request_submitted(date, &event.schedule_time);

        let staff = Recipient::all_staff();
        let doctor = Recipient::user(Role::Doctor, &event.doctor_id);

        let mut report = FanoutReport::default();
        let result = self.engine.notify(&staff, &staff_message).await;
        report.push(staff, result);
        let result = self.engine.notify(&doctor, &doctor_message).await;
        report.push(doctor, result);

        Ok(report)
    }

    pub async fn schedule_updated(&self, event: &ScheduleUpdatedEvent) -> AppResult<DispatchOutcome> {
        let date = event.validate()?;
        let message = templates::schedule_updated(date, &event.start_time, &event.end_time);

        self.engine
            .notify(&Recipient::user(Role::Doctor, &event.doctor_id), &message)
            .await
    }

    async fn doctor_name(&self, doctor_id: &str) -> AppResult<String> {
        match self.directory.user_by_id(doctor_id).await {
            Ok(doctor) => Ok(format!("Doctor {}", doctor.display_name())),
            Err(AppError::UserNotFound(_)) => Ok(format!("Doctor (ID: {})", doctor_id)),
            Err(e) => Err(e),
        }
    }
}
