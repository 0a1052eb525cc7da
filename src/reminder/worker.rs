use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use futures_util::future::join_all;
use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::directory::Directory;
use crate::error::AppError;
use crate::models::{usable_addresses, Appointment};
use crate::services::push::PushGateway;
use crate::services::templates;

#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("reminder run already in progress")]
    AlreadyRunning,

    #[error(transparent)]
    App(#[from] AppError),
}

/// Counters for one reminder run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderSummary {
    /// Appointments found in the window
    pub appointments: usize,
    /// Appointments that could not be read, or whose patient was missing or
    /// had no usable address
    pub skipped: usize,
    pub sent: usize,
    pub failed: usize,
}

/// `[start of tomorrow, start of the day after)` in `now`'s time zone, as UTC
pub fn tomorrow_window<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Utc>, DateTime<Utc>) {
    let tz = now.timezone();
    let tomorrow = now.date_naive() + chrono::Duration::days(1);
    let day_after = tomorrow + chrono::Duration::days(1);

    (start_of_day(&tz, tomorrow), start_of_day(&tz, day_after))
}

/// Local midnight of `date`; if a DST gap swallows midnight, the first valid
/// instant of the day
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(midnight + chrono::Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Pushes "appointment tomorrow" reminders to patients
pub struct ReminderJob {
    directory: Arc<dyn Directory>,
    gateway: Arc<dyn PushGateway>,
    running: Mutex<()>,
}

impl ReminderJob {
    pub fn new(directory: Arc<dyn Directory>, gateway: Arc<dyn PushGateway>) -> Self {
        Self {
            directory,
            gateway,
            running: Mutex::new(()),
        }
    }

    pub async fn run(&self) -> Result<ReminderSummary, ReminderError> {
        self.run_at(Local::now()).await
    }

    /// Runs the scan as if the current time were `now`.
    ///
    /// Returns `AlreadyRunning` without doing anything if another run holds
    /// the lock, and the gateway's error if it cannot be authorized. Problems
    /// with a single appointment are logged and never stop the scan.
    pub async fn run_at<Tz: TimeZone>(
        &self,
        now: DateTime<Tz>,
    ) -> Result<ReminderSummary, ReminderError> {
        let _guard = self
            .running
            .try_lock()
            .map_err(|_| ReminderError::AlreadyRunning)?;

        self.gateway.authorize().await?;

        let (start, end) = tomorrow_window(&now);
        log::info!("Scanning appointments between {} and {}", start, end);

        let mut summary = ReminderSummary::default();
        let mut appointments = self.directory.appointments_in_range(start, end);

        while let Some(appointment) = appointments.next().await {
            summary.appointments += 1;
            match appointment {
                Ok(appointment) => self.remind(&appointment, &mut summary).await,
                Err(e) => {
                    log::error!("Skipping unreadable appointment: {}", e);
                    summary.skipped += 1;
                }
            }
        }

        log::info!(
            "Reminder run finished: {} appointment(s), {} skipped, {} sent, {} failed",
            summary.appointments,
            summary.skipped,
            summary.sent,
            summary.failed
        );

        Ok(summary)
    }

    async fn remind(&self, appointment: &Appointment, summary: &mut ReminderSummary) {
        let addresses = match self
            .directory
            .addresses_for_user(&appointment.patient_id)
            .await
        {
            Ok(addresses) => usable_addresses(addresses),
            Err(AppError::UserNotFound(_)) => {
                log::warn!(
                    "Patient {} of appointment {} not found, skipping",
                    appointment.patient_id,
                    appointment.id
                );
                summary.skipped += 1;
                return;
            }
            Err(e) => {
                log::error!(
                    "Failed to load addresses for patient {}: {}",
                    appointment.patient_id,
                    e
                );
                summary.skipped += 1;
                return;
            }
        };

        if addresses.is_empty() {
            log::warn!(
                "Patient {} has no device addresses, skipping appointment {}",
                appointment.patient_id,
                appointment.id
            );
            summary.skipped += 1;
            return;
        }

        let message = templates::appointment_reminder(appointment);
        let sends = addresses.iter().map(|address| {
            let message = &message;
            async move { (address, self.gateway.send(address, message).await) }
        });

        for (address, result) in join_all(sends).await {
            match result {
                Ok(()) => {
                    log::info!(
                        "Reminder for appointment {} sent to {}",
                        appointment.id,
                        address.redacted()
                    );
                    summary.sent += 1;
                }
                Err(rejected) => {
                    log::warn!(
                        "Reminder for appointment {} to {} rejected: {}",
                        appointment.id,
                        address.redacted(),
                        rejected
                    );
                    summary.failed += 1;
                }
            }
        }
    }
}
