use chrono::{DateTime, Local};
use cron::Schedule;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use super::{ReminderError, ReminderJob};

/// Fires a [`ReminderJob`] at every occurrence of a cron expression (local time)
pub struct ReminderScheduler {
    schedule: Schedule,
    job: Arc<ReminderJob>,
}

impl ReminderScheduler {
    pub fn new(expression: &str, job: Arc<ReminderJob>) -> Result<Self, cron::error::Error> {
        Ok(Self {
            schedule: Schedule::from_str(expression)?,
            job,
        })
    }

    pub fn next_run_after(&self, after: &DateTime<Local>) -> Option<DateTime<Local>> {
        self.schedule.after(after).next()
    }

    /// Sleeps until each occurrence and runs the job; never returns unless the
    /// schedule has no further occurrences. Abort the task to stop it.
    pub async fn run(self) {
        log::info!("Reminder scheduler started");

        loop {
            let now = Local::now();
            let Some(next) = self.next_run_after(&now) else {
                log::warn!("Reminder schedule has no upcoming runs, stopping");
                return;
            };

            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            log::debug!("Next reminder run at {}", next);
            tokio::time::sleep(wait).await;

            match self.job.run().await {
                Ok(_) => {}
                Err(ReminderError::AlreadyRunning) => {
                    log::warn!("Skipping reminder run: previous run still in progress");
                }
                Err(e) => log::error!("Reminder run failed: {}", e),
            }
        }
    }
}
