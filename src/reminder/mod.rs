//! Daily appointment reminders.
//!
//! [`ReminderJob`] scans tomorrow's appointments and pushes a reminder to
//! each patient's devices. [`ReminderScheduler`] fires the job on a cron
//! schedule. Reminders go straight to the push gateway: no pruning and no
//! history records.

pub mod schedule;
pub mod worker;

pub use schedule::ReminderScheduler;
pub use worker::{tomorrow_window, ReminderError, ReminderJob, ReminderSummary};
