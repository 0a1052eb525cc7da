//! Read access to the clinic directory (users and appointments) plus the one
//! write the dispatcher performs: pruning dead device addresses.

pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::BoxStream;
use std::collections::BTreeSet;

use crate::error::AppResult;
use crate::models::{Appointment, DeviceAddress, Role, User};

pub use postgres::PgDirectory;

/// Directory lookups consumed by the dispatcher and the reminder job
#[async_trait]
pub trait Directory: Send + Sync {
    /// Concatenated address books of every user with `role`
    async fn addresses_for_role(&self, role: Role) -> AppResult<Vec<DeviceAddress>>;

    /// Address book of one user; `UserNotFound` if the user does not exist
    async fn addresses_for_user(&self, user_id: &str) -> AppResult<Vec<DeviceAddress>>;

    async fn user_by_id(&self, user_id: &str) -> AppResult<User>;

    /// Removes every address in `invalid` from every address book containing it.
    ///
    /// Each user is rewritten atomically and independently; a failure on one
    /// user is logged and does not stop the others. Returns how many users
    /// were updated.
    async fn prune_addresses(&self, invalid: &BTreeSet<DeviceAddress>) -> AppResult<usize>;

    async fn appointment_by_id(&self, appointment_id: &str) -> AppResult<Appointment>;

    /// Appointments with `start <= appointment_date < end`, streamed lazily
    fn appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxStream<'_, AppResult<Appointment>>;
}
