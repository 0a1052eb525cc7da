//! In-memory stand-ins for the directory, push gateway and history store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::stream::{self, BoxStream};
use futures_util::StreamExt;
use std::collections::{BTreeSet, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use clinic_notifier::directory::Directory;
use clinic_notifier::error::{AppError, AppResult};
use clinic_notifier::models::{
    Appointment, DeviceAddress, HistoryRecord, Message, NewHistoryRecord, Role, User,
};
use clinic_notifier::services::{DeliveryRejected, HistoryStore, PushGateway};

pub fn user(id: &str, role: Role, first_name: &str, tokens: &[&str]) -> User {
    User {
        id: id.to_string(),
        role,
        first_name: Some(first_name.to_string()),
        last_name: Some("Test".to_string()),
        fcm_tokens: tokens.iter().map(|t| t.to_string()).collect(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn appointment(id: &str, patient_id: &str, date: DateTime<Utc>, time: &str) -> Appointment {
    Appointment {
        id: id.to_string(),
        patient_id: patient_id.to_string(),
        doctor_id: None,
        appointment_date: date,
        appointment_time: Some(time.to_string()),
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    users: Mutex<Vec<User>>,
    appointments: Mutex<Vec<Appointment>>,
    prune_calls: Mutex<Vec<BTreeSet<DeviceAddress>>>,
    ranges: Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>,
    fail_prune: AtomicBool,
    unreadable_rows: AtomicBool,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    pub fn with_appointment(self, appointment: Appointment) -> Self {
        self.appointments.lock().unwrap().push(appointment);
        self
    }

    pub fn failing_prune(self) -> Self {
        self.fail_prune.store(true, Ordering::SeqCst);
        self
    }

    /// Puts one undecodable row at the head of every appointment stream
    pub fn with_unreadable_row(self) -> Self {
        self.unreadable_rows.store(true, Ordering::SeqCst);
        self
    }

    pub fn tokens_of(&self, user_id: &str) -> Vec<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| u.fcm_tokens.clone())
            .unwrap_or_default()
    }

    pub fn all_tokens(&self) -> Vec<String> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .flat_map(|u| u.fcm_tokens.clone())
            .collect()
    }

    pub fn prune_calls(&self) -> Vec<BTreeSet<DeviceAddress>> {
        self.prune_calls.lock().unwrap().clone()
    }

    pub fn ranges(&self) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
        self.ranges.lock().unwrap().clone()
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn addresses_for_role(&self, role: Role) -> AppResult<Vec<DeviceAddress>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role == role)
            .flat_map(|u| u.addresses())
            .collect())
    }

    async fn addresses_for_user(&self, user_id: &str) -> AppResult<Vec<DeviceAddress>> {
        self.user_by_id(user_id).await.map(|u| u.addresses())
    }

    async fn user_by_id(&self, user_id: &str) -> AppResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))
    }

    async fn prune_addresses(&self, invalid: &BTreeSet<DeviceAddress>) -> AppResult<usize> {
        self.prune_calls.lock().unwrap().push(invalid.clone());
        if self.fail_prune.load(Ordering::SeqCst) {
            return Err(AppError::Internal("prune unavailable".to_string()));
        }

        let mut updated = 0;
        for user in self.users.lock().unwrap().iter_mut() {
            let before = user.fcm_tokens.len();
            user.fcm_tokens
                .retain(|t| !invalid.contains(&DeviceAddress::from(t.as_str())));
            if user.fcm_tokens.len() != before {
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn appointment_by_id(&self, appointment_id: &str) -> AppResult<Appointment> {
        self.appointments
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.id == appointment_id)
            .cloned()
            .ok_or_else(|| AppError::AppointmentNotFound(appointment_id.to_string()))
    }

    fn appointments_in_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> BoxStream<'_, AppResult<Appointment>> {
        self.ranges.lock().unwrap().push((start, end));
        let mut rows: Vec<AppResult<Appointment>> = Vec::new();
        if self.unreadable_rows.load(Ordering::SeqCst) {
            rows.push(Err(AppError::Internal(
                "column appointment_date: unexpected null".to_string(),
            )));
        }
        let matching = self
            .appointments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.appointment_date >= start && a.appointment_date < end)
            .cloned()
            .map(Ok)
            .collect::<Vec<_>>();
        rows.extend(matching);
        stream::iter(rows).boxed()
    }
}

/// Accepts every address except those marked rejected, and logs each call
#[derive(Default)]
pub struct FakeGateway {
    rejected: Mutex<HashSet<String>>,
    unauthorized_tokens: Mutex<HashSet<String>>,
    calls: Mutex<Vec<(String, Message)>>,
    hold: AtomicBool,
    unauthorized: AtomicBool,
    /// Signalled when a held send starts
    pub entered: Notify,
    /// Releases a held send
    pub release: Notify,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(self, tokens: &[&str]) -> Self {
        self.rejected
            .lock()
            .unwrap()
            .extend(tokens.iter().map(|t| t.to_string()));
        self
    }

    /// Fails these sends without blaming the address
    pub fn rejecting_unauthorized(self, tokens: &[&str]) -> Self {
        self.unauthorized_tokens
            .lock()
            .unwrap()
            .extend(tokens.iter().map(|t| t.to_string()));
        self
    }

    /// Fails `authorize`, as when credentials cannot be obtained
    pub fn unauthorized(self) -> Self {
        self.unauthorized.store(true, Ordering::SeqCst);
        self
    }

    /// Makes every send wait for `release` after signalling `entered`
    pub fn holding(self) -> Self {
        self.hold.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<(String, Message)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_tokens(&self) -> Vec<String> {
        self.calls().into_iter().map(|(t, _)| t).collect()
    }
}

#[async_trait]
impl PushGateway for FakeGateway {
    async fn authorize(&self) -> AppResult<()> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(AppError::PushUnavailable("invalid_grant".to_string()));
        }
        Ok(())
    }

    async fn send(
        &self,
        address: &DeviceAddress,
        message: &Message,
    ) -> Result<(), DeliveryRejected> {
        self.calls
            .lock()
            .unwrap()
            .push((address.as_str().to_string(), message.clone()));

        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if self.rejected.lock().unwrap().contains(address.as_str()) {
            return Err(DeliveryRejected::new("UNREGISTERED", Some(404)));
        }
        if self
            .unauthorized_tokens
            .lock()
            .unwrap()
            .contains(address.as_str())
        {
            return Err(DeliveryRejected::unauthorized("token expired mid-send"));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeHistory {
    records: Mutex<Vec<NewHistoryRecord>>,
    fail: AtomicBool,
}

impl FakeHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(self) -> Self {
        self.fail.store(true, Ordering::SeqCst);
        self
    }

    pub fn records(&self) -> Vec<NewHistoryRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl HistoryStore for FakeHistory {
    async fn append(&self, record: NewHistoryRecord) -> AppResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Internal("history unavailable".to_string()));
        }
        self.records.lock().unwrap().push(record);
        Ok(())
    }

    async fn list_for_recipient(
        &self,
        recipient_id: &str,
        limit: i64,
    ) -> AppResult<Vec<HistoryRecord>> {
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, r)| r.recipient_id == recipient_id)
            .take(limit.max(0) as usize)
            .map(|(i, r)| HistoryRecord {
                id: i as i64 + 1,
                recipient_id: r.recipient_id.clone(),
                role: r.role,
                title: r.title.clone(),
                body: r.body.clone(),
                data: sqlx::types::Json(r.data.clone()),
                created_at: Utc::now(),
            })
            .collect())
    }
}

/// Shared handles for wiring an `AppContext` while keeping access to the fakes
pub struct Backends {
    pub directory: Arc<FakeDirectory>,
    pub gateway: Arc<FakeGateway>,
    pub history: Arc<FakeHistory>,
}

impl Backends {
    pub fn new(directory: FakeDirectory, gateway: FakeGateway, history: FakeHistory) -> Self {
        Self {
            directory: Arc::new(directory),
            gateway: Arc::new(gateway),
            history: Arc::new(history),
        }
    }

    pub fn context(&self) -> clinic_notifier::context::AppContext {
        clinic_notifier::context::AppContext::new(
            self.directory.clone(),
            self.gateway.clone(),
            self.history.clone(),
        )
    }
}
