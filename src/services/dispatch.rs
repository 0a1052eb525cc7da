//! Dispatch engine: fan a message out to every device of a recipient.
//!
//! One dispatch call goes through three strictly ordered steps:
//!
//! 1. send to every usable address (concurrently, no short-circuit)
//! 2. prune addresses the gateway rejected from every address book
//! 3. record one history entry if at least one send succeeded
//!
//! Steps 2 and 3 are best-effort. Their failures are logged and never change
//! the returned [`DispatchOutcome`]. The gateway is authorized once before
//! step 1; if that fails nothing is sent and nothing is pruned.

use futures_util::future::join_all;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::directory::Directory;
use crate::error::{AppError, AppResult};
use crate::models::{
    usable_addresses, DeviceAddress, DispatchOutcome, Message, Recipient, RecipientId, Role,
};
use crate::services::history::HistoryRecorder;
use crate::services::push::PushGateway;

#[derive(Clone)]
pub struct DispatchEngine {
    directory: Arc<dyn Directory>,
    gateway: Arc<dyn PushGateway>,
    history: HistoryRecorder,
}

impl DispatchEngine {
    pub fn new(
        directory: Arc<dyn Directory>,
        gateway: Arc<dyn PushGateway>,
        history: HistoryRecorder,
    ) -> Self {
        Self {
            directory,
            gateway,
            history,
        }
    }

    /// Resolves `recipient` to device addresses, then dispatches.
    ///
    /// A missing user propagates as `UserNotFound`.
    pub async fn notify(
        &self,
        recipient: &Recipient,
        message: &Message,
    ) -> AppResult<DispatchOutcome> {
        let addresses = self.resolve(recipient).await?;
        self.dispatch(addresses, message, recipient).await
    }

    pub async fn resolve(&self, recipient: &Recipient) -> AppResult<Vec<DeviceAddress>> {
        match &recipient.id {
            RecipientId::AllStaff => self.directory.addresses_for_role(Role::Staff).await,
            RecipientId::User(user_id) => self.directory.addresses_for_user(user_id).await,
        }
    }

    /// Sends `message` once to each distinct, non-blank address.
    ///
    /// Fails with `NoAddresses` before any I/O when nothing usable is left, and
    /// with the gateway's error when it cannot be authorized.
    pub async fn dispatch(
        &self,
        addresses: Vec<DeviceAddress>,
        message: &Message,
        recipient: &Recipient,
    ) -> AppResult<DispatchOutcome> {
        let targets = usable_addresses(addresses);
        if targets.is_empty() {
            log::warn!("No usable device addresses for {}", recipient);
            return Err(AppError::NoAddresses(recipient.to_string()));
        }

        self.gateway.authorize().await?;

        log::debug!(
            "Dispatching '{}' to {} ({} device(s))",
            message.title,
            recipient,
            targets.len()
        );

        let sends = targets.iter().map(|address| async move {
            let result = self.gateway.send(address, message).await;
            (address, result)
        });

        let mut outcome = DispatchOutcome::default();
        let mut stale = BTreeSet::new();
        for (address, result) in join_all(sends).await {
            match result {
                Ok(()) => {
                    log::info!("Push delivered to {}", address.redacted());
                    outcome.record_success(address.clone());
                }
                Err(rejected) => {
                    log::warn!(
                        "Push to {} rejected: {}",
                        address.redacted(),
                        rejected
                    );
                    if rejected.prunable {
                        stale.insert(address.clone());
                    }
                    outcome.record_failure(address.clone());
                }
            }
        }

        if !stale.is_empty() {
            match self.directory.prune_addresses(&stale).await {
                Ok(users) => log::info!(
                    "Pruned {} invalid address(es) from {} user(s)",
                    stale.len(),
                    users
                ),
                Err(e) => log::warn!("Failed to prune invalid addresses: {}", e),
            }
        }

        if outcome.is_delivered() {
            self.history.record(recipient, message).await;
        } else {
            log::error!("No device accepted '{}' for {}", message.title, recipient);
        }

        Ok(outcome)
    }
}
