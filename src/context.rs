//! Shared service handles, built once at startup.

use std::sync::Arc;

use crate::directory::Directory;
use crate::reminder::ReminderJob;
use crate::services::{ClinicNotifier, DispatchEngine, HistoryRecorder, HistoryStore, PushGateway};

/// Backends every request handler and background job works against
#[derive(Clone)]
pub struct AppContext {
    pub directory: Arc<dyn Directory>,
    pub gateway: Arc<dyn PushGateway>,
    pub history: Arc<dyn HistoryStore>,
}

impl AppContext {
    pub fn new(
        directory: Arc<dyn Directory>,
        gateway: Arc<dyn PushGateway>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            directory,
            gateway,
            history,
        }
    }

    pub fn dispatcher(&self) -> DispatchEngine {
        DispatchEngine::new(
            self.directory.clone(),
            self.gateway.clone(),
            HistoryRecorder::new(self.history.clone()),
        )
    }

    pub fn clinic(&self) -> ClinicNotifier {
        ClinicNotifier::new(self.directory.clone(), self.dispatcher())
    }

    pub fn reminder_job(&self) -> ReminderJob {
        ReminderJob::new(self.directory.clone(), self.gateway.clone())
    }
}
