pub mod clinic;
pub mod dispatch;
pub mod history;
pub mod push;
pub mod templates;

pub use clinic::{ClinicNotifier, FanoutReport, TargetReport};
pub use dispatch::DispatchEngine;
pub use history::{HistoryRecorder, HistoryStore, PgHistoryStore};
pub use push::{DeliveryRejected, FcmClient, PushGateway};
