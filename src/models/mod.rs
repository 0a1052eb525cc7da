pub mod address;
pub mod appointment;
pub mod event;
pub mod history;
pub mod message;
pub mod recipient;
pub mod user;

pub use address::{usable_addresses, DeviceAddress, DispatchOutcome};
pub use appointment::{Appointment, AppointmentStatus, DISPLAY_DATE_FORMAT};
pub use history::{HistoryRecord, NewHistoryRecord};
pub use message::{Message, NotificationKind};
pub use recipient::{Recipient, RecipientId, Role};
pub use user::User;
