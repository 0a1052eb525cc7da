//! Notification history (audit log of successful dispatches).

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;

use super::{Message, Recipient, Role};

/// Stored history entry
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct HistoryRecord {
    pub id: i64,
    pub recipient_id: String,
    pub role: Role,
    pub title: String,
    pub body: String,
    pub data: Json<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
}

/// History entry to append; the timestamp is assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHistoryRecord {
    pub recipient_id: String,
    pub role: Role,
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl NewHistoryRecord {
    pub fn new(recipient: &Recipient, message: &Message) -> Self {
        Self {
            recipient_id: recipient.id.to_string(),
            role: recipient.role,
            title: message.title.clone(),
            body: message.body.clone(),
            data: message.data.clone(),
        }
    }
}
