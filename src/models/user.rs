use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::{DeviceAddress, Role};

/// User record from the clinic directory, including its address book
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub fcm_tokens: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "First Last", with a placeholder when the first name is missing
    pub fn display_name(&self) -> String {
        let first = self
            .first_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("Unknown");
        match self.last_name.as_deref().filter(|n| !n.trim().is_empty()) {
            Some(last) => format!("{} {}", first, last),
            None => first.to_string(),
        }
    }

    /// Registered device addresses in stored order
    pub fn addresses(&self) -> Vec<DeviceAddress> {
        self.fcm_tokens.iter().cloned().map(DeviceAddress::from).collect()
    }
}
