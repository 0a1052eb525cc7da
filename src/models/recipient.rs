//! Logical notification targets.
//!
//! A [`Recipient`] names who a notification is for, independent of how many
//! devices end up receiving it.

use serde::{Deserialize, Serialize};

/// Role of a user in the clinic directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum Role {
    Staff,
    Doctor,
    Patient,
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "Staff",
            Role::Doctor => "Doctor",
            Role::Patient => "Patient",
            Role::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier half of a recipient: either the whole staff group or one user
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecipientId {
    AllStaff,
    User(String),
}

impl RecipientId {
    /// Sentinel stored in history records for staff-wide broadcasts
    pub const ALL_STAFF: &'static str = "all_staff";
}

impl std::fmt::Display for RecipientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientId::AllStaff => f.write_str(Self::ALL_STAFF),
            RecipientId::User(id) => f.write_str(id),
        }
    }
}

/// Who a notification logically targets
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Recipient {
    pub role: Role,
    pub id: RecipientId,
}

impl Recipient {
    /// Every user whose role is [`Role::Staff`]
    pub fn all_staff() -> Self {
        Self {
            role: Role::Staff,
            id: RecipientId::AllStaff,
        }
    }

    /// A single user acting in `role`
    pub fn user(role: Role, user_id: impl Into<String>) -> Self {
        Self {
            role,
            id: RecipientId::User(user_id.into()),
        }
    }
}

impl std::fmt::Display for Recipient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.role, self.id)
    }
}
