//! Device addresses and per-dispatch delivery bookkeeping.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Push token issued by the messaging gateway to one installed app instance.
///
/// Tokens are opaque and may be invalidated by the gateway at any time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceAddress(String);

impl DeviceAddress {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty or whitespace-only tokens can never be delivered to
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Short prefix for log lines; full tokens are never logged
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(8).collect();
        format!("{}...", prefix)
    }
}

impl From<String> for DeviceAddress {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for DeviceAddress {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

impl std::fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Drops blank tokens and repeated tokens, keeping first-seen order
pub fn usable_addresses<I>(addresses: I) -> Vec<DeviceAddress>
where
    I: IntoIterator<Item = DeviceAddress>,
{
    let mut seen = BTreeSet::new();
    addresses
        .into_iter()
        .filter(|a| !a.is_blank())
        .filter(|a| seen.insert(a.clone()))
        .collect()
}

/// Result of one dispatch call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub attempted: BTreeSet<DeviceAddress>,
    pub succeeded: BTreeSet<DeviceAddress>,
    pub failed: BTreeSet<DeviceAddress>,
}

impl DispatchOutcome {
    pub fn record_success(&mut self, address: DeviceAddress) {
        self.attempted.insert(address.clone());
        self.succeeded.insert(address);
    }

    pub fn record_failure(&mut self, address: DeviceAddress) {
        self.attempted.insert(address.clone());
        self.failed.insert(address);
    }

    /// At least one device accepted the message
    pub fn is_delivered(&self) -> bool {
        !self.succeeded.is_empty()
    }

    /// Every attempted device accepted the message
    pub fn is_complete(&self) -> bool {
        self.is_delivered() && self.failed.is_empty()
    }
}
