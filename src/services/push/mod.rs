//! Push gateway abstraction.
//!
//! One call sends one message to one device address. Every failure mode
//! (rejected token, HTTP error, timeout) surfaces uniformly as
//! [`DeliveryRejected`]. Credentials are checked once per fan-out through
//! [`PushGateway::authorize`], so a gateway we cannot talk to never counts
//! against the addresses themselves.

pub mod auth;
pub mod fcm;

use async_trait::async_trait;

use crate::error::AppResult;
use crate::models::{DeviceAddress, Message};

pub use auth::{AccessTokenSource, ServiceAccountTokenSource, StaticTokenSource, TokenError};
pub use fcm::FcmClient;

/// A single send was not accepted by the gateway
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct DeliveryRejected {
    pub reason: String,
    /// HTTP status returned by the gateway, if a response was received
    pub http_status: Option<u16>,
    /// Whether the address should be dropped from address books
    pub prunable: bool,
}

impl DeliveryRejected {
    pub fn new(reason: impl Into<String>, http_status: Option<u16>) -> Self {
        Self {
            reason: reason.into(),
            http_status,
            prunable: true,
        }
    }

    /// The send never reached the gateway because we could not authenticate
    pub fn unauthorized(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            http_status: None,
            prunable: false,
        }
    }
}

/// Sends push messages to individual device addresses
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Makes sure the gateway can be called at all, before any address is tried
    async fn authorize(&self) -> AppResult<()> {
        Ok(())
    }

    async fn send(&self, address: &DeviceAddress, message: &Message)
        -> Result<(), DeliveryRejected>;
}
