//! Firebase Cloud Messaging HTTP v1 client.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{AccessTokenSource, DeliveryRejected, PushGateway};
use crate::config::FcmConfig;
use crate::error::{AppError, AppResult};
use crate::models::{DeviceAddress, Message};

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    message: FcmMessage<'a>,
}

#[derive(Debug, Serialize)]
struct FcmMessage<'a> {
    token: &'a str,
    notification: FcmNotification<'a>,
    data: &'a BTreeMap<String, String>,
    android: AndroidConfig,
}

#[derive(Debug, Serialize)]
struct FcmNotification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct AndroidConfig {
    priority: &'static str,
}

/// Push gateway backed by FCM's `messages:send` endpoint
pub struct FcmClient {
    client: reqwest::Client,
    send_url: String,
    tokens: Arc<dyn AccessTokenSource>,
}

impl FcmClient {
    pub fn new(config: &FcmConfig, tokens: Arc<dyn AccessTokenSource>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            send_url: Self::send_url(&config.endpoint, &config.project_id),
            tokens,
        })
    }

    pub fn send_url(endpoint: &str, project_id: &str) -> String {
        format!(
            "{}/v1/projects/{}/messages:send",
            endpoint.trim_end_matches('/'),
            project_id
        )
    }

    fn build_request<'a>(address: &'a DeviceAddress, message: &'a Message) -> SendRequest<'a> {
        SendRequest {
            message: FcmMessage {
                token: address.as_str(),
                notification: FcmNotification {
                    title: &message.title,
                    body: &message.body,
                },
                data: &message.data,
                android: AndroidConfig { priority: "high" },
            },
        }
    }
}

#[async_trait]
impl PushGateway for FcmClient {
    async fn authorize(&self) -> AppResult<()> {
        self.tokens.access_token().await.map(|_| ()).map_err(|e| {
            AppError::PushUnavailable(format!("failed to obtain FCM access token: {}", e))
        })
    }

    async fn send(
        &self,
        address: &DeviceAddress,
        message: &Message,
    ) -> Result<(), DeliveryRejected> {
        let access_token = self.tokens.access_token().await.map_err(|e| {
            DeliveryRejected::unauthorized(format!("Failed to obtain access token: {}", e))
        })?;

        let request = self
            .client
            .post(&self.send_url)
            .bearer_auth(access_token)
            .json(&Self::build_request(address, message));

        match request.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if response.status().is_success() {
                    Ok(())
                } else {
                    let error_body = response.text().await.unwrap_or_default();
                    let reason = if error_body.is_empty() {
                        format!("FCM error: HTTP {}", status)
                    } else {
                        format!("FCM error: HTTP {}: {}", status, error_body)
                    };
                    Err(DeliveryRejected::new(reason, Some(status)))
                }
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "Request to FCM timed out".to_string()
                } else if e.is_connect() {
                    "Connection to FCM failed".to_string()
                } else {
                    format!("FCM request failed: {}", e)
                };
                Err(DeliveryRejected::new(reason, None))
            }
        }
    }
}
