//! Push notification delivery.
//!
//! When a pass detects transitions, the formatted report is POSTed to the
//! Pushover messages API. Delivery is best effort: the caller logs failures
//! and carries on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

pub const PUSHOVER_API_URL: &str = "https://api.pushover.net/1/messages.json";
pub const NOTIFICATION_TITLE: &str = "Web monitor update";
/// Pushover "high" priority.
pub const NOTIFICATION_PRIORITY: i8 = 1;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP {status} from {url}")]
    Http { url: String, status: u16 },
    #[error("Request to {url} failed: {reason}")]
    Network { url: String, reason: String },
}

/// Delivers a report message somewhere a human will see it.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Pushover credentials and endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushoverConfig {
    /// Application API token.
    pub token: String,
    /// User or group key.
    pub user: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_notify_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_api_url() -> String {
    PUSHOVER_API_URL.to_string()
}

fn default_notify_timeout_ms() -> u64 {
    10_000
}

impl PushoverConfig {
    pub fn new(token: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user: user.into(),
            api_url: default_api_url(),
            timeout_ms: default_notify_timeout_ms(),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

/// Form body of a Pushover message.
#[derive(Debug, Serialize)]
pub struct PushoverMessage<'a> {
    pub token: &'a str,
    pub user: &'a str,
    pub message: &'a str,
    pub title: &'a str,
    pub priority: i8,
}

pub struct PushoverNotifier {
    config: PushoverConfig,
    client: Client,
}

impl PushoverNotifier {
    pub fn new(config: PushoverConfig, client: Client) -> Self {
        Self { config, client }
    }

    pub fn message<'a>(&'a self, body: &'a str) -> PushoverMessage<'a> {
        PushoverMessage {
            token: &self.config.token,
            user: &self.config.user,
            message: body,
            title: NOTIFICATION_TITLE,
            priority: NOTIFICATION_PRIORITY,
        }
    }
}

#[async_trait]
impl Notifier for PushoverNotifier {
    async fn notify(&self, message: &str) -> Result<(), NotifyError> {
        let url = &self.config.api_url;
        info!(%message, "Sending report");

        let resp = self
            .client
            .post(url)
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .form(&self.message(message))
            .send()
            .await
            .map_err(|e| NotifyError::Network {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Http {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        debug!(%url, "Report delivered");
        Ok(())
    }
}
