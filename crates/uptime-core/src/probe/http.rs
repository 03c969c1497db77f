use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use tracing::debug;

use super::{ClientError, ProbeError, Prober};
use crate::config::ProbeConfig;

/// reqwest-backed prober. One GET per call, redirects followed.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, ClientError> {
        Ok(Self {
            client: Self::build_client(timeout, user_agent)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    pub fn from_config(config: &ProbeConfig) -> Result<Self, ClientError> {
        Self::new(config.request_timeout, &config.user_agent)
    }

    pub fn build_client(timeout: Duration, user_agent: &str) -> Result<Client, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, user_agent_header(user_agent)?);

        Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))
    }
}

/// Checks that `user_agent` is a usable, non-empty header value.
pub fn user_agent_header(user_agent: &str) -> Result<HeaderValue, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidUserAgent {
        value: user_agent.to_string(),
        reason: reason.to_string(),
    };
    if user_agent.trim().is_empty() {
        return Err(invalid("must not be empty"));
    }
    HeaderValue::from_str(user_agent).map_err(|e| invalid(&e.to_string()))
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> Result<u16, ProbeError> {
        match self.client.get(url).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(url, status, "Probe response");
                Ok(status)
            }
            Err(e) if e.is_timeout() => Err(ProbeError::Timeout {
                url: url.to_string(),
            }),
            Err(e) => Err(ProbeError::Network {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}
