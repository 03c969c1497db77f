mod http;

pub use http::{user_agent_header, HttpProber};

use async_trait::async_trait;
use thiserror::Error;

/// Transport-level failure of a single probe attempt.
///
/// An HTTP response with an unhealthy status code is not an error at this
/// level; the engine classifies status codes itself.
#[derive(Debug, Clone, Error)]
pub enum ProbeError {
    #[error("Network error probing {url}: {reason}")]
    Network { url: String, reason: String },
    #[error("Timeout probing {url}")]
    Timeout { url: String },
}

impl ProbeError {
    pub fn url(&self) -> &str {
        match self {
            Self::Network { url, .. } => url,
            Self::Timeout { url } => url,
        }
    }
}

/// Failure to set up the HTTP client used for probing.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid user agent {value:?}: {reason}")]
    InvalidUserAgent { value: String, reason: String },
    #[error("Failed to build HTTP client: {0}")]
    Build(String),
}

/// Trait for performing one reachability request against a URL.
///
/// Implementations return the HTTP status code of the response. Retries are
/// the caller's concern. Object-safe and Send + Sync.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> Result<u16, ProbeError>;
}
