use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
/// Default number of probe attempts per target, first attempt included.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default `User-Agent` sent with every probe.
pub const DEFAULT_USER_AGENT: &str = "check_http";

/// How a target with no prior record is compared against its current state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirstSeen {
    /// A missing record only differs from a target that is currently up.
    #[default]
    ReportUp,
    /// A missing record differs from both states.
    ReportAll,
    /// A missing record never produces an event.
    Suppress,
}

impl std::fmt::Display for FirstSeen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReportUp => write!(f, "report_up"),
            Self::ReportAll => write!(f, "report_all"),
            Self::Suppress => write!(f, "suppress"),
        }
    }
}

/// Configuration for one probing pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// HTTP request timeout for a single probe attempt (default: 60s).
    pub request_timeout: Duration,
    /// Maximum number of attempts per target, first attempt included (default: 3).
    pub max_attempts: u32,
    /// Pause between failed attempts (default: none).
    pub retry_backoff: Duration,
    /// Value of the identifying `User-Agent` header.
    pub user_agent: String,
    pub first_seen: FirstSeen,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_backoff: Duration::ZERO,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            first_seen: FirstSeen::default(),
        }
    }
}

impl ProbeConfig {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_first_seen(mut self, policy: FirstSeen) -> Self {
        self.first_seen = policy;
        self
    }
}
