//! TOML configuration file schema and parsing.
//!
//! Example config file:
//!
//! ```toml
//! log_format = "pretty"
//! status_file = "last_status.json"
//!
//! [probe]
//! timeout_secs = 60
//! max_attempts = 3
//! first_seen = "report_up"
//!
//! [pushover]
//! token = "app-token"
//! user = "user-key"
//!
//! [[targets]]
//! name = "Homepage"
//! url = "https://example.com/"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use uptime_core::config::{DEFAULT_MAX_ATTEMPTS, DEFAULT_USER_AGENT};
use uptime_core::{FirstSeen, ProbeConfig, PushoverConfig, Target};

pub const TEMPLATE_FILE: &str = "settings.example.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_status_file")]
    pub status_file: PathBuf,

    #[serde(default)]
    pub probe: ProbeSettings,

    #[serde(default)]
    pub pushover: Option<PushoverConfig>,

    pub targets: Vec<TargetDef>,
}

fn default_log_format() -> String {
    "pretty".into()
}

fn default_status_file() -> PathBuf {
    PathBuf::from("last_status.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default)]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default)]
    pub first_seen: FirstSeen,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            max_attempts: default_max_attempts(),
            retry_backoff_ms: 0,
            user_agent: default_user_agent(),
            first_seen: FirstSeen::default(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

impl ProbeSettings {
    pub fn to_probe_config(&self) -> ProbeConfig {
        ProbeConfig::default()
            .with_request_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_attempts(self.max_attempts)
            .with_retry_backoff(Duration::from_millis(self.retry_backoff_ms))
            .with_user_agent(&self.user_agent)
            .with_first_seen(self.first_seen)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetDef {
    pub name: String,
    pub url: String,
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.is_file() {
            return Err(format!(
                "Config file {} not found. Please create it by copying {} and edit it to your preference.",
                path.display(),
                TEMPLATE_FILE
            ));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| format!("Failed to parse config file {}: {}", path.display(), e))?;

        config.validate()?;
        Ok(config)
    }

    pub fn to_targets(&self) -> Vec<Target> {
        self.targets
            .iter()
            .map(|t| Target::new(&t.name, &t.url))
            .collect()
    }

    fn validate(&self) -> Result<(), String> {
        if self.targets.is_empty() {
            return Err("No targets configured".into());
        }

        uptime_core::validate_targets(&self.to_targets()).map_err(|e| e.to_string())?;

        if self.probe.timeout_secs == 0 {
            return Err("probe.timeout_secs must be at least 1".into());
        }
        if self.probe.max_attempts == 0 {
            return Err("probe.max_attempts must be at least 1".into());
        }
        uptime_core::user_agent_header(&self.probe.user_agent).map_err(|e| e.to_string())?;

        if let Some(ref p) = self.pushover {
            if p.token.is_empty() || p.user.is_empty() {
                return Err("pushover.token and pushover.user must not be empty".into());
            }
            url::Url::parse(&p.api_url)
                .map_err(|e| format!("Invalid pushover api_url: {} ({})", p.api_url, e))?;
        }

        match self.log_format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "Invalid log_format '{}': must be 'pretty' or 'json'",
                    other
                ));
            }
        }

        Ok(())
    }
}
