use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One monitored endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Result of the most recent probe of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub ok: bool,
}

impl Status {
    pub fn up() -> Self {
        Self { ok: true }
    }

    pub fn down() -> Self {
        Self { ok: false }
    }
}

/// Target name to last-known status.
pub type StatusSnapshot = BTreeMap<String, Status>;

/// How the final state of one target was reached during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeOutcome {
    pub name: String,
    pub ok: bool,
    pub attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure: Option<String>,
}
