use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::state::Status;
use crate::config::FirstSeen;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Reachability {
    Up,
    Down,
}

impl Reachability {
    pub fn from_ok(ok: bool) -> Self {
        if ok {
            Self::Up
        } else {
            Self::Down
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "UP"),
            Self::Down => write!(f, "DOWN"),
        }
    }
}

/// A change in a target's up/down classification since the previous pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub name: String,
    pub new_state: Reachability,
    pub timestamp: DateTime<Utc>,
}

impl TransitionEvent {
    pub fn new(name: impl Into<String>, new_state: Reachability) -> Self {
        Self {
            name: name.into(),
            new_state,
            timestamp: Utc::now(),
        }
    }
}

/// Compare the current result with the prior record of the same target.
///
/// Returns the state to report, or `None` when nothing changed. How a
/// missing record compares is decided by `policy`.
pub fn detect_transition(
    prior: Option<Status>,
    ok: bool,
    policy: FirstSeen,
) -> Option<Reachability> {
    let changed = match prior {
        Some(status) => status.ok != ok,
        None => match policy {
            FirstSeen::ReportUp => ok,
            FirstSeen::ReportAll => true,
            FirstSeen::Suppress => false,
        },
    };
    changed.then(|| Reachability::from_ok(ok))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "result")]
pub enum AttemptResult {
    Up { status: u16 },
    Down { status: u16 },
    Error { reason: String },
}

impl AttemptResult {
    pub fn is_up(&self) -> bool {
        matches!(self, Self::Up { .. })
    }
}

impl fmt::Display for AttemptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up { status } => write!(f, "HTTP {status}"),
            Self::Down { status } => write!(f, "HTTP {status}"),
            Self::Error { reason } => write!(f, "{reason}"),
        }
    }
}

/// One observed probe attempt, streamed while the engine runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeAttempt {
    pub target: String,
    pub attempt: u32,
    #[serde(flatten)]
    pub result: AttemptResult,
}

pub fn attempt_channel() -> (
    mpsc::UnboundedSender<ProbeAttempt>,
    mpsc::UnboundedReceiver<ProbeAttempt>,
) {
    mpsc::unbounded_channel()
}
