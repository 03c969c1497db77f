use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::config::ProbeConfig;
use crate::monitor::event::{detect_transition, AttemptResult, ProbeAttempt, TransitionEvent};
use crate::monitor::retry::RetryState;
use crate::monitor::state::{ProbeOutcome, Status, StatusSnapshot, Target};
use crate::probe::Prober;

/// Faults in the target list itself. Network failures never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Target at index {index} has an empty name")]
    EmptyName { index: usize },
    #[error("Duplicate target name: {name}")]
    DuplicateName { name: String },
    #[error("Invalid URL for target '{name}': {url} ({reason})")]
    InvalidUrl {
        name: String,
        url: String,
        reason: String,
    },
}

/// Result of one probing pass.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Transition events, in target order.
    pub events: Vec<TransitionEvent>,
    /// Exactly one entry per input target.
    pub status: StatusSnapshot,
    /// Per-target detail, in target order.
    pub outcomes: Vec<ProbeOutcome>,
}

/// Status codes counted as reachable.
pub fn is_up_status(status: u16) -> bool {
    (200..400).contains(&status)
}

pub struct ProbeEngine {
    config: ProbeConfig,
    prober: Arc<dyn Prober>,
    attempt_tx: Option<UnboundedSender<ProbeAttempt>>,
}

impl ProbeEngine {
    pub fn new(config: ProbeConfig, prober: Arc<dyn Prober>) -> Self {
        Self {
            config,
            prober,
            attempt_tx: None,
        }
    }

    pub fn with_attempt_tx(mut self, tx: UnboundedSender<ProbeAttempt>) -> Self {
        self.attempt_tx = Some(tx);
        self
    }

    /// Drop the attempt sender so its receiver sees the end of the stream.
    pub fn close_attempts(&mut self) {
        self.attempt_tx = None;
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe every target in order and compare against `prior`.
    ///
    /// The target list is validated before any request is sent.
    pub async fn evaluate(
        &self,
        targets: &[Target],
        prior: &StatusSnapshot,
    ) -> Result<Evaluation, EngineError> {
        validate_targets(targets)?;

        let mut events = Vec::new();
        let mut status = StatusSnapshot::new();
        let mut outcomes = Vec::with_capacity(targets.len());

        for target in targets {
            let outcome = self.probe_target(target).await;

            if let Some(new_state) = detect_transition(
                prior.get(&target.name).copied(),
                outcome.ok,
                self.config.first_seen,
            ) {
                info!(target_name = %target.name, %new_state, "Status transition");
                events.push(TransitionEvent::new(&target.name, new_state));
            }

            status.insert(target.name.clone(), Status { ok: outcome.ok });
            outcomes.push(outcome);
        }

        info!(
            targets = targets.len(),
            transitions = events.len(),
            "Probe pass complete"
        );

        Ok(Evaluation {
            events,
            status,
            outcomes,
        })
    }

    async fn probe_target(&self, target: &Target) -> ProbeOutcome {
        let mut state = RetryState::start();
        let mut last_failure = None;

        while !state.is_terminal() {
            if state.attempts() > 0 && !self.config.retry_backoff.is_zero() {
                debug!(
                    target_name = %target.name,
                    backoff_ms = self.config.retry_backoff.as_millis(),
                    "Waiting before retry"
                );
                tokio::time::sleep(self.config.retry_backoff).await;
            }

            let attempt = state.attempts() + 1;
            let result = match self.prober.probe(&target.url).await {
                Ok(code) if is_up_status(code) => AttemptResult::Up { status: code },
                Ok(code) => AttemptResult::Down { status: code },
                Err(e) => AttemptResult::Error {
                    reason: e.to_string(),
                },
            };

            if result.is_up() {
                debug!(target_name = %target.name, attempt, %result, "Probe succeeded");
            } else {
                info!(target_name = %target.name, attempt, %result, "Probe failed");
                last_failure = Some(result.to_string());
            }

            state = state.record(result.is_up(), self.config.max_attempts);

            if let Some(tx) = &self.attempt_tx {
                let _ = tx.send(ProbeAttempt {
                    target: target.name.clone(),
                    attempt,
                    result,
                });
            }
        }

        let ok = state.is_up().unwrap_or(false);
        debug!(target_name = %target.name, %state, "Probe finished");

        ProbeOutcome {
            name: target.name.clone(),
            ok,
            attempts: state.attempts(),
            last_failure: if ok { None } else { last_failure },
        }
    }
}

/// Reject empty or duplicate names and URLs that are not http(s).
pub fn validate_targets(targets: &[Target]) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for (index, t) in targets.iter().enumerate() {
        if t.name.is_empty() {
            return Err(EngineError::EmptyName { index });
        }
        if !seen.insert(t.name.as_str()) {
            return Err(EngineError::DuplicateName {
                name: t.name.clone(),
            });
        }
        let parsed = url::Url::parse(&t.url).map_err(|e| EngineError::InvalidUrl {
            name: t.name.clone(),
            url: t.url.clone(),
            reason: e.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(EngineError::InvalidUrl {
                name: t.name.clone(),
                url: t.url.clone(),
                reason: "scheme must be http or https".into(),
            });
        }
    }
    Ok(())
}
