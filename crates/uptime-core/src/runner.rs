use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::monitor::engine::{EngineError, ProbeEngine};
use crate::monitor::event::TransitionEvent;
use crate::monitor::state::{ProbeOutcome, StatusSnapshot, Target};
use crate::notify::Notifier;
use crate::report::format_report;
use crate::store::{StatusStore, StoreError};

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// What happened to the report message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// No message, or no notifier configured.
    Skipped,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub events: Vec<TransitionEvent>,
    pub status: StatusSnapshot,
    pub outcomes: Vec<ProbeOutcome>,
    pub message: Option<String>,
    pub delivery: Delivery,
}

/// One load, probe, persist, notify pass.
pub struct Runner<S> {
    engine: ProbeEngine,
    store: S,
    notifier: Option<Arc<dyn Notifier>>,
}

impl<S: StatusStore> Runner<S> {
    pub fn new(engine: ProbeEngine, store: S) -> Self {
        Self {
            engine,
            store,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine_mut(&mut self) -> &mut ProbeEngine {
        &mut self.engine
    }

    /// Full pass: [`Runner::probe_and_save`] followed by [`Runner::deliver`].
    pub async fn run_once(&self, targets: &[Target]) -> Result<RunReport, RunError> {
        let mut report = self.probe_and_save(targets).await?;
        self.deliver(&mut report).await;
        Ok(report)
    }

    /// Load the prior snapshot, probe, and persist the new snapshot.
    ///
    /// The returned report has `Delivery::Skipped` until passed to `deliver`.
    pub async fn probe_and_save(&self, targets: &[Target]) -> Result<RunReport, RunError> {
        let started_at = Utc::now();
        let prior = self.store.load()?;
        info!(targets = targets.len(), known = prior.len(), "Starting probe pass");

        let evaluation = self.engine.evaluate(targets, &prior).await?;
        let message = format_report(&evaluation.events);

        // Persist before delivery so a failed notification never loses state.
        self.store.save(&evaluation.status)?;

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            events: evaluation.events,
            status: evaluation.status,
            outcomes: evaluation.outcomes,
            message,
            delivery: Delivery::Skipped,
        })
    }

    /// Send the report message, if any, through the configured notifier.
    pub async fn deliver(&self, report: &mut RunReport) {
        report.delivery = match (&report.message, &self.notifier) {
            (Some(msg), Some(notifier)) => match notifier.notify(msg).await {
                Ok(()) => Delivery::Sent,
                Err(e) => {
                    warn!(error = %e, "Report delivery failed");
                    Delivery::Failed(e.to_string())
                }
            },
            _ => Delivery::Skipped,
        };
        report.finished_at = Utc::now();
    }
}
