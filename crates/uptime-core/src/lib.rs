#![forbid(unsafe_code)]

pub mod config;
pub mod monitor;
pub mod notify;
pub mod probe;
pub mod report;
pub mod runner;
pub mod store;

pub use config::{FirstSeen, ProbeConfig};
pub use monitor::{
    attempt_channel, detect_transition, is_up_status, validate_targets, AttemptResult,
    EngineError, Evaluation, ProbeAttempt, ProbeEngine, ProbeOutcome, Reachability, RetryState,
    Status, StatusSnapshot, Target, TransitionEvent,
};
pub use notify::{Notifier, NotifyError, PushoverConfig, PushoverNotifier};
pub use probe::{user_agent_header, ClientError, HttpProber, ProbeError, Prober};
pub use report::format_report;
pub use runner::{Delivery, RunError, RunReport, Runner};
pub use store::{JsonFileStore, StatusStore, StoreError};
