pub mod engine;
pub mod event;
pub mod retry;
pub mod state;

pub use engine::{is_up_status, validate_targets, EngineError, Evaluation, ProbeEngine};
pub use event::{
    attempt_channel, detect_transition, AttemptResult, ProbeAttempt, Reachability,
    TransitionEvent,
};
pub use retry::RetryState;
pub use state::{ProbeOutcome, Status, StatusSnapshot, Target};
