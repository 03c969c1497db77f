/// Progress of the bounded retry loop for one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    Pending { attempts: u32 },
    Succeeded { attempts: u32 },
    ExhaustedRetries { attempts: u32 },
}

impl RetryState {
    pub fn start() -> Self {
        Self::Pending { attempts: 0 }
    }

    /// Record the result of one attempt. Terminal states are returned unchanged.
    pub fn record(self, success: bool, max_attempts: u32) -> Self {
        match self {
            Self::Pending { attempts } => {
                let attempts = attempts + 1;
                if success {
                    Self::Succeeded { attempts }
                } else if attempts >= max_attempts.max(1) {
                    Self::ExhaustedRetries { attempts }
                } else {
                    Self::Pending { attempts }
                }
            }
            terminal => terminal,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending { .. })
    }

    pub fn attempts(self) -> u32 {
        match self {
            Self::Pending { attempts }
            | Self::Succeeded { attempts }
            | Self::ExhaustedRetries { attempts } => attempts,
        }
    }

    /// Final reachability, once terminal.
    pub fn is_up(self) -> Option<bool> {
        match self {
            Self::Pending { .. } => None,
            Self::Succeeded { .. } => Some(true),
            Self::ExhaustedRetries { .. } => Some(false),
        }
    }
}

impl std::fmt::Display for RetryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending { attempts } => write!(f, "pending after {attempts} attempt(s)"),
            Self::Succeeded { attempts } => write!(f, "succeeded on attempt {attempts}"),
            Self::ExhaustedRetries { attempts } => {
                write!(f, "failed after {attempts} attempt(s)")
            }
        }
    }
}
