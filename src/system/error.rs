//! Error taxonomy shared by the calculator and the brewing machines.
//!
//! Every variant is a contract violation by the caller, so nothing here is
//! retried or recovered internally.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrewError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("pour list cannot be empty")]
    EmptyInput,

    #[error("invalid state transition: {0}")]
    InvalidStateTransition(#[from] TransitionError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Which state-machine rule was broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("timer is already running")]
    AlreadyRunning,
    #[error("timer is not running")]
    NotRunning,
    #[error("timer is not paused")]
    NotPaused,
    #[error("pour sequence is already started")]
    AlreadyStarted,
    #[error("pour sequence is already completed")]
    AlreadyCompleted,
    #[error("no brewing session is active")]
    NoActiveSession,
}

impl From<serde_json::Error> for BrewError {
    fn from(err: serde_json::Error) -> Self {
        BrewError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_error_wraps_into_brew_error() {
        let err: BrewError = TransitionError::NotPaused.into();
        assert_eq!(err, BrewError::InvalidStateTransition(TransitionError::NotPaused));
        assert_eq!(err.to_string(), "invalid state transition: timer is not paused");
    }
}
