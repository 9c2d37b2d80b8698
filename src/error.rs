//! Error types for the timer core

use thiserror::Error;

/// Configuration errors rejected when a timer component is constructed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Countdown durations must be at least one second
    #[error("timer duration must be a positive number of seconds, got {0}")]
    InvalidDuration(u64),

    /// Periodic resources need a non-zero period
    #[error("breathing period must be greater than zero")]
    InvalidPeriod,
}
