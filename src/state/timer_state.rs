//! Countdown phase and state snapshot

use serde::{Deserialize, Serialize};

/// Discrete state of the countdown state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Ready,
    Running,
    Paused,
    Completed,
}

impl TimerPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimerPhase::Ready => "ready",
            TimerPhase::Running => "running",
            TimerPhase::Paused => "paused",
            TimerPhase::Completed => "completed",
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TimerPhase::Running)
    }
}

impl std::fmt::Display for TimerPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one countdown instance
///
/// `remaining_seconds` is zero exactly when `phase` is `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownState {
    pub target_duration_seconds: u64,
    pub remaining_seconds: u64,
    pub phase: TimerPhase,
}

impl CountdownState {
    /// Fresh state for a countdown of `target_duration_seconds`
    pub fn ready(target_duration_seconds: u64) -> Self {
        Self {
            target_duration_seconds,
            remaining_seconds: target_duration_seconds,
            phase: TimerPhase::Ready,
        }
    }

    /// Seconds counted down so far
    pub fn elapsed_seconds(&self) -> u64 {
        self.target_duration_seconds - self.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.phase.is_running()
    }
}
