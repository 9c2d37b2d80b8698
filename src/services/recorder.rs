//! Session recorder interface
//!
//! Completed and stopped attempts are handed off here. Durability belongs to
//! the implementation; the timer never retries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

/// One finished attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub exercise_id: String,
    pub elapsed_seconds: u64,
    /// Configured duration, for telling a full hold from an early stop
    pub target_seconds: u64,
    pub recorded_at: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(exercise_id: impl Into<String>, elapsed_seconds: u64, target_seconds: u64) -> Self {
        Self {
            exercise_id: exercise_id.into(),
            elapsed_seconds,
            target_seconds,
            recorded_at: Utc::now(),
        }
    }

    pub fn reached_target(&self) -> bool {
        self.elapsed_seconds >= self.target_seconds
    }
}

/// Receives finished attempts, fire-and-forget
pub trait SessionRecorder: Send + Sync {
    fn record(&self, session: SessionRecord);
}

/// Recorder that only logs
#[derive(Debug, Default, Clone, Copy)]
pub struct LogRecorder;

impl SessionRecorder for LogRecorder {
    fn record(&self, session: SessionRecord) {
        info!(
            "Session finished: exercise={} elapsed={}s target={}s",
            session.exercise_id, session.elapsed_seconds, session.target_seconds
        );
    }
}

impl<F> SessionRecorder for F
where
    F: Fn(SessionRecord) + Send + Sync,
{
    fn record(&self, session: SessionRecord) {
        self(session)
    }
}
