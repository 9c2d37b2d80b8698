//! Hosting application state

use std::{
    sync::{Mutex, MutexGuard},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::info;

use super::CountdownState;
use crate::{
    error::TimerError,
    orchestrator::{Collaborators, TimerOrchestrator, TimerSettings, TimerSnapshot},
};

/// Main application state that hosts the active timer session
pub struct AppState {
    /// The timer view currently mounted
    pub timer: Mutex<TimerOrchestrator>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the state with an initial session built from `settings`
    pub fn new(
        port: u16,
        host: String,
        settings: TimerSettings,
        collaborators: Collaborators,
    ) -> Result<Self, TimerError> {
        Ok(Self {
            timer: Mutex::new(TimerOrchestrator::new(settings, collaborators)?),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        })
    }

    fn lock_timer(&self) -> Result<MutexGuard<'_, TimerOrchestrator>, String> {
        self.timer
            .lock()
            .map_err(|e| format!("Failed to lock timer state: {}", e))
    }

    /// Run an action against the timer and record it as the last action
    pub fn with_timer<T, F>(&self, action: &str, f: F) -> Result<T, String>
    where
        F: FnOnce(&mut TimerOrchestrator) -> T,
    {
        let mut timer = self.lock_timer()?;
        let result = f(&mut *timer);
        drop(timer); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
        info!("Timer action: {}", action);

        Ok(result)
    }

    /// Current view of the timer
    pub fn snapshot(&self) -> Result<TimerSnapshot, String> {
        self.lock_timer().map(|timer| timer.snapshot())
    }

    /// Countdown updates for the current session
    pub fn subscribe(&self) -> Result<watch::Receiver<CountdownState>, String> {
        self.lock_timer().map(|timer| timer.subscribe())
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
