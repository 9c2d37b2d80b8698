//! Owned periodic resource backing the countdown and breathing tasks

use std::time::Duration;
use tokio::{
    task::JoinHandle,
    time::{self, Instant, MissedTickBehavior},
};

/// Handle to a spawned periodic task
///
/// Acquired with [`Ticker::spawn`] and released with [`Ticker::release`], or
/// by dropping it. Releasing twice is a no-op.
#[derive(Debug)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

/// Whether a periodic callback wants further ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickFlow {
    Continue,
    Stop,
}

impl Ticker {
    /// Spawn a task that calls `on_tick` once per `period`, first after one
    /// full period has elapsed. Late ticks are delayed, never bunched.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> TickFlow + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if on_tick() == TickFlow::Stop {
                    break;
                }
            }
        });

        Self {
            handle: Some(handle),
        }
    }

    /// Cancel the task. Idempotent.
    pub fn release(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Give up ownership without cancelling, for a task that is finishing
    /// on its own (e.g. from inside its final tick).
    pub fn detach(mut self) {
        self.handle.take();
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.release();
    }
}
