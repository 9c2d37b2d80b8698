//! Breathing rhythm generator
//!
//! Toggles inhale/exhale on a fixed period while guidance is enabled and the
//! countdown is running. It never reads the countdown itself; the caller
//! feeds it the `running` flag.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tracing::debug;

use super::ticker::{TickFlow, Ticker};
use crate::{error::TimerError, state::BreathingPhase};

/// Length of one inhale or one exhale
pub const DEFAULT_BREATHING_PERIOD: Duration = Duration::from_millis(4000);

#[derive(Debug)]
struct BreathingInner {
    enabled: bool,
    running: bool,
    phase: BreathingPhase,
    toggles: u64,
    ticker: Option<Ticker>,
    generation: u64,
}

impl BreathingInner {
    fn active(&self) -> bool {
        self.enabled && self.running
    }
}

/// Cheaply cloneable handle; the periodic task is released when the last
/// handle is dropped or either input goes false.
#[derive(Debug, Clone)]
pub struct BreathingGenerator {
    inner: Arc<Mutex<BreathingInner>>,
    period: Duration,
}

impl BreathingGenerator {
    pub fn new(period: Duration, enabled: bool) -> Result<Self, TimerError> {
        if period.is_zero() {
            return Err(TimerError::InvalidPeriod);
        }

        Ok(Self {
            inner: Arc::new(Mutex::new(BreathingInner {
                enabled,
                running: false,
                phase: BreathingPhase::Inhale,
                toggles: 0,
                ticker: None,
                generation: 0,
            })),
            period,
        })
    }

    fn lock(&self) -> MutexGuard<'_, BreathingInner> {
        lock(&self.inner)
    }

    /// Turn the guide on or off; the phase is kept while off.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime when this activates the
    /// guide, since the toggle task is spawned then.
    pub fn set_enabled(&self, enabled: bool) {
        let mut inner = self.lock();
        inner.enabled = enabled;
        self.reconcile(&mut inner);
    }

    /// Mirror of the countdown's `phase == running`
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime when this activates the
    /// guide, like [`set_enabled`](Self::set_enabled).
    pub fn set_running(&self, running: bool) {
        let mut inner = self.lock();
        inner.running = running;
        self.reconcile(&mut inner);
    }

    pub fn is_enabled(&self) -> bool {
        self.lock().enabled
    }

    /// Phase to display, or `None` while inactive
    pub fn phase(&self) -> Option<BreathingPhase> {
        let inner = self.lock();
        inner.active().then_some(inner.phase)
    }

    /// Last phase, kept across inactive stretches
    pub fn last_phase(&self) -> BreathingPhase {
        self.lock().phase
    }

    /// Number of toggles since creation
    pub fn toggles(&self) -> u64 {
        self.lock().toggles
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    fn reconcile(&self, inner: &mut BreathingInner) {
        match (inner.active(), inner.ticker.is_some()) {
            (true, false) => {
                inner.generation += 1;
                let generation = inner.generation;
                let weak = Arc::downgrade(&self.inner);
                inner.ticker = Some(Ticker::spawn(self.period, move || {
                    toggle(&weak, generation)
                }));
                debug!("Breathing guide started at {:?}", inner.phase);
            }
            (false, true) => {
                if let Some(mut ticker) = inner.ticker.take() {
                    ticker.release();
                }
                debug!("Breathing guide halted at {:?}", inner.phase);
            }
            _ => {}
        }
    }
}

fn lock(inner: &Mutex<BreathingInner>) -> MutexGuard<'_, BreathingInner> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

fn toggle(inner: &Weak<Mutex<BreathingInner>>, generation: u64) -> TickFlow {
    let Some(inner) = inner.upgrade() else {
        return TickFlow::Stop;
    };
    let mut inner = lock(&inner);
    if inner.generation != generation || !inner.active() {
        return TickFlow::Stop;
    }

    inner.phase = inner.phase.toggled();
    inner.toggles += 1;
    debug!("Breathing toggled to {:?}", inner.phase);
    TickFlow::Continue
}

impl Drop for BreathingInner {
    fn drop(&mut self) {
        if let Some(mut ticker) = self.ticker.take() {
            ticker.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::sleep;

    fn guide() -> BreathingGenerator {
        BreathingGenerator::new(DEFAULT_BREATHING_PERIOD, true).unwrap()
    }

    async fn periods(n: u32) {
        sleep(DEFAULT_BREATHING_PERIOD * n + Duration::from_millis(500)).await;
    }

    #[test]
    fn test_rejects_zero_period() {
        let err = BreathingGenerator::new(Duration::ZERO, true).unwrap_err();
        assert_eq!(err, TimerError::InvalidPeriod);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggles_once_per_period() {
        let guide = guide();
        guide.set_running(true);
        assert_eq!(guide.phase(), Some(BreathingPhase::Inhale));

        periods(1).await;
        assert_eq!(guide.phase(), Some(BreathingPhase::Exhale));

        sleep(DEFAULT_BREATHING_PERIOD * 4).await;
        assert_eq!(guide.toggles(), 5);
        assert_eq!(guide.phase(), Some(BreathingPhase::Exhale));
    }

    #[tokio::test(start_paused = true)]
    async fn test_halt_preserves_phase() {
        let guide = guide();
        guide.set_running(true);
        periods(3).await;
        assert_eq!(guide.toggles(), 3);

        guide.set_running(false);
        assert_eq!(guide.phase(), None);
        assert_eq!(guide.last_phase(), BreathingPhase::Exhale);

        periods(5).await;
        assert_eq!(guide.toggles(), 3);
        assert_eq!(guide.last_phase(), BreathingPhase::Exhale);

        guide.set_running(true);
        assert_eq!(guide.phase(), Some(BreathingPhase::Exhale));
        periods(1).await;
        assert_eq!(guide.toggles(), 4);
        assert_eq!(guide.phase(), Some(BreathingPhase::Inhale));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_guide_stays_silent() {
        let guide = BreathingGenerator::new(DEFAULT_BREATHING_PERIOD, false).unwrap();
        guide.set_running(true);
        periods(3).await;
        assert_eq!(guide.phase(), None);
        assert_eq!(guide.toggles(), 0);

        guide.set_enabled(true);
        periods(1).await;
        assert_eq!(guide.toggles(), 1);

        guide.set_enabled(false);
        periods(2).await;
        assert_eq!(guide.toggles(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_inputs_keep_single_task() {
        let guide = guide();
        guide.set_running(true);
        guide.set_running(true);
        guide.set_enabled(true);

        periods(2).await;
        assert_eq!(guide.toggles(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_task() {
        let guide = guide();
        guide.set_running(true);
        let weak = Arc::downgrade(&guide.inner);
        drop(guide);

        periods(2).await;
        assert!(weak.upgrade().is_none());
    }
}
