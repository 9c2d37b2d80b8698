//! Countdown engine: the workout timer state machine
//!
//! Owns the one-second tick resource. Every transition away from `running`
//! releases it, and dropping the engine releases it unconditionally.

use std::{
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError, Weak},
    time::Duration,
};
use tokio::sync::watch;
use tracing::{debug, info};

use super::ticker::{TickFlow, Ticker};
use crate::{
    error::TimerError,
    state::{CountdownState, TimerPhase},
};

/// Interval between countdown ticks
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

type CompletionHook = Arc<dyn Fn(u64) + Send + Sync>;
type CueHook = Arc<dyn Fn() + Send + Sync>;
type PhaseObserver = Box<dyn Fn(TimerPhase) + Send + Sync>;

/// Callbacks invoked outside the engine lock, so they may read the engine
#[derive(Clone)]
struct Hooks {
    on_complete: CompletionHook,
    completion_cue: Option<CueHook>,
}

struct EngineInner {
    state: CountdownState,
    ticker: Option<Ticker>,
    /// Bumped on every tick acquisition; ticks from older generations are stale
    generation: u64,
    /// Runs under the engine lock, so observers see transitions in order
    observer: Option<PhaseObserver>,
}

struct Shared {
    inner: Mutex<EngineInner>,
    updates: watch::Sender<CountdownState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &EngineInner) {
        if let Some(observer) = &inner.observer {
            observer(inner.state.phase);
        }
        self.updates.send_replace(inner.state);
    }
}

enum TickOutcome {
    Continue,
    Completed(u64),
    Stale,
}

/// Countdown state machine for one timer session
pub struct CountdownEngine {
    shared: Arc<Shared>,
    hooks: Hooks,
    tick_period: Duration,
}

impl CountdownEngine {
    /// Create an engine in the `ready` phase.
    ///
    /// `on_complete` receives the elapsed seconds on natural completion
    /// (the full duration) and on a manual [`stop`](Self::stop).
    pub fn new<F>(target_duration_seconds: u64, on_complete: F) -> Result<Self, TimerError>
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        if target_duration_seconds == 0 {
            return Err(TimerError::InvalidDuration(target_duration_seconds));
        }

        let state = CountdownState::ready(target_duration_seconds);
        let (updates, _) = watch::channel(state);

        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(EngineInner {
                    state,
                    ticker: None,
                    generation: 0,
                    observer: None,
                }),
                updates,
            }),
            hooks: Hooks {
                on_complete: Arc::new(on_complete),
                completion_cue: None,
            },
            tick_period: TICK_PERIOD,
        })
    }

    /// Side effect fired on natural completion, strictly before `on_complete`
    pub fn with_completion_cue<F>(mut self, cue: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks.completion_cue = Some(Arc::new(cue));
        self
    }

    /// Observer told the phase on registration and after every transition and tick.
    ///
    /// It runs with the engine lock held and must not call back into the
    /// engine. Concurrent transitions reach it in the order they happened.
    pub fn with_phase_observer<F>(self, observer: F) -> Self
    where
        F: Fn(TimerPhase) + Send + Sync + 'static,
    {
        {
            let mut inner = self.shared.lock();
            observer(inner.state.phase);
            inner.observer = Some(Box::new(observer));
        }
        self
    }

    pub fn with_tick_period(mut self, tick_period: Duration) -> Self {
        self.tick_period = tick_period;
        self
    }

    /// Current snapshot
    pub fn state(&self) -> CountdownState {
        self.shared.lock().state
    }

    pub fn phase(&self) -> TimerPhase {
        self.state().phase
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state().remaining_seconds
    }

    pub fn target_duration_seconds(&self) -> u64 {
        self.state().target_duration_seconds
    }

    /// Receiver notified on every tick and transition
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.shared.updates.subscribe()
    }

    /// Begin or continue counting down from `ready` or `paused`.
    ///
    /// Returns `false` (and changes nothing) from any other phase, so calling
    /// it while running never creates a second tick source.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime, since it spawns the tick
    /// task.
    pub fn start(&self) -> bool {
        let mut inner = self.shared.lock();
        match inner.state.phase {
            TimerPhase::Ready | TimerPhase::Paused => {}
            TimerPhase::Running | TimerPhase::Completed => {
                debug!("Ignoring start while {}", inner.state.phase);
                return false;
            }
        }

        inner.generation += 1;
        let generation = inner.generation;
        let weak = Arc::downgrade(&self.shared);
        let hooks = self.hooks.clone();

        inner.state.phase = TimerPhase::Running;
        inner.ticker = Some(Ticker::spawn(self.tick_period, move || {
            run_tick(&weak, generation, &hooks)
        }));

        info!(
            "Countdown running with {}s of {}s remaining",
            inner.state.remaining_seconds, inner.state.target_duration_seconds
        );
        self.shared.publish(&inner);
        true
    }

    /// Resume a paused countdown
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime, like [`start`](Self::start).
    pub fn resume(&self) -> bool {
        if self.phase() != TimerPhase::Paused {
            return false;
        }
        self.start()
    }

    /// Freeze the countdown. Only valid while running.
    pub fn pause(&self) -> bool {
        let mut inner = self.shared.lock();
        if inner.state.phase != TimerPhase::Running {
            debug!("Ignoring pause while {}", inner.state.phase);
            return false;
        }

        release_ticker(&mut inner);
        inner.state.phase = TimerPhase::Paused;
        info!("Countdown paused at {}s", inner.state.remaining_seconds);
        self.shared.publish(&inner);
        true
    }

    /// End the attempt early and report the seconds counted so far.
    ///
    /// From `ready` nothing has elapsed and from `completed` the result was
    /// already reported, so both reset without calling `on_complete`.
    pub fn stop(&self) -> bool {
        let (previous, elapsed) = {
            let mut inner = self.shared.lock();
            let previous = inner.state.phase;
            let elapsed = inner.state.elapsed_seconds();
            rewind(&mut inner);
            self.shared.publish(&inner);
            (previous, elapsed)
        };

        match previous {
            TimerPhase::Running | TimerPhase::Paused => {
                info!("Countdown stopped after {}s", elapsed);
                (self.hooks.on_complete)(elapsed);
                true
            }
            TimerPhase::Ready | TimerPhase::Completed => false,
        }
    }

    /// Return to `ready` with the full duration, without reporting
    pub fn reset(&self) {
        let mut inner = self.shared.lock();
        rewind(&mut inner);
        debug!("Countdown reset to {}s", inner.state.target_duration_seconds);
        self.shared.publish(&inner);
    }

    /// Whether a tick source is currently held
    pub fn is_ticking(&self) -> bool {
        self.shared.lock().ticker.as_ref().is_some_and(Ticker::is_active)
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        let mut inner = self.shared.lock();
        // A tick already waiting on the lock must not publish after this
        inner.generation += 1;
        release_ticker(&mut inner);
    }
}

impl fmt::Debug for CountdownEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownEngine")
            .field("state", &self.state())
            .field("tick_period", &self.tick_period)
            .finish()
    }
}

fn release_ticker(inner: &mut EngineInner) {
    if let Some(mut ticker) = inner.ticker.take() {
        ticker.release();
    }
}

fn rewind(inner: &mut EngineInner) {
    release_ticker(inner);
    inner.state = CountdownState::ready(inner.state.target_duration_seconds);
}

fn run_tick(shared: &Weak<Shared>, generation: u64, hooks: &Hooks) -> TickFlow {
    // Engine dropped
    let Some(shared) = shared.upgrade() else {
        return TickFlow::Stop;
    };

    match advance(&shared, generation) {
        TickOutcome::Continue => TickFlow::Continue,
        TickOutcome::Stale => TickFlow::Stop,
        TickOutcome::Completed(target) => {
            if let Some(cue) = &hooks.completion_cue {
                cue();
            }
            (hooks.on_complete)(target);
            TickFlow::Stop
        }
    }
}

fn advance(shared: &Shared, generation: u64) -> TickOutcome {
    let mut inner = shared.lock();
    if inner.generation != generation || inner.state.phase != TimerPhase::Running {
        debug!("Discarding stale countdown tick");
        return TickOutcome::Stale;
    }

    inner.state.remaining_seconds = inner.state.remaining_seconds.saturating_sub(1);
    if inner.state.remaining_seconds == 0 {
        inner.state.phase = TimerPhase::Completed;
        // Called from inside this ticker's own task, which ends after this tick
        if let Some(ticker) = inner.ticker.take() {
            ticker.detach();
        }
        info!("Countdown completed after {}s", inner.state.target_duration_seconds);
        shared.publish(&inner);
        return TickOutcome::Completed(inner.state.target_duration_seconds);
    }

    debug!("Countdown tick: {}s remaining", inner.state.remaining_seconds);
    shared.publish(&inner);
    TickOutcome::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tokio::time::sleep;

    /// Records callback invocations in order
    #[derive(Default)]
    struct Log {
        events: StdMutex<Vec<String>>,
    }

    impl Log {
        fn push(&self, event: String) {
            self.events.lock().unwrap().push(event);
        }

        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    fn engine(duration: u64) -> (CountdownEngine, Arc<Log>) {
        let log = Arc::new(Log::default());
        let completions = Arc::clone(&log);
        let cues = Arc::clone(&log);
        let engine = CountdownEngine::new(duration, move |elapsed| {
            completions.push(format!("complete:{}", elapsed));
        })
        .unwrap()
        .with_completion_cue(move || cues.push("cue".to_string()));
        (engine, log)
    }

    async fn ticks(n: u64) {
        sleep(TICK_PERIOD * n as u32 + Duration::from_millis(500)).await;
    }

    #[test]
    fn test_rejects_zero_duration() {
        let err = CountdownEngine::new(0, |_| {}).unwrap_err();
        assert_eq!(err, TimerError::InvalidDuration(0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_to_completion() {
        let (engine, log) = engine(30);
        assert!(engine.start());

        ticks(29).await;
        assert_eq!(engine.remaining_seconds(), 1);
        assert_eq!(engine.phase(), TimerPhase::Running);
        assert!(log.events().is_empty());

        sleep(TICK_PERIOD).await;
        assert_eq!(engine.remaining_seconds(), 0);
        assert_eq!(engine.phase(), TimerPhase::Completed);
        assert_eq!(log.events(), vec!["cue", "complete:30"]);
        assert!(!engine.is_ticking());

        // Nothing fires after completion
        ticks(5).await;
        assert_eq!(log.events().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_completion_for_several_durations() {
        for duration in [1, 2, 7] {
            let (engine, log) = engine(duration);
            engine.start();
            ticks(duration + 2).await;
            assert_eq!(log.events(), vec!["cue".to_string(), format!("complete:{}", duration)]);
            assert_eq!(engine.state().remaining_seconds, 0);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_callbacks_observe_completed_phase() {
        let seen = Arc::new(StdMutex::new(Vec::new()));
        let engine_slot: Arc<StdMutex<Option<watch::Receiver<CountdownState>>>> =
            Arc::new(StdMutex::new(None));

        let seen_cue = Arc::clone(&seen);
        let slot_cue = Arc::clone(&engine_slot);
        let seen_done = Arc::clone(&seen);
        let slot_done = Arc::clone(&engine_slot);

        let engine = CountdownEngine::new(2, move |_| {
            let rx = slot_done.lock().unwrap();
            seen_done.lock().unwrap().push(rx.as_ref().unwrap().borrow().phase);
        })
        .unwrap()
        .with_completion_cue(move || {
            let rx = slot_cue.lock().unwrap();
            seen_cue.lock().unwrap().push(rx.as_ref().unwrap().borrow().phase);
        });
        *engine_slot.lock().unwrap() = Some(engine.subscribe());

        engine.start();
        ticks(2).await;
        assert_eq!(
            *seen.lock().unwrap(),
            vec![TimerPhase::Completed, TimerPhase::Completed]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_phase_observer_sees_every_transition() {
        let phases = Arc::new(StdMutex::new(Vec::new()));
        let sink = Arc::clone(&phases);
        let engine = CountdownEngine::new(3, |_| {})
            .unwrap()
            .with_phase_observer(move |phase| {
                let mut phases = sink.lock().unwrap();
                if phases.last() != Some(&phase) {
                    phases.push(phase);
                }
            });

        engine.start();
        ticks(1).await;
        engine.pause();
        engine.resume();
        engine.stop();
        engine.start();
        ticks(3).await;
        engine.reset();

        use TimerPhase::*;
        assert_eq!(
            *phases.lock().unwrap(),
            vec![Ready, Running, Paused, Running, Ready, Running, Completed, Ready]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_reports_elapsed_and_resets() {
        let (engine, log) = engine(10);
        engine.start();
        ticks(3).await;

        assert!(engine.stop());
        assert_eq!(log.events(), vec!["complete:3"]);
        assert_eq!(engine.phase(), TimerPhase::Ready);
        assert_eq!(engine.remaining_seconds(), 10);
        assert!(!engine.is_ticking());

        ticks(3).await;
        assert_eq!(engine.remaining_seconds(), 10);
        assert_eq!(log.events().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_while_paused_reports_elapsed() {
        let (engine, log) = engine(20);
        engine.start();
        ticks(4).await;
        engine.pause();

        assert!(engine.stop());
        assert_eq!(log.events(), vec!["complete:4"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_when_ready_or_completed_does_not_report() {
        let (engine, log) = engine(2);
        assert!(!engine.stop());
        assert!(log.events().is_empty());

        engine.start();
        ticks(2).await;
        assert_eq!(engine.phase(), TimerPhase::Completed);
        assert!(!engine.stop());
        assert_eq!(engine.phase(), TimerPhase::Ready);
        assert_eq!(log.events(), vec!["cue", "complete:2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_resume_round_trip() {
        let (engine, _log) = engine(15);
        engine.start();
        ticks(5).await;

        assert!(engine.pause());
        assert!(engine.resume());
        assert_eq!(engine.remaining_seconds(), 10);
        assert_eq!(engine.phase(), TimerPhase::Running);

        ticks(2).await;
        assert_eq!(engine.remaining_seconds(), 8);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_freezes_remaining() {
        let (engine, _log) = engine(15);
        engine.start();
        ticks(5).await;
        engine.pause();

        ticks(10).await;
        assert_eq!(engine.remaining_seconds(), 10);
        assert_eq!(engine.phase(), TimerPhase::Paused);
        assert!(!engine.is_ticking());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_tick_source() {
        let (engine, _log) = engine(60);
        assert!(engine.start());
        assert!(!engine.start());

        ticks(4).await;
        assert_eq!(engine.remaining_seconds(), 56);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_transitions_are_noops() {
        let (engine, log) = engine(5);
        assert!(!engine.pause());
        assert!(!engine.resume());
        assert_eq!(engine.phase(), TimerPhase::Ready);

        engine.start();
        assert!(!engine.resume());
        ticks(5).await;
        assert!(!engine.start());
        assert!(!engine.pause());
        assert_eq!(engine.phase(), TimerPhase::Completed);
        assert_eq!(log.events(), vec!["cue", "complete:5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_does_not_report() {
        let (engine, log) = engine(8);
        engine.start();
        ticks(3).await;
        engine.reset();

        assert_eq!(engine.state(), CountdownState::ready(8));
        ticks(3).await;
        assert_eq!(engine.remaining_seconds(), 8);
        assert!(log.events().is_empty());

        // Completed can be reset and run again
        engine.start();
        ticks(8).await;
        engine.reset();
        assert_eq!(engine.phase(), TimerPhase::Ready);
        assert_eq!(log.events(), vec!["cue", "complete:8"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_releases_tick_source() {
        let (engine, log) = engine(3);
        let rx = engine.subscribe();
        engine.start();
        drop(engine);

        ticks(5).await;
        assert!(log.events().is_empty());
        assert_eq!(rx.borrow().remaining_seconds, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_each_tick() {
        let (engine, _log) = engine(3);
        let mut rx = engine.subscribe();
        engine.start();

        let mut seen = Vec::new();
        while seen.len() < 4 {
            rx.changed().await.unwrap();
            seen.push(*rx.borrow_and_update());
        }

        let remaining: Vec<u64> = seen.iter().map(|s| s.remaining_seconds).collect();
        assert_eq!(remaining, vec![3, 2, 1, 0]);
        assert_eq!(seen[3].phase, TimerPhase::Completed);
    }
}
