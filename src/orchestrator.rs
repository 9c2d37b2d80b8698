//! Timer orchestrator: wires one countdown session to its side effects

use std::{
    fmt,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use serde::Serialize;
use tokio::sync::watch;
use tracing::info;

use crate::{
    error::TimerError,
    services::{
        AudioCueEmitter, Capability, CoachingPresenter, FeatureCapabilities, LogRecorder,
        SessionRecord, SessionRecorder, StaticCapabilities,
    },
    state::{BreathingPhase, CountdownState},
    tasks::{BreathingGenerator, CountdownEngine, DEFAULT_BREATHING_PERIOD},
};

/// Initial session parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerSettings {
    pub exercise_id: String,
    pub duration_seconds: u64,
    pub breathing_period: Duration,
    pub breathing_enabled: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            exercise_id: "plank".to_string(),
            duration_seconds: 60,
            breathing_period: DEFAULT_BREATHING_PERIOD,
            breathing_enabled: false,
        }
    }
}

/// External collaborators the orchestrator calls into
#[derive(Clone)]
pub struct Collaborators {
    pub audio: AudioCueEmitter,
    pub recorder: Arc<dyn SessionRecorder>,
    pub capabilities: Arc<dyn FeatureCapabilities>,
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            audio: AudioCueEmitter::silent(true),
            recorder: Arc::new(LogRecorder),
            capabilities: Arc::new(StaticCapabilities::default()),
        }
    }
}

/// Everything a timer view renders
#[derive(Debug, Clone, Serialize)]
pub struct TimerSnapshot {
    pub exercise_id: String,
    pub countdown: CountdownState,
    pub breathing: Option<BreathingPhase>,
    /// On-screen cue for the current breathing phase
    pub breathing_prompt: Option<&'static str>,
    pub breathing_enabled: bool,
    pub coaching: Option<String>,
    pub tip: Option<String>,
    pub sound_enabled: bool,
    pub last_session: Option<SessionRecord>,
}

type LastSession = Arc<Mutex<Option<SessionRecord>>>;

/// Composition root for one timer view
///
/// User actions are thin forwarders to the [`CountdownEngine`]. The breathing
/// guide observes the engine's phase directly, so it runs exactly while the
/// countdown does, including across completion and restart.
pub struct TimerOrchestrator {
    exercise_id: String,
    engine: CountdownEngine,
    breathing: BreathingGenerator,
    audio: AudioCueEmitter,
    recorder: Arc<dyn SessionRecorder>,
    coaching: CoachingPresenter,
    tips: CoachingPresenter,
    coaching_message: Option<String>,
    tip_message: Option<String>,
    last_session: LastSession,
}

impl TimerOrchestrator {
    pub fn new(settings: TimerSettings, collaborators: Collaborators) -> Result<Self, TimerError> {
        let breathing =
            BreathingGenerator::new(settings.breathing_period, settings.breathing_enabled)?;
        let last_session = Arc::new(Mutex::new(None));

        let engine = build_engine(
            &settings.exercise_id,
            settings.duration_seconds,
            &breathing,
            &collaborators.audio,
            &collaborators.recorder,
            &last_session,
        )?;

        Ok(Self {
            exercise_id: settings.exercise_id,
            engine,
            breathing,
            audio: collaborators.audio,
            recorder: collaborators.recorder,
            coaching: CoachingPresenter::new(
                Arc::clone(&collaborators.capabilities),
                Capability::AiCoaching,
            ),
            tips: CoachingPresenter::new(collaborators.capabilities, Capability::TimerTips),
            coaching_message: None,
            tip_message: None,
            last_session,
        })
    }

    /// Replace the session with a fresh countdown.
    ///
    /// The old engine is dropped, releasing its tick source. An invalid
    /// duration leaves the current session untouched.
    pub fn select_duration(
        &mut self,
        duration_seconds: u64,
        exercise_id: Option<String>,
    ) -> Result<(), TimerError> {
        let exercise_id = exercise_id.unwrap_or_else(|| self.exercise_id.clone());
        let engine = build_engine(
            &exercise_id,
            duration_seconds,
            &self.breathing,
            &self.audio,
            &self.recorder,
            &self.last_session,
        )?;

        info!("New {} session of {}s", exercise_id, duration_seconds);
        self.engine = engine;
        self.exercise_id = exercise_id;
        // The old engine may have observed `running` after its successor was built
        self.breathing.set_running(self.engine.phase().is_running());
        Ok(())
    }

    pub fn start(&self) -> bool {
        self.engine.start()
    }

    pub fn pause(&self) -> bool {
        self.engine.pause()
    }

    pub fn resume(&self) -> bool {
        self.engine.resume()
    }

    /// Manual stop; reports the partial hold to the recorder.
    ///
    /// From `ready` or `completed` this only resets the countdown and nothing
    /// is recorded.
    pub fn stop(&self) -> bool {
        self.engine.stop()
    }

    pub fn reset(&self) {
        self.engine.reset();
    }

    /// Abandon the current attempt without recording it
    pub fn skip(&self) -> bool {
        let state = self.engine.state();
        let had_progress = state != CountdownState::ready(state.target_duration_seconds);
        self.reset();
        had_progress
    }

    pub fn set_breathing_enabled(&self, enabled: bool) {
        self.breathing.set_enabled(enabled);
    }

    pub fn toggle_sound(&self) -> bool {
        self.audio.toggle_sound()
    }

    pub fn set_coaching_message(&mut self, message: Option<String>) {
        self.coaching_message = message;
    }

    pub fn set_tip_message(&mut self, message: Option<String>) {
        self.tip_message = message;
    }

    pub fn exercise_id(&self) -> &str {
        &self.exercise_id
    }

    pub fn engine(&self) -> &CountdownEngine {
        &self.engine
    }

    pub fn breathing(&self) -> &BreathingGenerator {
        &self.breathing
    }

    /// Countdown updates for the current session; ends when it is replaced
    pub fn subscribe(&self) -> watch::Receiver<CountdownState> {
        self.engine.subscribe()
    }

    pub fn last_session(&self) -> Option<SessionRecord> {
        self.last_session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let countdown = self.engine.state();
        let visible = countdown.is_running();

        let breathing = self.breathing.phase();

        TimerSnapshot {
            exercise_id: self.exercise_id.clone(),
            countdown,
            breathing,
            breathing_prompt: breathing.map(|phase| phase.label()),
            breathing_enabled: self.breathing.is_enabled(),
            coaching: self
                .coaching
                .render(self.coaching_message.as_deref(), visible)
                .map(str::to_string),
            tip: self
                .tips
                .render(self.tip_message.as_deref(), visible)
                .map(str::to_string),
            sound_enabled: self.audio.sound_enabled(),
            last_session: self.last_session(),
        }
    }
}

fn build_engine(
    exercise_id: &str,
    duration_seconds: u64,
    breathing: &BreathingGenerator,
    audio: &AudioCueEmitter,
    recorder: &Arc<dyn SessionRecorder>,
    last_session: &LastSession,
) -> Result<CountdownEngine, TimerError> {
    let exercise_id = exercise_id.to_string();
    let breathing = breathing.clone();
    let recorder = Arc::clone(recorder);
    let last_session = Arc::clone(last_session);
    let audio = audio.clone();

    let engine = CountdownEngine::new(duration_seconds, move |elapsed| {
        let record = SessionRecord::new(exercise_id.as_str(), elapsed, duration_seconds);
        *last_session.lock().unwrap_or_else(PoisonError::into_inner) = Some(record.clone());
        recorder.record(record);
    })?;

    Ok(engine
        .with_phase_observer(move |phase| breathing.set_running(phase.is_running()))
        .with_completion_cue(move || audio.play_completion_sound()))
}

impl fmt::Debug for TimerOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerOrchestrator")
            .field("exercise_id", &self.exercise_id)
            .field("engine", &self.engine)
            .field("breathing", &self.breathing)
            .field("audio", &self.audio)
            .finish_non_exhaustive()
    }
}
