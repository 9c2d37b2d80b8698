//! Completion tone synthesis and playback

use std::{
    fmt,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Output rate for rendered tones
pub const SAMPLE_RATE: u32 = 44_100;

/// Why a tone could not be played
#[derive(Debug, Error)]
pub enum ToneSinkError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("audio output failed: {0}")]
    Playback(String),
}

/// Shape of a single synthesized tone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToneSpec {
    pub frequency_hz: f32,
    pub duration: Duration,
    /// Linear ramp from silence to `peak_gain`
    pub attack: Duration,
    pub peak_gain: f32,
    /// Gain reached at the end by exponential decay
    pub floor_gain: f32,
    pub sample_rate: u32,
}

impl ToneSpec {
    /// 800 Hz sine lasting one second
    pub fn completion() -> Self {
        Self {
            frequency_hz: 800.0,
            duration: Duration::from_secs(1),
            attack: Duration::from_millis(10),
            peak_gain: 0.3,
            floor_gain: 0.01,
            sample_rate: SAMPLE_RATE,
        }
    }

    pub fn sample_count(&self) -> usize {
        (self.duration.as_secs_f64() * f64::from(self.sample_rate)).round() as usize
    }

    /// Envelope gain at `t` seconds from the start
    pub fn gain_at(&self, t: f32) -> f32 {
        let attack = self.attack.as_secs_f32();
        let total = self.duration.as_secs_f32();

        if t <= 0.0 {
            0.0
        } else if t < attack {
            self.peak_gain * t / attack
        } else if t >= total {
            self.floor_gain
        } else {
            let progress = (t - attack) / (total - attack);
            self.peak_gain * (self.floor_gain / self.peak_gain).powf(progress)
        }
    }

    /// Render mono PCM samples in `[-1.0, 1.0]`
    pub fn render(&self) -> Vec<f32> {
        let rate = self.sample_rate as f32;
        (0..self.sample_count())
            .map(|i| {
                let t = i as f32 / rate;
                let wave = (std::f32::consts::TAU * self.frequency_hz * t).sin();
                wave * self.gain_at(t)
            })
            .collect()
    }
}

impl Default for ToneSpec {
    fn default() -> Self {
        Self::completion()
    }
}

/// Destination for rendered tones
pub trait ToneSink: Send + Sync {
    fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<(), ToneSinkError>;
}

/// Sink used when no audio device is wired in; logs the cue instead
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ToneSink for LogSink {
    fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<(), ToneSinkError> {
        debug!(
            "Completion tone rendered ({} samples at {} Hz)",
            samples.len(),
            sample_rate
        );
        Ok(())
    }
}

/// Plays tones on the default output device
#[cfg(feature = "speaker")]
#[derive(Debug, Default, Clone, Copy)]
pub struct SpeakerSink;

#[cfg(feature = "speaker")]
impl ToneSink for SpeakerSink {
    fn play(&self, samples: Vec<f32>, sample_rate: u32) -> Result<(), ToneSinkError> {
        // The output stream must outlive playback, so it lives on its own thread
        std::thread::spawn(move || {
            use rodio::{buffer::SamplesBuffer, OutputStream, Sink};

            let Ok((_stream, handle)) = OutputStream::try_default() else {
                warn!("{}", ToneSinkError::NoDevice);
                return;
            };
            let sink = match Sink::try_new(&handle) {
                Ok(sink) => sink,
                Err(e) => {
                    warn!("{}", ToneSinkError::Playback(e.to_string()));
                    return;
                }
            };
            sink.append(SamplesBuffer::new(1, sample_rate, samples));
            sink.sleep_until_end();
        });
        Ok(())
    }
}

type PreferenceWriter = Arc<dyn Fn(bool) + Send + Sync>;

/// Plays the completion tone when sound is enabled
///
/// Clones share the same preference and sink.
#[derive(Clone)]
pub struct AudioCueEmitter {
    sound_enabled: Arc<AtomicBool>,
    sink: Arc<dyn ToneSink>,
    tone: ToneSpec,
    preference_writer: Option<PreferenceWriter>,
}

impl AudioCueEmitter {
    pub fn new(sound_enabled: bool, sink: Arc<dyn ToneSink>) -> Self {
        Self {
            sound_enabled: Arc::new(AtomicBool::new(sound_enabled)),
            sink,
            tone: ToneSpec::completion(),
            preference_writer: None,
        }
    }

    /// Emitter backed by [`LogSink`]
    pub fn silent(sound_enabled: bool) -> Self {
        Self::new(sound_enabled, Arc::new(LogSink))
    }

    pub fn with_tone(mut self, tone: ToneSpec) -> Self {
        self.tone = tone;
        self
    }

    /// Callback that persists the preference whenever it changes
    pub fn with_preference_writer<F>(mut self, writer: F) -> Self
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        self.preference_writer = Some(Arc::new(writer));
        self
    }

    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled.load(Ordering::SeqCst)
    }

    pub fn set_sound_enabled(&self, enabled: bool) {
        self.sound_enabled.store(enabled, Ordering::SeqCst);
        if let Some(writer) = &self.preference_writer {
            writer(enabled);
        }
    }

    /// Flip the preference and return the new value
    pub fn toggle_sound(&self) -> bool {
        let enabled = !self.sound_enabled.fetch_xor(true, Ordering::SeqCst);
        info!("Sound {}", if enabled { "enabled" } else { "disabled" });
        if let Some(writer) = &self.preference_writer {
            writer(enabled);
        }
        enabled
    }

    /// Play the tone. Never fails: a muted emitter or a broken sink is a no-op.
    pub fn play_completion_sound(&self) {
        if !self.sound_enabled() {
            debug!("Sound disabled, skipping completion tone");
            return;
        }

        if let Err(e) = self.sink.play(self.tone.render(), self.tone.sample_rate) {
            warn!("Completion tone not played: {}", e);
        }
    }
}

impl fmt::Debug for AudioCueEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioCueEmitter")
            .field("sound_enabled", &self.sound_enabled())
            .field("tone", &self.tone)
            .finish()
    }
}
