//! Collaborators of the timer core
//!
//! Audio cues, coaching presentation, feature capability checks and the
//! session recorder interface.

pub mod audio;
pub mod capabilities;
pub mod coaching;
pub mod recorder;

// Re-export main types
pub use audio::{AudioCueEmitter, LogSink, ToneSink, ToneSinkError, ToneSpec};
pub use capabilities::{Capability, FeatureCapabilities, StaticCapabilities};
pub use coaching::CoachingPresenter;
pub use recorder::{LogRecorder, SessionRecord, SessionRecorder};

#[cfg(feature = "speaker")]
pub use audio::SpeakerSink;
