//! PlankIt timer - countdown core for workout holds
//!
//! A countdown state machine with a completion tone, an independent
//! breathing rhythm guide and capability-gated coaching messages, composed
//! per timer view by [`TimerOrchestrator`] and exposed to an embedding UI
//! over a local HTTP control surface.

pub mod api;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::TimerError;
pub use orchestrator::{Collaborators, TimerOrchestrator, TimerSettings, TimerSnapshot};
pub use state::{AppState, BreathingPhase, CountdownState, TimerPhase};
pub use tasks::{BreathingGenerator, CountdownEngine};
pub use utils::signals::shutdown_signal;
