//! State management module
//! 
//! This module contains the timer state types and the hosting application state.

pub mod app_state;
pub mod breathing_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use breathing_state::BreathingPhase;
pub use timer_state::{CountdownState, TimerPhase};
