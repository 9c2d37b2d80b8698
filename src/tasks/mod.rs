//! Periodic tasks module
//!
//! The countdown engine and the breathing generator each own one periodic
//! tick source, scheduled independently of each other.

pub mod breathing;
pub mod countdown;
pub mod ticker;

// Re-export main types
pub use breathing::{BreathingGenerator, DEFAULT_BREATHING_PERIOD};
pub use countdown::{CountdownEngine, TICK_PERIOD};
pub use ticker::{TickFlow, Ticker};
