//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

use crate::{orchestrator::TimerSettings, services::Capability};

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "plankit-timer")]
#[command(about = "Workout countdown timer with breathing guide, coaching and audio cues")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initial countdown duration in seconds
    #[arg(short, long, default_value = "60")]
    pub duration: u64,

    /// Exercise the initial session is recorded against
    #[arg(short, long, default_value = "plank")]
    pub exercise: String,

    /// Length of each inhale and exhale in milliseconds
    #[arg(long, default_value = "4000")]
    pub breathing_period_ms: u64,

    /// Show breathing guidance from the start
    #[arg(long)]
    pub breathing: bool,

    /// Start with the completion sound turned off
    #[arg(long)]
    pub mute: bool,

    /// Enable AI-assisted coaching messages
    #[arg(long)]
    pub ai_coaching: bool,

    /// Enable timer tips
    #[arg(long)]
    pub timer_tips: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Initial session parameters
    pub fn settings(&self) -> TimerSettings {
        TimerSettings {
            exercise_id: self.exercise.clone(),
            duration_seconds: self.duration,
            breathing_period: Duration::from_millis(self.breathing_period_ms),
            breathing_enabled: self.breathing,
        }
    }

    /// Capabilities switched on from the command line
    pub fn capabilities(&self) -> Vec<Capability> {
        let mut enabled = Vec::new();
        if self.ai_coaching {
            enabled.push(Capability::AiCoaching);
        }
        if self.timer_tips {
            enabled.push(Capability::TimerTips);
        }
        enabled
    }
}
