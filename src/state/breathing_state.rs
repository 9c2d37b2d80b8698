//! Breathing guide phase

use serde::{Deserialize, Serialize};

/// Half of one breathing cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingPhase {
    #[default]
    Inhale,
    Exhale,
}

impl BreathingPhase {
    /// The other half of the cycle
    pub fn toggled(self) -> Self {
        match self {
            BreathingPhase::Inhale => BreathingPhase::Exhale,
            BreathingPhase::Exhale => BreathingPhase::Inhale,
        }
    }

    /// Prompt shown to the user
    pub fn label(&self) -> &'static str {
        match self {
            BreathingPhase::Inhale => "Breathe in",
            BreathingPhase::Exhale => "Breathe out",
        }
    }
}
