//! Feature capability checks consulted before showing optional overlays

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Optional timer-view features behind a capability flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// AI-assisted coaching messages during a hold
    AiCoaching,
    /// Short technique tips shown while the timer runs
    TimerTips,
}

/// Answers "is this optional feature enabled" for the current user
pub trait FeatureCapabilities: Send + Sync {
    fn is_enabled(&self, capability: Capability) -> bool;
}

/// Fixed set of enabled capabilities, typically taken from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticCapabilities {
    enabled: HashSet<Capability>,
}

impl StaticCapabilities {
    pub fn new(enabled: impl IntoIterator<Item = Capability>) -> Self {
        Self {
            enabled: enabled.into_iter().collect(),
        }
    }
}

impl FeatureCapabilities for StaticCapabilities {
    fn is_enabled(&self, capability: Capability) -> bool {
        self.enabled.contains(&capability)
    }
}

impl<F> FeatureCapabilities for F
where
    F: Fn(Capability) -> bool + Send + Sync,
{
    fn is_enabled(&self, capability: Capability) -> bool {
        self(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_capabilities() {
        let caps = StaticCapabilities::new([Capability::TimerTips]);
        assert!(caps.is_enabled(Capability::TimerTips));
        assert!(!caps.is_enabled(Capability::AiCoaching));
        assert!(!StaticCapabilities::default().is_enabled(Capability::TimerTips));
    }

    #[test]
    fn test_closure_capabilities() {
        let caps = |c: Capability| c == Capability::AiCoaching;
        assert!(caps.is_enabled(Capability::AiCoaching));
        assert!(!caps.is_enabled(Capability::TimerTips));
    }
}
