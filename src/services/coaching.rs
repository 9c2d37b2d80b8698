//! Coaching message presenter

use std::{fmt, sync::Arc};

use super::capabilities::{Capability, FeatureCapabilities};

/// Decides whether an externally supplied message is shown
///
/// Stateless apart from the capability it is gated on.
#[derive(Clone)]
pub struct CoachingPresenter {
    capabilities: Arc<dyn FeatureCapabilities>,
    capability: Capability,
}

impl CoachingPresenter {
    pub fn new(capabilities: Arc<dyn FeatureCapabilities>, capability: Capability) -> Self {
        Self {
            capabilities,
            capability,
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Text to display, if any. A disabled capability hides everything.
    pub fn render<'a>(&self, message: Option<&'a str>, visible: bool) -> Option<&'a str> {
        if !visible || !self.capabilities.is_enabled(self.capability) {
            return None;
        }
        message.filter(|m| !m.trim().is_empty())
    }
}

impl fmt::Debug for CoachingPresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoachingPresenter")
            .field("capability", &self.capability)
            .finish()
    }
}
