//! Voice-privacy registrants.
//!
//! Every decoded call entry raises one enabled/disabled notification, in wire
//! order, regardless of how the returned call list is later sorted.

use tokio::sync::broadcast;
use tracing::{debug, info};

/// Default number of notifications buffered per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

/// Voice-privacy state reported for one call entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoicePrivacy {
    /// Voice privacy is active for the call.
    Enabled,
    /// Voice privacy is not active for the call.
    Disabled,
}

impl From<bool> for VoicePrivacy {
    fn from(enabled: bool) -> Self {
        if enabled {
            Self::Enabled
        } else {
            Self::Disabled
        }
    }
}

/// Fan-out of voice-privacy notifications to any number of listeners.
#[derive(Debug, Clone)]
pub struct VoicePrivacyRegistrants {
    tx: broadcast::Sender<VoicePrivacy>,
}

impl Default for VoicePrivacyRegistrants {
    fn default() -> Self { Self::new(DEFAULT_CAPACITY) }
}

impl VoicePrivacyRegistrants {
    /// Create registrants buffering `capacity` notifications per listener.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new listener.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<VoicePrivacy> { self.tx.subscribe() }

    /// Notify every listener of the privacy state of one call.
    pub fn notify(&self, state: VoicePrivacy) {
        match state {
            VoicePrivacy::Enabled => info!("in-call voice privacy is enabled"),
            VoicePrivacy::Disabled => info!("in-call voice privacy is disabled"),
        }
        if self.tx.send(state).is_err() {
            debug!("no voice privacy listeners registered");
        }
    }
}
