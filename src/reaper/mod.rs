//! Wake-lock-timeout handling.
//!
//! When the wake lock expires the session runs an ordered list of
//! [`TimeoutStage`]s. The base stage reports what is still outstanding; vendor
//! stages added by the active quirk profile follow it. Stages only take
//! requests out of the registry through
//! [`RequestRegistry::find_and_remove`], so a request answered on the response
//! path is never completed again here.

pub mod wake_lock;

use std::fmt;

use tracing::{debug, error, warn};

pub use wake_lock::{DEFAULT_WAKE_LOCK_TIMEOUT, WakeLock};

use crate::{outcome::CommandError, quirks::QuirkProfile, registry::RequestRegistry};

/// One step of wake-lock-timeout processing.
pub trait TimeoutStage: Send + fmt::Debug {
    /// Stage name for logs.
    fn name(&self) -> &'static str;

    /// React to a wake-lock timeout. Returns the number of requests the stage
    /// removed from `registry`.
    fn on_wake_lock_timeout(&self, registry: &mut RequestRegistry) -> usize;
}

/// Base stage: log every request still waiting for a response.
#[derive(Debug, Default, Clone, Copy)]
pub struct PendingRequestLog;

impl TimeoutStage for PendingRequestLog {
    fn name(&self) -> &'static str { "pending-request-log" }

    fn on_wake_lock_timeout(&self, registry: &mut RequestRegistry) -> usize {
        if registry.is_empty() {
            return 0;
        }
        warn!(pending = registry.len(), "wake lock timed out with requests pending");
        for request in registry.pending() {
            warn!(
                serial = %request.serial(),
                kind = %request.kind(),
                age_ms = u64::try_from(request.age().as_millis()).unwrap_or(u64::MAX),
                "request still pending"
            );
        }
        0
    }
}

/// Vendor stage: fail a setup-data-call request the modem never answered.
#[derive(Debug, Default, Clone, Copy)]
pub struct SetupDataCallReaper;

impl TimeoutStage for SetupDataCallReaper {
    fn name(&self) -> &'static str { "setup-data-call-reaper" }

    fn on_wake_lock_timeout(&self, registry: &mut RequestRegistry) -> usize {
        let Some(serial) = registry.setup_data_call() else {
            return 0;
        };
        let Some(request) = registry.find_and_remove(serial) else {
            return 0;
        };
        if request.has_sink() {
            error!(%serial, "stale SETUP_DATA_CALL request, reporting radio not available");
            request.fail(CommandError::RadioNotAvailable);
        } else {
            debug!(%serial, "released stale SETUP_DATA_CALL request without a caller");
        }
        1
    }
}

/// Ordered wake-lock-timeout pipeline.
#[derive(Debug)]
pub struct TimeoutReaper {
    stages: Vec<Box<dyn TimeoutStage>>,
}

impl Default for TimeoutReaper {
    fn default() -> Self { Self::new() }
}

impl TimeoutReaper {
    /// Pipeline containing only the base stage.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: vec![Box::new(PendingRequestLog)],
        }
    }

    /// Base stage followed by whatever `profile` enables.
    #[must_use]
    pub fn for_profile(profile: &dyn QuirkProfile) -> Self {
        let reaper = Self::new();
        if profile.reaps_stale_setup_data_call() {
            reaper.with_stage(SetupDataCallReaper)
        } else {
            reaper
        }
    }

    /// Append a stage after the existing ones.
    #[must_use]
    pub fn with_stage(mut self, stage: impl TimeoutStage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names in execution order.
    pub fn stage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.stages.iter().map(|stage| stage.name())
    }

    /// Run every stage in order. Returns the number of requests removed.
    pub fn on_wake_lock_timeout(&self, registry: &mut RequestRegistry) -> usize {
        self.stages
            .iter()
            .map(|stage| stage.on_wake_lock_timeout(registry))
            .sum()
    }
}

#[cfg(test)]
mod tests;
