//! Tracking of active packet data connections.
//!
//! The count is written only from the data-call list decode path and read only
//! when deciding whether a teardown request needs to reach the modem.

use tracing::{info, warn};

use crate::data_call::DeactivateDataCall;

/// What to do with a deactivate-data-call request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deactivation {
    /// No data call is up; answer success locally and send nothing.
    AlreadyIdle,
    /// Forward the request to the modem.
    Forward(DeactivateDataCall),
}

/// Session-owned count of active data connections.
#[derive(Debug, Clone, Default)]
pub struct DataCallLifecycle {
    count: Option<usize>,
    short_circuit_idle: bool,
}

impl DataCallLifecycle {
    /// Create a tracker; the count starts unknown.
    ///
    /// When `short_circuit_idle` is `false`, every teardown is forwarded.
    #[must_use]
    pub const fn new(short_circuit_idle: bool) -> Self {
        Self {
            count: None,
            short_circuit_idle,
        }
    }

    /// Overwrite the tracked count with the length of a decoded list.
    pub fn observe(&mut self, count: usize) {
        self.count = Some(count);
        info!(count, "data call list received");
    }

    /// Tracked count, or `None` until the first list arrives.
    #[must_use]
    pub const fn count(&self) -> Option<usize> { self.count }

    /// Decide how to handle a teardown of `cid`.
    #[must_use]
    pub fn request_deactivation(&self, cid: i32, reason: i32) -> Deactivation {
        if self.short_circuit_idle && self.count == Some(0) {
            warn!(cid, reason, "deactivate-data-call without an active data call, dropping");
            return Deactivation::AlreadyIdle;
        }
        Deactivation::Forward(DeactivateDataCall { cid, reason })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn starts_unknown_and_forwards() {
        let lifecycle = DataCallLifecycle::new(true);

        assert_eq!(lifecycle.count(), None);
        assert_eq!(
            lifecycle.request_deactivation(1, 0),
            Deactivation::Forward(DeactivateDataCall { cid: 1, reason: 0 })
        );
    }

    #[rstest]
    fn idle_count_short_circuits() {
        let mut lifecycle = DataCallLifecycle::new(true);
        lifecycle.observe(0);

        assert_eq!(lifecycle.request_deactivation(1, 2), Deactivation::AlreadyIdle);
    }

    #[rstest]
    #[case(1)]
    #[case(3)]
    fn active_count_forwards(#[case] count: usize) {
        let mut lifecycle = DataCallLifecycle::new(true);
        lifecycle.observe(count);

        assert!(matches!(
            lifecycle.request_deactivation(4, 0),
            Deactivation::Forward(DeactivateDataCall { cid: 4, .. })
        ));
    }

    #[rstest]
    fn latest_observation_wins() {
        let mut lifecycle = DataCallLifecycle::new(true);
        lifecycle.observe(0);
        lifecycle.observe(2);

        assert_eq!(lifecycle.count(), Some(2));
        assert!(matches!(
            lifecycle.request_deactivation(1, 0),
            Deactivation::Forward(_)
        ));
    }

    #[rstest]
    fn disabled_short_circuit_always_forwards() {
        let mut lifecycle = DataCallLifecycle::new(false);
        lifecycle.observe(0);

        assert!(matches!(
            lifecycle.request_deactivation(1, 0),
            Deactivation::Forward(_)
        ));
    }
}
