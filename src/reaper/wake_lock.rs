//! Wake lock guarding outstanding requests.
//!
//! Sending a request holds the lock and re-arms its deadline. The lock is
//! released once the registry drains or the deadline elapses; the latter is
//! the wake-lock-timeout signal that drives [`TimeoutReaper`](super::TimeoutReaper).

use tokio::time::{Duration, Instant};

/// Default time a request may hold the wake lock.
pub const DEFAULT_WAKE_LOCK_TIMEOUT: Duration = Duration::from_secs(60);

/// Deadline-bearing wake lock.
#[derive(Debug, Clone)]
pub struct WakeLock {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Default for WakeLock {
    fn default() -> Self { Self::new(DEFAULT_WAKE_LOCK_TIMEOUT) }
}

impl WakeLock {
    /// Create a released wake lock with the given timeout.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            deadline: None,
        }
    }

    /// Hold the lock and push its deadline to `now + timeout`.
    pub fn acquire(&mut self) { self.deadline = Some(Instant::now() + self.timeout); }

    /// Release the lock. Returns `true` if it was held.
    pub const fn release(&mut self) -> bool { self.deadline.take().is_some() }

    /// Whether the lock is held.
    #[must_use]
    pub const fn is_held(&self) -> bool { self.deadline.is_some() }

    /// When the wake-lock-timeout signal fires, if held.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> { self.deadline }

    /// Configured timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration { self.timeout }
}
