//! In-flight request bookkeeping.
//!
//! [`RequestRegistry`] owns every request between registration and completion.
//! [`RequestRegistry::find_and_remove`] is the only way a request leaves the
//! registry, so whichever path reaches it first (response, timeout, shutdown)
//! completes the request and every later attempt observes `None`.
//!
//! The registry also tracks the single outstanding setup-data-call request in
//! a dedicated slot, cleared whenever that request is removed.

pub mod privacy;

use std::collections::BTreeMap;

use thiserror::Error;
use tokio::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::{
    outcome::{CommandError, Outcome, ResultSink},
    request_kind::RequestKind,
    serial::Serial,
};

/// Errors raised by registry mutations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    /// The serial is already tracked.
    #[error("serial {0} is already in flight")]
    DuplicateSerial(Serial),
}

/// A request awaiting its response.
#[derive(Debug)]
pub struct PendingRequest {
    serial: Serial,
    kind: RequestKind,
    sink: Option<ResultSink>,
    created_at: Instant,
}

impl PendingRequest {
    /// Create a pending request stamped with the current time.
    #[must_use]
    pub fn new(serial: Serial, kind: RequestKind, sink: Option<ResultSink>) -> Self {
        Self {
            serial,
            kind,
            sink,
            created_at: Instant::now(),
        }
    }

    /// Serial correlating the request with its response.
    #[must_use]
    pub const fn serial(&self) -> Serial { self.serial }

    /// Request kind.
    #[must_use]
    pub const fn kind(&self) -> RequestKind { self.kind }

    /// When the request was registered.
    #[must_use]
    pub const fn created_at(&self) -> Instant { self.created_at }

    /// Time elapsed since registration.
    #[must_use]
    pub fn age(&self) -> Duration { self.created_at.elapsed() }

    /// Whether a caller is waiting on the result.
    #[must_use]
    pub const fn has_sink(&self) -> bool { self.sink.is_some() }

    /// Deliver `outcome` to the caller, consuming the request.
    ///
    /// Delivery never blocks. Returns `false` if there was no sink or the
    /// caller stopped listening.
    pub fn complete(mut self, outcome: Outcome) -> bool {
        let Some(sink) = self.sink.take() else {
            return false;
        };
        let delivered = sink.send(outcome).is_ok();
        if !delivered {
            debug!(serial = %self.serial, kind = %self.kind, "caller dropped result receiver");
        }
        delivered
    }

    /// Deliver a failure to the caller, consuming the request.
    pub fn fail(self, error: CommandError) -> bool { self.complete(Err(error)) }
}

/// Table of in-flight requests keyed by serial.
#[derive(Debug, Default)]
pub struct RequestRegistry {
    pending: BTreeMap<Serial, PendingRequest>,
    setup_data_call: Option<Serial>,
}

impl RequestRegistry {
    /// Create an empty registry.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            setup_data_call: None,
        }
    }

    /// Track a new request.
    ///
    /// A setup-data-call request also occupies the setup slot.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateSerial`] if `serial` is already
    /// tracked. The rejected request's sink is failed with
    /// [`CommandError::DuplicateSerial`]; existing entries are untouched.
    pub fn register(
        &mut self,
        serial: Serial,
        kind: RequestKind,
        sink: Option<ResultSink>,
    ) -> Result<Serial, RegistryError> {
        let request = PendingRequest::new(serial, kind, sink);
        if self.pending.contains_key(&serial) {
            warn!(%serial, %kind, "rejecting request with duplicate serial");
            request.fail(CommandError::DuplicateSerial(serial));
            return Err(RegistryError::DuplicateSerial(serial));
        }
        if kind == RequestKind::SetupDataCall {
            if let Some(previous) = self.setup_data_call.replace(serial) {
                warn!(%serial, %previous, "setup-data-call issued while another is pending");
            }
        }
        self.pending.insert(serial, request);
        Ok(serial)
    }

    /// Remove and return the request for `serial`, if still tracked.
    ///
    /// Removing the tracked setup-data-call request clears the setup slot.
    pub fn find_and_remove(&mut self, serial: Serial) -> Option<PendingRequest> {
        let request = self.pending.remove(&serial)?;
        if self.setup_data_call == Some(serial) {
            debug!(%serial, "setup-data-call request left the registry");
            self.setup_data_call = None;
        }
        Some(request)
    }

    /// Serial of the outstanding setup-data-call request, if any.
    #[must_use]
    pub const fn setup_data_call(&self) -> Option<Serial> { self.setup_data_call }

    /// Iterate over in-flight requests in serial order.
    pub fn pending(&self) -> impl Iterator<Item = &PendingRequest> { self.pending.values() }

    /// Whether `serial` is in flight.
    #[must_use]
    pub fn contains(&self, serial: Serial) -> bool { self.pending.contains_key(&serial) }

    /// Number of in-flight requests.
    #[must_use]
    pub fn len(&self) -> usize { self.pending.len() }

    /// Whether nothing is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.pending.is_empty() }

    /// Remove every in-flight request, in serial order.
    pub fn drain(&mut self) -> Vec<PendingRequest> {
        self.setup_data_call = None;
        std::mem::take(&mut self.pending).into_values().collect()
    }
}
