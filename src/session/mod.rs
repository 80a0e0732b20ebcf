//! Per-modem session: the single owner of correlation state.
//!
//! A [`Session`] drains one ordered event queue. Outbound requests are
//! registered and written to the [`ModemTransport`]; inbound records are
//! parsed, decoded, corrected by the active [`QuirkProfile`], and delivered to
//! the waiting caller. Registry, lifecycle and reaper state are touched only
//! from this loop, so none of it is locked.

mod handle;

use std::sync::Arc;

pub use handle::{SessionClosed, SessionHandle};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
    time::{Duration, Instant, sleep_until},
};
use tracing::{debug, info, trace, warn};

use crate::{
    data_call::{DataCall, DeactivateDataCall, SetupDataCall},
    decoder::{decode_call_list, decode_data_call_list, decode_supp_service_notification},
    lifecycle::{DataCallLifecycle, Deactivation},
    notification::SuppServiceNotification,
    outcome::{CommandError, Outcome, Response, ResultSink},
    parcel::{ParcelError, RequestFrame, ResponseFrame},
    quirks::QuirkProfile,
    reaper::{DEFAULT_WAKE_LOCK_TIMEOUT, TimeoutReaper, WakeLock},
    registry::{
        RequestRegistry,
        privacy::{VoicePrivacy, VoicePrivacyRegistrants},
    },
    request_kind::{RequestKind, UnsolicitedKind},
    serial::{Serial, SerialAllocator},
    transport::ModemTransport,
};

/// Default depth of the session event queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

const UNSOLICITED_CAPACITY: usize = 64;

/// Tunables for a [`Session`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a sent request holds the wake lock before timing out.
    pub wake_lock_timeout: Duration,
    /// Depth of the event queue created by [`Session::spawn`].
    pub queue_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            wake_lock_timeout: DEFAULT_WAKE_LOCK_TIMEOUT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// A command the host asks the session to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Enumerate current calls.
    GetCurrentCalls,
    /// Enumerate active data connections.
    DataCallList,
    /// Bring up a data connection.
    SetupDataCall(SetupDataCall),
    /// Tear down a data connection.
    DeactivateDataCall(DeactivateDataCall),
    /// Any other command, sent with a pre-encoded body.
    Raw {
        /// Command id.
        kind: RequestKind,
        /// Encoded parameters.
        body: Vec<u8>,
    },
}

impl Request {
    /// Command id written on the wire.
    #[must_use]
    pub const fn kind(&self) -> RequestKind {
        match self {
            Self::GetCurrentCalls => RequestKind::GetCurrentCalls,
            Self::DataCallList => RequestKind::DataCallList,
            Self::SetupDataCall(_) => RequestKind::SetupDataCall,
            Self::DeactivateDataCall(_) => RequestKind::DeactivateDataCall,
            Self::Raw { kind, .. } => *kind,
        }
    }

    /// Teardown parameters, for typed requests and raw ones of the same kind.
    ///
    /// A raw teardown whose body does not decode yields `None` and is sent
    /// as-is.
    fn teardown(&self) -> Option<DeactivateDataCall> {
        match self {
            Self::DeactivateDataCall(params) => Some(*params),
            Self::Raw {
                kind: RequestKind::DeactivateDataCall,
                body,
            } => DeactivateDataCall::decode(body).ok(),
            _ => None,
        }
    }

    fn into_body(self) -> Vec<u8> {
        match self {
            Self::GetCurrentCalls | Self::DataCallList => Vec::new(),
            Self::SetupDataCall(params) => params.encode(),
            Self::DeactivateDataCall(params) => params.encode(),
            Self::Raw { body, .. } => body,
        }
    }
}

/// Notification published to unsolicited-event subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsolicitedEvent {
    /// A supplementary service notification, already corrected.
    SuppService(SuppServiceNotification),
    /// The modem's data connections changed.
    DataCallListChanged(Vec<DataCall>),
    /// Call state changed; the call list should be re-queried.
    CallStateChanged,
    /// A notification this layer does not interpret.
    Other(UnsolicitedKind),
}

/// Input to the session loop.
#[derive(Debug)]
pub enum Event {
    /// Issue a request, delivering its outcome to `sink`.
    Submit {
        /// Command to issue.
        request: Request,
        /// Where to deliver the outcome.
        sink: Option<ResultSink>,
    },
    /// An inbound record from the modem.
    Record(Vec<u8>),
    /// Raise the wake-lock-timeout signal now.
    WakeLockTimeout,
    /// Stop the loop, failing anything still pending.
    Shutdown,
}

/// Correlation state for one modem connection.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    profile: Arc<dyn QuirkProfile>,
    registry: RequestRegistry,
    lifecycle: DataCallLifecycle,
    reaper: TimeoutReaper,
    wake_lock: WakeLock,
    serials: SerialAllocator,
    privacy: VoicePrivacyRegistrants,
    unsolicited: broadcast::Sender<UnsolicitedEvent>,
    queue_capacity: usize,
}

impl<T: ModemTransport> Session<T> {
    /// Create a session writing to `transport` and correcting with `profile`.
    #[must_use]
    pub fn new(transport: T, profile: Arc<dyn QuirkProfile>, config: SessionConfig) -> Self {
        let (unsolicited, _) = broadcast::channel(UNSOLICITED_CAPACITY);
        Self {
            transport,
            lifecycle: DataCallLifecycle::new(profile.short_circuits_idle_deactivation()),
            reaper: TimeoutReaper::for_profile(profile.as_ref()),
            profile,
            registry: RequestRegistry::new(),
            wake_lock: WakeLock::new(config.wake_lock_timeout),
            serials: SerialAllocator::default(),
            privacy: VoicePrivacyRegistrants::default(),
            unsolicited,
            queue_capacity: config.queue_capacity,
        }
    }

    /// Active quirk profile.
    #[must_use]
    pub fn profile(&self) -> &dyn QuirkProfile { self.profile.as_ref() }

    /// In-flight requests.
    #[must_use]
    pub const fn registry(&self) -> &RequestRegistry { &self.registry }

    /// Tracked number of data connections, `None` until the first list.
    #[must_use]
    pub const fn data_call_count(&self) -> Option<usize> { self.lifecycle.count() }

    /// When the wake lock expires, if held.
    #[must_use]
    pub const fn wake_lock_deadline(&self) -> Option<Instant> { self.wake_lock.deadline() }

    /// Borrow the transport.
    #[must_use]
    pub const fn transport(&self) -> &T { &self.transport }

    /// Listen for voice-privacy changes.
    #[must_use]
    pub fn subscribe_voice_privacy(&self) -> broadcast::Receiver<VoicePrivacy> {
        self.privacy.subscribe()
    }

    /// Listen for unsolicited notifications.
    #[must_use]
    pub fn subscribe_unsolicited(&self) -> broadcast::Receiver<UnsolicitedEvent> {
        self.unsolicited.subscribe()
    }

    /// Issue `request`.
    ///
    /// Returns the allocated serial, or `None` if the request completed
    /// without reaching the modem (idle teardown, registration or transport
    /// failure). In every case `sink` receives exactly one outcome.
    pub fn submit(&mut self, request: Request, sink: Option<ResultSink>) -> Option<Serial> {
        if let Some(params) = request.teardown() {
            let decision = self.lifecycle.request_deactivation(params.cid, params.reason);
            if decision == Deactivation::AlreadyIdle {
                deliver(sink, Ok(Response::Empty));
                return None;
            }
        }

        let serial = self.serials.allocate();
        let kind = request.kind();
        if self.registry.register(serial, kind, sink).is_err() {
            return None;
        }
        let frame = RequestFrame {
            kind,
            serial,
            body: request.into_body(),
        };
        match self.transport.send_record(frame.to_bytes()) {
            Ok(()) => {
                debug!(%serial, %kind, "request sent");
                self.wake_lock.acquire();
                Some(serial)
            }
            Err(err) => {
                warn!(%serial, %kind, error = %err, "failed to queue request");
                if let Some(pending) = self.registry.find_and_remove(serial) {
                    pending.fail(CommandError::RadioNotAvailable);
                }
                self.release_wake_lock_if_idle();
                None
            }
        }
    }

    /// Process one inbound record.
    pub fn handle_record(&mut self, record: &[u8]) {
        match ResponseFrame::parse(record) {
            Ok(ResponseFrame::Solicited {
                serial,
                error,
                body,
            }) => self.handle_response(serial, error, &body),
            Ok(ResponseFrame::Unsolicited { kind, body }) => self.handle_unsolicited(kind, &body),
            Err(err) => self.handle_unparseable(record, err),
        }
    }

    fn handle_unparseable(&mut self, record: &[u8], err: ParcelError) {
        let Some(serial) = ResponseFrame::solicited_serial(record) else {
            warn!(error = %err, len = record.len(), "dropping unparseable record");
            return;
        };
        let Some(request) = self.registry.find_and_remove(serial) else {
            debug!(%serial, error = %err, "truncated response for unknown serial ignored");
            return;
        };
        warn!(%serial, kind = %request.kind(), error = %err, "truncated response envelope");
        request.fail(CommandError::MalformedFrame(err));
        self.release_wake_lock_if_idle();
    }

    fn handle_response(&mut self, serial: Serial, error: i32, body: &[u8]) {
        let Some(request) = self.registry.find_and_remove(serial) else {
            debug!(%serial, error, "response for unknown serial ignored");
            return;
        };
        let kind = request.kind();
        let outcome = if error == 0 {
            self.decode_response(kind, body)
        } else {
            Err(CommandError::Modem(error))
        };
        match &outcome {
            Ok(_) => debug!(%serial, %kind, "request completed"),
            Err(err) => warn!(%serial, %kind, error = %err, "request failed"),
        }
        request.complete(outcome);
        self.release_wake_lock_if_idle();
    }

    fn decode_response(&mut self, kind: RequestKind, body: &[u8]) -> Outcome {
        match kind {
            RequestKind::GetCurrentCalls => {
                let privacy = &self.privacy;
                let calls = decode_call_list(body, self.profile.as_ref(), |call| {
                    privacy.notify(VoicePrivacy::from(call.is_voice_privacy));
                })?;
                Ok(Response::Calls(calls))
            }
            RequestKind::DataCallList => {
                let calls = decode_data_call_list(body)?;
                self.lifecycle.observe(calls.len());
                Ok(Response::DataCalls(calls))
            }
            RequestKind::SetupDataCall => Ok(Response::DataCalls(decode_data_call_list(body)?)),
            RequestKind::DeactivateDataCall => Ok(Response::Empty),
            RequestKind::Other(_) => Ok(Response::Raw(body.to_vec())),
        }
    }

    fn handle_unsolicited(&mut self, kind: UnsolicitedKind, body: &[u8]) {
        let event = match kind {
            UnsolicitedKind::SuppSvcNotification => {
                match decode_supp_service_notification(body) {
                    Ok(mut notification) => {
                        let original = notification.code;
                        if self.profile.correct_notification(&mut notification) {
                            debug!(
                                from = original,
                                to = notification.code,
                                profile = self.profile.name(),
                                "corrected notification code"
                            );
                        }
                        UnsolicitedEvent::SuppService(notification)
                    }
                    Err(err) => {
                        warn!(%kind, error = %err, "dropping malformed notification");
                        return;
                    }
                }
            }
            UnsolicitedKind::DataCallListChanged => match decode_data_call_list(body) {
                Ok(calls) => {
                    self.lifecycle.observe(calls.len());
                    UnsolicitedEvent::DataCallListChanged(calls)
                }
                Err(err) => {
                    warn!(%kind, error = %err, "dropping malformed notification");
                    return;
                }
            },
            UnsolicitedKind::CallStateChanged => UnsolicitedEvent::CallStateChanged,
            UnsolicitedKind::Other(_) => {
                debug!(%kind, len = body.len(), "uninterpreted notification");
                UnsolicitedEvent::Other(kind)
            }
        };
        if self.unsolicited.send(event).is_err() {
            trace!(%kind, "no unsolicited listeners");
        }
    }

    /// Raise the wake-lock-timeout signal.
    ///
    /// Releases the wake lock, then runs the reaper stages in order. Returns
    /// the number of requests the stages removed.
    pub fn handle_wake_lock_timeout(&mut self) -> usize {
        self.wake_lock.release();
        let reaped = self.reaper.on_wake_lock_timeout(&mut self.registry);
        if reaped > 0 {
            info!(reaped, remaining = self.registry.len(), "wake lock timeout reaped requests");
        }
        reaped
    }

    /// Fail every pending request with radio-not-available.
    ///
    /// Returns the number of requests failed.
    pub fn shutdown(&mut self) -> usize {
        let pending = self.registry.drain();
        let count = pending.len();
        for request in pending {
            debug!(serial = %request.serial(), kind = %request.kind(), "failing request on shutdown");
            request.fail(CommandError::RadioNotAvailable);
        }
        self.wake_lock.release();
        if count > 0 {
            info!(count, "session shut down with requests pending");
        }
        count
    }

    fn release_wake_lock_if_idle(&mut self) {
        if self.registry.is_empty() && self.wake_lock.release() {
            trace!("wake lock released");
        }
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Submit { request, sink } => {
                self.submit(request, sink);
            }
            Event::Record(record) => self.handle_record(&record),
            Event::WakeLockTimeout => {
                self.handle_wake_lock_timeout();
            }
            Event::Shutdown => {
                self.shutdown();
            }
        }
    }

    /// Drain `events` until the queue closes or [`Event::Shutdown`] arrives.
    ///
    /// The wake-lock deadline is raised as a timeout whenever it elapses with
    /// no earlier event queued.
    pub async fn run(mut self, mut events: mpsc::Receiver<Event>) {
        loop {
            let deadline = self.wake_lock.deadline();
            tokio::select! {
                biased;
                event = events.recv() => match event {
                    Some(Event::Shutdown) | None => break,
                    Some(event) => self.dispatch(event),
                },
                () = wake_lock_elapsed(deadline) => {
                    self.handle_wake_lock_timeout();
                }
            }
        }
        self.shutdown();
    }
}

impl<T: ModemTransport + 'static> Session<T> {
    /// Run the session on a new task and return a handle to it.
    #[must_use]
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(self.queue_capacity.max(1));
        let task = tokio::spawn(self.run(rx));
        (SessionHandle::new(tx), task)
    }
}

async fn wake_lock_elapsed(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn deliver(sink: Option<ResultSink>, outcome: Outcome) {
    let Some(sink) = sink else {
        return;
    };
    if sink.send(outcome).is_err() {
        debug!("caller dropped result receiver");
    }
}

#[cfg(test)]
mod tests;
