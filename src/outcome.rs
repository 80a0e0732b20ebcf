//! Caller-visible results of modem requests.

use thiserror::Error;
use tokio::sync::oneshot;

use crate::{call::CallEntry, data_call::DataCall, parcel::ParcelError, serial::Serial};

/// Terminal failure delivered to a request's result sink.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The response body could not be decoded.
    #[error("malformed response frame: {0}")]
    MalformedFrame(#[from] ParcelError),
    /// The radio did not answer, or the link to it is gone.
    #[error("radio not available")]
    RadioNotAvailable,
    /// The modem answered with a non-zero error code.
    #[error("modem returned error {0}")]
    Modem(i32),
    /// The request's serial was already in flight.
    #[error("duplicate serial {0}")]
    DuplicateSerial(Serial),
}

/// Decoded payload of a successful response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The request succeeded without a payload.
    Empty,
    /// Current calls, sorted by index.
    Calls(Vec<CallEntry>),
    /// Data connections.
    DataCalls(Vec<DataCall>),
    /// Undecoded body for request kinds without a dedicated decoder.
    Raw(Vec<u8>),
}

/// Final result of a request.
pub type Outcome = Result<Response, CommandError>;

/// One-shot completion handle for a request.
pub type ResultSink = oneshot::Sender<Outcome>;

/// Receiving half paired with a [`ResultSink`].
pub type ResultReceiver = oneshot::Receiver<Outcome>;

/// Create a connected sink/receiver pair.
#[must_use]
pub fn result_channel() -> (ResultSink, ResultReceiver) { oneshot::channel() }
