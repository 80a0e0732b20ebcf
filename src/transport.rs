//! Outbound transport boundary between the session and the modem link.
//!
//! The session never performs I/O itself. It hands encoded records to a
//! [`ModemTransport`], which must not block; concrete adapters queue the
//! record for a writer task that owns the socket.

use thiserror::Error;
use tokio::sync::mpsc;

/// Errors returned by transport adapters.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The outbound queue is full.
    #[error("outbound queue full")]
    QueueFull,
    /// The outbound queue has been closed.
    #[error("outbound queue closed")]
    QueueClosed,
}

/// Non-blocking sink for encoded request records.
pub trait ModemTransport: Send {
    /// Queue one record for delivery to the modem.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the record cannot be queued.
    fn send_record(&mut self, record: Vec<u8>) -> Result<(), TransportError>;
}

/// Transport that forwards records to a bounded channel drained by a writer
/// task.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Vec<u8>>,
}

impl ChannelTransport {
    /// Create a transport with its receiving half.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Vec<u8>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ModemTransport for ChannelTransport {
    fn send_record(&mut self, record: Vec<u8>) -> Result<(), TransportError> {
        self.tx.try_send(record).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => TransportError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => TransportError::QueueClosed,
        })
    }
}
