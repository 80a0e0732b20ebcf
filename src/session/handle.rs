//! Cloneable front door to a running session.

use thiserror::Error;
use tokio::sync::mpsc;

use super::{Event, Request};
use crate::outcome::{CommandError, Outcome, result_channel};

/// The session task has stopped.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("session closed")]
pub struct SessionClosed;

/// Sends events to a session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Event>,
}

impl SessionHandle {
    pub(super) const fn new(tx: mpsc::Sender<Event>) -> Self { Self { tx } }

    async fn send(&self, event: Event) -> Result<(), SessionClosed> {
        self.tx.send(event).await.map_err(|_| SessionClosed)
    }

    /// Issue `request` and wait for its outcome.
    ///
    /// A stopped session, or one that drops the request, reports
    /// [`CommandError::RadioNotAvailable`].
    pub async fn request(&self, request: Request) -> Outcome {
        let (sink, rx) = result_channel();
        self.send(Event::Submit {
            request,
            sink: Some(sink),
        })
        .await
        .map_err(|_| CommandError::RadioNotAvailable)?;
        rx.await.unwrap_or(Err(CommandError::RadioNotAvailable))
    }

    /// Hand an inbound record to the session.
    ///
    /// # Errors
    /// Returns [`SessionClosed`] if the session has stopped.
    pub async fn deliver(&self, record: Vec<u8>) -> Result<(), SessionClosed> {
        self.send(Event::Record(record)).await
    }

    /// Raise the wake-lock-timeout signal immediately.
    ///
    /// # Errors
    /// Returns [`SessionClosed`] if the session has stopped.
    pub async fn wake_lock_timeout(&self) -> Result<(), SessionClosed> {
        self.send(Event::WakeLockTimeout).await
    }

    /// Ask the session to stop, failing pending requests.
    ///
    /// # Errors
    /// Returns [`SessionClosed`] if the session has already stopped.
    pub async fn shutdown(&self) -> Result<(), SessionClosed> { self.send(Event::Shutdown).await }

    /// Whether the session task has stopped.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.tx.is_closed() }
}
