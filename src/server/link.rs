//! Modem link: moves length-prefixed records between a socket and a session.
//!
//! [`attach`] wraps any byte stream in [`RecordCodec`] framing and starts
//! three tasks: the session loop, a reader feeding inbound records to it, and
//! a writer draining the session's outbound queue. When the modem closes the
//! stream the reader shuts the session down, failing whatever is pending.

use std::{fmt, path::PathBuf, str::FromStr, sync::Arc};

use futures_util::{
    SinkExt,
    StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use crate::{
    parcel::RecordCodec,
    quirks::QuirkProfile,
    registry::privacy::VoicePrivacy,
    session::{Session, SessionConfig, SessionHandle, UnsolicitedEvent},
    transport::ChannelTransport,
};

/// Where the modem listens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModemEndpoint {
    /// TCP `host:port`.
    Tcp(String),
    /// Unix domain socket path.
    Unix(PathBuf),
}

/// Error returned for an empty endpoint string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("modem endpoint must not be empty")]
pub struct EmptyEndpoint;

impl FromStr for ModemEndpoint {
    type Err = EmptyEndpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(path) = trimmed.strip_prefix("unix:") {
            if path.is_empty() {
                return Err(EmptyEndpoint);
            }
            return Ok(Self::Unix(PathBuf::from(path)));
        }
        if trimmed.is_empty() {
            return Err(EmptyEndpoint);
        }
        Ok(Self::Tcp(trimmed.to_owned()))
    }
}

impl fmt::Display for ModemEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => f.write_str(addr),
            Self::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// Running session bound to a modem stream.
#[derive(Debug)]
pub struct Link {
    /// Handle for issuing requests.
    pub handle: SessionHandle,
    /// Unsolicited notifications, subscribed before the session started.
    pub unsolicited: broadcast::Receiver<UnsolicitedEvent>,
    /// Voice-privacy changes, subscribed before the session started.
    pub privacy: broadcast::Receiver<VoicePrivacy>,
    session: JoinHandle<()>,
    reader: JoinHandle<()>,
    writer: JoinHandle<()>,
}

impl Link {
    /// Wait for all link tasks to finish.
    pub async fn join(self) {
        for (name, task) in [
            ("session", self.session),
            ("reader", self.reader),
            ("writer", self.writer),
        ] {
            if let Err(err) = task.await {
                warn!(task = name, error = %err, "link task failed");
            }
        }
    }
}

/// Start a session over `stream`.
#[must_use]
pub fn attach<S>(stream: S, profile: Arc<dyn QuirkProfile>, config: SessionConfig) -> Link
where
    S: AsyncRead + AsyncWrite + Send + Unpin + 'static,
{
    let (transport, outbound) = ChannelTransport::channel(config.queue_capacity);
    let session = Session::new(transport, profile, config);
    let unsolicited = session.subscribe_unsolicited();
    let privacy = session.subscribe_voice_privacy();
    let (handle, session) = session.spawn();

    let (sink, frames) = Framed::new(stream, RecordCodec::new()).split();
    let reader = tokio::spawn(pump_inbound(frames, handle.clone()));
    let writer = tokio::spawn(pump_outbound(sink, outbound));

    Link {
        handle,
        unsolicited,
        privacy,
        session,
        reader,
        writer,
    }
}

async fn pump_inbound<S>(mut frames: SplitStream<Framed<S, RecordCodec>>, handle: SessionHandle)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(frame) = frames.next().await {
        match frame {
            Ok(record) => {
                if handle.deliver(record).await.is_err() {
                    return;
                }
            }
            Err(err) => {
                warn!(error = %err, "modem link read failed");
                break;
            }
        }
    }
    info!("modem link closed");
    if handle.shutdown().await.is_err() {
        debug!("session already stopped");
    }
}

async fn pump_outbound<S>(
    mut sink: SplitSink<Framed<S, RecordCodec>, Vec<u8>>,
    mut outbound: mpsc::Receiver<Vec<u8>>,
) where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(record) = outbound.recv().await {
        if let Err(err) = sink.send(record).await {
            warn!(error = %err, "modem link write failed");
            return;
        }
    }
    debug!("outbound queue closed");
}
