//! Daemon wiring for the `rilbridge` binary.
//!
//! Loads [`AppConfig`], installs the tracing subscriber, connects to the modem
//! and runs a [`Session`](crate::session::Session) until the link closes or a
//! shutdown signal arrives. The binary stays a thin wrapper around [`run`].

pub mod cli;
pub mod link;

use anyhow::{Context, Result, anyhow};
pub use cli::AppConfig;
pub use link::{Link, ModemEndpoint, attach};
use ortho_config::OrthoConfig;
use tokio::{sync::broadcast::error::RecvError, time::Duration};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::{
    outcome::{Outcome, Response},
    quirks::ProfileKind,
    request_kind::RequestKind,
    session::{Request, SessionConfig, SessionHandle, UnsolicitedEvent},
};

/// Load configuration from the process environment and run the daemon.
///
/// # Errors
///
/// Returns any error raised while loading configuration or connecting to the
/// modem.
pub async fn run() -> Result<()> {
    let config = AppConfig::load_from_iter(std::env::args_os())
        .map_err(|err| anyhow!("failed to load configuration: {err}"))?;
    init_tracing(&config.log_filter)?;
    run_daemon(config).await
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .with_context(|| format!("invalid log filter '{default_filter}'"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|err| anyhow!("failed to install tracing subscriber: {err}"))
}

/// Connect to the configured modem and monitor it until shutdown.
///
/// # Errors
///
/// Returns an error if the profile or endpoint is invalid or the modem cannot
/// be reached.
pub async fn run_daemon(config: AppConfig) -> Result<()> {
    let profile: ProfileKind = config.profile.parse()?;
    let endpoint: ModemEndpoint = config.modem.parse()?;
    let session_config = SessionConfig {
        wake_lock_timeout: Duration::from_millis(config.wake_lock_timeout_ms),
        ..SessionConfig::default()
    };
    let profile = profile.build();
    info!(%endpoint, profile = profile.name(), "connecting to modem");
    let link = match &endpoint {
        ModemEndpoint::Tcp(addr) => {
            let stream = tokio::net::TcpStream::connect(addr)
                .await
                .with_context(|| format!("failed to connect to {endpoint}"))?;
            attach(stream, profile, session_config)
        }
        #[cfg(unix)]
        ModemEndpoint::Unix(path) => {
            let stream = tokio::net::UnixStream::connect(path)
                .await
                .with_context(|| format!("failed to connect to {endpoint}"))?;
            attach(stream, profile, session_config)
        }
        #[cfg(not(unix))]
        ModemEndpoint::Unix(_) => {
            anyhow::bail!("unix socket endpoints are not supported on this platform")
        }
    };
    monitor(link).await;
    Ok(())
}

/// Query initial state, then log modem activity until shutdown or link loss.
pub async fn monitor(mut link: Link) {
    let handle = link.handle.clone();
    spawn_query(&handle, Request::GetCurrentCalls);
    spawn_query(&handle, Request::DataCallList);

    loop {
        tokio::select! {
            res = tokio::signal::ctrl_c() => {
                if let Err(err) = res {
                    warn!(error = %err, "failed to listen for Ctrl-C");
                }
                info!("shutdown signal received");
                break;
            }
            event = link.unsolicited.recv() => match event {
                Ok(UnsolicitedEvent::CallStateChanged) => {
                    spawn_query(&handle, Request::GetCurrentCalls);
                }
                Ok(event) => info!(?event, "unsolicited event"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "unsolicited listener lagged"),
                Err(RecvError::Closed) => break,
            },
            state = link.privacy.recv() => match state {
                Ok(state) => debug!(?state, "voice privacy"),
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "privacy listener lagged"),
                Err(RecvError::Closed) => break,
            },
        }
    }

    if handle.shutdown().await.is_err() {
        debug!("session already stopped");
    }
    link.join().await;
}

fn spawn_query(handle: &SessionHandle, request: Request) {
    let handle = handle.clone();
    tokio::spawn(async move {
        let kind = request.kind();
        log_outcome(kind, handle.request(request).await);
    });
}

fn log_outcome(kind: RequestKind, outcome: Outcome) {
    match outcome {
        Ok(Response::Calls(calls)) => info!(%kind, count = calls.len(), "current calls"),
        Ok(Response::DataCalls(calls)) => info!(%kind, count = calls.len(), "data calls"),
        Ok(_) => info!(%kind, "request completed"),
        Err(err) => warn!(%kind, error = %err, "request failed"),
    }
}
