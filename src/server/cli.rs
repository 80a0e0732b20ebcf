//! Command-line and layered configuration for the `rilbridge` daemon.
//!
//! Values resolve from defaults, a `.rilbridge.toml` dotfile, `RILBRIDGE_*`
//! environment variables and finally command-line flags.

#![expect(
    non_snake_case,
    reason = "Clap/OrthoConfig derive macros generate helper modules with uppercase names"
)]
#![allow(
    missing_docs,
    reason = "OrthoConfig and Clap derive macros generate items that cannot be documented"
)]
#![allow(
    unfulfilled_lint_expectations,
    reason = "derive macros conditionally generate items"
)]

use clap::Parser;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

/// Default modem endpoint.
pub const DEFAULT_MODEM: &str = "127.0.0.1:3100";
/// Default quirk profile name.
pub const DEFAULT_PROFILE: &str = "moto-wrigley3g";
/// Default wake-lock timeout in milliseconds.
pub const DEFAULT_WAKE_LOCK_TIMEOUT_MS: u64 = 60_000;
/// Default log filter directive.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Runtime configuration for the daemon.
#[expect(
    missing_docs,
    reason = "OrthoConfig derive macro generates items that cannot be documented"
)]
#[derive(Parser, OrthoConfig, Serialize, Deserialize, Default, Debug, Clone)]
#[command(name = "rilbridge", about = "Correlate and correct radio modem traffic")]
#[ortho_config(prefix = "RILBRIDGE_")]
pub struct AppConfig {
    /// Modem endpoint: `host:port` or `unix:/path/to/socket`.
    #[ortho_config(default = DEFAULT_MODEM.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_MODEM))]
    pub modem: String,
    /// Quirk profile: `stock` or `moto-wrigley3g`.
    #[ortho_config(default = DEFAULT_PROFILE.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_PROFILE))]
    pub profile: String,
    /// Milliseconds a request may hold the wake lock.
    #[ortho_config(default = DEFAULT_WAKE_LOCK_TIMEOUT_MS)]
    #[arg(long, default_value_t = DEFAULT_WAKE_LOCK_TIMEOUT_MS)]
    pub wake_lock_timeout_ms: u64,
    /// Log filter used when `RUST_LOG` is unset.
    #[ortho_config(default = DEFAULT_LOG_FILTER.to_owned())]
    #[arg(long, default_value_t = String::from(DEFAULT_LOG_FILTER))]
    pub log_filter: String,
}
