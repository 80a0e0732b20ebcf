//! Binary entry point for the `rilbridge` modem daemon.
//!
//! Delegates to [`rilbridge::server::run`].

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> { rilbridge::server::run().await }
