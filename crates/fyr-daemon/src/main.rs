//! # fyr-daemon
//!
//! Standalone daemon for the fyr beacon-region synchronization engine.
//!
//! On startup the daemon restores monitoring from the persisted toggle,
//! then lets the periodic runner drive background sync ticks until it is
//! stopped.
//!
//! ## Running
//!
//! ```bash
//! # Development
//! cargo run --package fyr-daemon
//!
//! # Production
//! FYR_ENV=production ./fyr-daemon
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use fyr_core::config::FyrConfig;
use tracing::{info, warn};

mod host;
mod logging;
mod state;
mod stores;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let is_production = std::env::var("FYR_ENV").is_ok_and(|env| env == "production");
    logging::init(is_production)?;

    info!("starting fyr-daemon");

    let config = FyrConfig::load()?;
    let data_dir = stores::default_data_dir()?;
    let app = AppState::new(&config, &data_dir)?;

    if let Err(err) = app.bootstrap().await {
        // A fetch failure on boot is not fatal; the periodic runner will
        // pick the sync up on its next tick.
        warn!(%err, "bootstrap sync failed");
    }

    info!("fyr-daemon running");

    tokio::signal::ctrl_c().await?;
    info!("shutting down");

    Ok(())
}
