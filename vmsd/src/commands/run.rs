//! Run command: the long-running daemon.
//!
//! The drain cycle and the radio status refresh run as two periodic tasks
//! on the current task. They stop together on Ctrl-C or SIGTERM; a cycle
//! that is already running finishes first.

use anyhow::{Context, Result};
use tracing::info;

use crate::app::AppContext;
use crate::application::services::scheduler::{run_periodic, stop_channel};

/// Run until a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error if the signal handlers cannot be installed.
pub async fn run(ctx: &AppContext) -> Result<()> {
    let orchestrator = ctx.orchestrator();
    let orch = &orchestrator;
    info!(
        store = %ctx.config.store_dir.display(),
        target = %ctx.config.mcp_address,
        "started"
    );

    let initial = orch.poll_interval().await;
    let status_interval = orch.settings().status_interval;
    let (stopper, signal) = stop_channel();
    let drain_stop = signal.clone();

    let (drains, refreshes, shutdown) = tokio::join!(
        run_periodic("drain", initial, move || orch.drain_cycle(), drain_stop),
        run_periodic("radio-status", status_interval, move || orch.refresh_status(), signal),
        async {
            let outcome = shutdown_signal().await;
            stopper.stop();
            outcome
        },
    );

    info!(drains, refreshes, "shutting down");
    shutdown
}

/// Wait for SIGINT (Ctrl-C) or, on unix, SIGTERM.
async fn shutdown_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut terminate =
            signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result.context("failed to install Ctrl-C handler")?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    tokio::signal::ctrl_c()
        .await
        .context("failed to install Ctrl-C handler")?;

    info!("received shutdown signal");
    Ok(())
}
