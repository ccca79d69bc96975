//! OS signal handling.
//!
//! Ctrl-C (SIGINT) triggers [`Shutdown`]; a second Ctrl-C exits immediately.

use crate::lifecycle::shutdown::Shutdown;

/// Spawn a task translating Ctrl-C into a shutdown trigger.
pub fn spawn_signal_handler(shutdown: Shutdown) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            return;
        }
        tracing::warn!("Ctrl-C received, stopping after the current step");
        shutdown.trigger();

        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Second Ctrl-C received, exiting");
            std::process::exit(130);
        }
    })
}
