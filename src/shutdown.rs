//! Graceful-shutdown flag wired to Ctrl-C / SIGTERM.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

/// Installs a signal handler that sets the returned stop flag.
///
/// The flag starts false and is stored exactly once, on the first Ctrl-C (or
/// SIGTERM on unix). The handler performs no I/O beyond a log line; the
/// scheduler polls the flag at its per-event checkpoints, so the current
/// event is never cancelled mid-flight.
pub fn install_signal_handler() -> Arc<AtomicBool> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();

    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Received shutdown signal, finishing current event");
        flag.store(true, Ordering::SeqCst);
    });

    stop
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate()).expect("Failed to install SIGTERM handler");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
}
