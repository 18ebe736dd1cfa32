use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::shutdown::{ShutdownReceiver, ShutdownSender};

/// One pending stop request is enough; later sends are redundant.
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Broadcasts shutdown on Ctrl+C or SIGTERM so running virtual users stop
/// and the report still prints. Exits quietly once anything else broadcasts
/// shutdown first.
#[must_use]
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        let signal_name = tokio::select! {
            _ = shutdown_rx.recv() => return,
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => "Ctrl+C",
                Err(err) => {
                    warn!("Failed to listen for Ctrl+C: {}", err);
                    terminate().await;
                    "SIGTERM"
                }
            },
            () = terminate() => "SIGTERM",
        };
        info!("{} received, stopping virtual users", signal_name);
        drop(shutdown_tx.send(()));
    })
}

#[cfg(unix)]
async fn terminate() {
    use tokio::signal::unix::{SignalKind, signal};

    match signal(SignalKind::terminate()) {
        Ok(mut term) => {
            term.recv().await;
        }
        Err(err) => {
            warn!("Failed to register SIGTERM handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate() {
    std::future::pending::<()>().await;
}
