//! Signal handling for graceful shutdown

use futures::{future::pending, stream::StreamExt};
use signal_hook_tokio::Signals;
use tracing::{info, warn};

/// Wait for SIGTERM or SIGINT and return which one arrived.
///
/// Never resolves if the handler cannot be installed.
pub async fn shutdown_signal() -> i32 {
    let mut signals = match Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ]) {
        Ok(signals) => signals,
        Err(e) => {
            warn!("Failed to install signal handler, Ctrl-C will not stop the timer cleanly: {}", e);
            return pending().await;
        }
    };

    match signals.next().await {
        Some(signal) => {
            info!("Received signal: {}", signal);
            signal
        }
        None => pending().await,
    }
}
