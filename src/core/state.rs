//! Process lifecycle state.
//!
//! A running watch session registers a channel so Ctrl+C can stop its
//! dispatch loop and take the dev server down cleanly.

use std::sync::OnceLock;

use tokio::sync::mpsc::UnboundedSender;

/// Shutdown signal sender for the watch session
static SHUTDOWN_TX: OnceLock<UnboundedSender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_session()`: exit immediately, nothing to tear down
/// - After `register_session()`: notify the session and let it stop the bundler
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| match SHUTDOWN_TX.get() {
        Some(tx) => {
            crate::log!("serve"; "shutting down...");
            let _ = tx.send(());
        }
        None => std::process::exit(0),
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the running watch session for graceful shutdown
pub fn register_session(shutdown_tx: UnboundedSender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}
