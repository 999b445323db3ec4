// Server loop module
// Accepts connections until shutdown, then drains in-flight requests

use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Serve `listener` until `shutdown` is notified.
///
/// After the signal the listener is closed immediately; open connections get
/// `server.shutdown_timeout` seconds to finish their current requests.
pub async fn run(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> std::io::Result<()> {
    let graceful = GracefulShutdown::new();

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        serve_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = shutdown.notified() => break,
        }
    }

    // Stop accepting before waiting on the stragglers
    drop(listener);

    let grace = Duration::from_secs(state.config.server.shutdown_timeout);
    logger::log_shutdown_started(grace);

    let drained = tokio::time::timeout(grace, graceful.shutdown())
        .await
        .is_ok();
    logger::log_shutdown_complete(drained);

    Ok(())
}
