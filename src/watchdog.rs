use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::constants::WATCHDOG_INTERVAL_SECS;
use crate::session::SessionManager;

/// Periodically walks the session registry: logs what each live session is
/// doing and evicts the dead ones. This is the concurrent reader the
/// per-session lock exists for, so a busy session is skipped rather than
/// waited on.
pub fn start_watchdog(manager: Arc<Mutex<SessionManager>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(WATCHDOG_INTERVAL_SECS));
        loop {
            ticker.tick().await;

            let mut manager = manager.lock().await;
            let before = manager.len();
            manager.retain(|peer, session| match session.try_lock() {
                Ok(session) => {
                    if !session.conn.alive {
                        return false;
                    }
                    info!(
                        "session {}: data connection {}, abort {}",
                        peer,
                        if session.conn.data_stream.is_some() {
                            "open"
                        } else {
                            "closed"
                        },
                        if session.abort_pending() {
                            "pending"
                        } else {
                            "clear"
                        }
                    );
                    true
                }
                // mid-transfer, the worker holds the lock
                Err(_) => true,
            });
            let evicted = before - manager.len();
            if evicted > 0 {
                info!("watchdog evicted {} dead session(s)", evicted);
            }
        }
    })
}
