//! Connection establishment for whichever mode the negotiators armed.

use std::sync::Arc;

use log::{error, info};
use tokio::sync::{mpsc, Mutex};

use crate::core_transfer::envelope::{CommandCode, CommandFrame, Envelope};
use crate::core_transfer::reply;
use crate::session::FtpSession;

/// Handles a try-connect request: accept for passive, connect for active.
/// This is the step that produces a usable data socket for the streaming
/// engines.
pub async fn try_contact(session: &Arc<Mutex<FtpSession>>, reply_tx: &mpsc::Sender<Envelope>) {
    let result = session.lock().await.conn.contact().await;
    let frame = match result {
        Ok(()) => {
            info!("data connection ready");
            CommandFrame::response(
                CommandCode::TryConnectRes,
                true,
                "Data connection established.",
            )
        }
        Err(e) => {
            error!("data connection attempt failed: {}", e);
            CommandFrame::response(
                CommandCode::TryConnectRes,
                false,
                "Failed to establish data connection.",
            )
        }
    };
    reply::reply_controller(reply_tx, frame).await;
}
