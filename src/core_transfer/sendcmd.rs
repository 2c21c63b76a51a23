//! Command relay: forward a payload to the client over an open data socket.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::{mpsc, Mutex};

use crate::core_transfer::envelope::{CommandCode, CommandFrame, Envelope};
use crate::core_transfer::reply;
use crate::session::FtpSession;

/// Handles a send-command request by relaying the request envelope verbatim
/// to the client. The response to the controller only says whether a data
/// socket was there to relay to.
pub async fn relay(
    session: &Arc<Mutex<FtpSession>>,
    reply_tx: &mpsc::Sender<Envelope>,
    request: Envelope,
) {
    let stream = session.lock().await.conn.data_stream.clone();
    let frame = match stream {
        None => CommandFrame::response(CommandCode::SendCommandRes, false, ""),
        Some(stream) => match reply::reply_client(&stream, request).await {
            Ok(()) => {
                debug!("relayed command payload to the client");
                CommandFrame::response(CommandCode::SendCommandRes, true, "Executing command.")
            }
            Err(e) => {
                warn!("relay to client failed: {}", e);
                CommandFrame::response(CommandCode::SendCommandRes, false, e.to_string())
            }
        },
    };
    reply::reply_controller(reply_tx, frame).await;
}
