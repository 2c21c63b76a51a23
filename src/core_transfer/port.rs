//! Active-mode standby: record where the client is listening.

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::{mpsc, Mutex};

use crate::core_transfer::addr;
use crate::core_transfer::envelope::{CommandCode, CommandFrame, Envelope};
use crate::core_transfer::reply;
use crate::session::{ConnectionMode, FtpSession};

/// Handles a PORT-standby request whose payload is the raw PORT argument.
///
/// Stores the parsed peer endpoint on the session without opening anything;
/// the connect happens later, on try-connect. A malformed argument is
/// rejected rather than stored.
pub async fn standby(
    session: &Arc<Mutex<FtpSession>>,
    reply_tx: &mpsc::Sender<Envelope>,
    frame: CommandFrame,
) {
    let response = match addr::parse_port_argument(&frame.content) {
        Err(e) => {
            warn!("rejecting PORT argument: {}", e);
            CommandFrame::response(CommandCode::PortStandbyRes, false, e.to_string())
        }
        Ok((peer_ip, peer_port)) => {
            let mut session = session.lock().await;
            session.conn.peer_ip = peer_ip;
            session.conn.peer_port = peer_port;
            // arming active mode also drops any stale passive listener
            match session.conn.create(ConnectionMode::Active).await {
                Err(e) => {
                    CommandFrame::response(CommandCode::PortStandbyRes, false, e.to_string())
                }
                Ok(()) => {
                    info!("active standby armed for {}", session.conn.peer_socket_addr());
                    CommandFrame::response(CommandCode::PortStandbyRes, true, "PORT SUCCESS")
                }
            }
        }
    };
    reply::reply_controller(reply_tx, response).await;
}
