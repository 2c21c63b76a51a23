//! Passive-mode standby: bind a listener, advertise where to connect.

use std::sync::Arc;

use log::{error, info};
use tokio::sync::{mpsc, Mutex};

use crate::core_transfer::addr;
use crate::core_transfer::envelope::{CommandCode, CommandFrame, Envelope};
use crate::core_transfer::reply;
use crate::session::{ConnectionMode, FtpSession};

/// Handles a PASV-standby request.
///
/// Arms a passive listener on the session and replies with the canonical
/// `Entering PASV mode (...)` string. The advertised address is the server's
/// address on the control connection, the one the client already trusts; the
/// port is the listener's.
pub async fn standby(session: &Arc<Mutex<FtpSession>>, reply_tx: &mpsc::Sender<Envelope>) {
    let frame = {
        let mut session = session.lock().await;
        match session.conn.create(ConnectionMode::Passive).await {
            Err(e) => {
                error!("passive standby failed: {}", e);
                CommandFrame::response(
                    CommandCode::PasvStandbyRes,
                    false,
                    format!("Create passive session fail: {}", e),
                )
            }
            Ok(()) => match session.conn.listen_port() {
                None => CommandFrame::response(
                    CommandCode::PasvStandbyRes,
                    false,
                    "Create passive session fail: listener has no local address.",
                ),
                Some(port) => {
                    let octets = session.conn.local_ip.octets();
                    let content = addr::format_pasv_reply(octets, port);
                    info!("passive standby armed, advertising {}", content);
                    CommandFrame::response(CommandCode::PasvStandbyRes, true, content)
                }
            },
        }
    };
    reply::reply_controller(reply_tx, frame).await;
}
