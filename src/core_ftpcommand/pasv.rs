use std::sync::Arc;

use log::debug;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::ipc_io_error;
use crate::core_transfer::envelope::{CommandCode, CommandFrame};
use crate::helpers::send_response;
use crate::ipc::ControllerLink;

/// Handles the PASV FTP command by asking the transfer worker to arm a
/// passive listener and relaying its canonical reply to the client.
pub async fn handle_pasv_command(
    writer: Arc<Mutex<TcpStream>>,
    link: Arc<Mutex<ControllerLink>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    let reply = link
        .lock()
        .await
        .request(CommandFrame::request(CommandCode::PasvStandbyReq))
        .await
        .map_err(ipc_io_error)?;

    if reply.status {
        debug!("PASV standby ready: {}", reply.content);
        let response = format!("227 {}\r\n", reply.content);
        send_response(&writer, response.as_bytes()).await
    } else {
        send_response(&writer, b"425 Can't open data connection.\r\n").await
    }
}
