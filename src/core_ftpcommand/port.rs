use std::sync::Arc;

use log::info;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::ipc_io_error;
use crate::core_transfer::envelope::{CommandCode, CommandFrame};
use crate::helpers::send_response;
use crate::ipc::ControllerLink;

/// Handles the PORT (Active Mode) FTP command.
///
/// The raw argument goes to the transfer worker untouched; the worker owns
/// the parsing and byte layout.
pub async fn handle_port_command(
    writer: Arc<Mutex<TcpStream>>,
    link: Arc<Mutex<ControllerLink>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let reply = link
        .lock()
        .await
        .request(CommandFrame::request_with(CommandCode::PortStandbyReq, arg))
        .await
        .map_err(ipc_io_error)?;

    if reply.status {
        info!("PORT standby armed");
        send_response(&writer, b"200 PORT SUCCESS\r\n").await
    } else {
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await
    }
}
