use std::sync::Arc;

use log::info;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::core_ftpcommand::utils::ipc_io_error;
use crate::core_transfer::envelope::{CommandCode, CommandFrame};
use crate::helpers::send_response;
use crate::ipc::ControllerLink;

/// Handles SITE extensions. `SITE ECHO <text>` pushes the text through the
/// command relay onto an open data connection, which makes it a handy probe
/// that the data channel is really wired up.
pub async fn handle_site_command(
    writer: Arc<Mutex<TcpStream>>,
    link: Arc<Mutex<ControllerLink>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let mut parts = arg.splitn(2, ' ');
    let subcommand = parts.next().unwrap_or_default().to_ascii_uppercase();
    let rest = parts.next().unwrap_or_default();

    match subcommand.as_str() {
        "ECHO" => {
            info!("SITE ECHO over the data channel");
            let reply = link
                .lock()
                .await
                .request(CommandFrame::request_with(CommandCode::SendCommandReq, rest))
                .await
                .map_err(ipc_io_error)?;
            if reply.status {
                send_response(&writer, b"200 Command okay.\r\n").await
            } else {
                send_response(&writer, b"425 Can't open data connection.\r\n").await
            }
        }
        _ => send_response(&writer, b"504 Command not implemented for that parameter.\r\n").await,
    }
}
