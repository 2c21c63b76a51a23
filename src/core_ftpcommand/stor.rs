use std::sync::Arc;

use log::{info, warn};
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::config::Config;
use crate::core_ftpcommand::utils::{await_transfer_reply, construct_path, ipc_io_error};
use crate::core_transfer::envelope::{CommandCode, CommandFrame};
use crate::helpers::{sanitize_input, send_response};
use crate::ipc::ControllerLink;
use crate::session::FtpSession;

/// Handles the STOR (Store File) FTP command.
///
/// Mirror of RETR: the upload engine drains the data connection into the
/// resolved path until the client closes its side.
pub async fn handle_stor_command(
    writer: Arc<Mutex<TcpStream>>,
    config: Arc<Config>,
    session: Arc<Mutex<FtpSession>>,
    link: Arc<Mutex<ControllerLink>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        warn!("STOR command received with no arguments");
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        return Ok(());
    }

    let path = construct_path(&config, &sanitize_input(&arg));
    info!("STOR {:?}", path);

    let mut link = link.lock().await;
    let connect = link
        .request(CommandFrame::request(CommandCode::TryConnectReq))
        .await
        .map_err(ipc_io_error)?;
    if !connect.status {
        send_response(&writer, b"425 Can't open data connection.\r\n").await?;
        return Ok(());
    }

    send_response(&writer, b"150 File status okay; about to open data connection.\r\n").await?;

    link.notify(CommandFrame::request_with(
        CommandCode::FileUploadReq,
        path.to_string_lossy(),
    ))
    .await
    .map_err(ipc_io_error)?;

    let (reply, aborted) = await_transfer_reply(&writer, &session, &mut link).await?;
    if aborted {
        send_response(&writer, b"426 Connection closed; transfer aborted.\r\n").await?;
        send_response(&writer, b"226 Abort successful.\r\n").await?;
    } else if reply.status {
        let response = format!("226 {}\r\n", reply.content);
        send_response(&writer, response.as_bytes()).await?;
    } else {
        send_response(&writer, b"426 Connection closed; transfer aborted.\r\n").await?;
    }
    Ok(())
}
