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

/// Handles the RETR (Retrieve) FTP command.
///
/// Establishes the data connection in whichever mode was negotiated, then
/// hands the resolved path to the download engine and reports its outcome.
/// While the transfer runs, the control connection is watched for ABOR.
pub async fn handle_retr_command(
    writer: Arc<Mutex<TcpStream>>,
    config: Arc<Config>,
    session: Arc<Mutex<FtpSession>>,
    link: Arc<Mutex<ControllerLink>>,
    arg: String,
) -> Result<(), std::io::Error> {
    if arg.trim().is_empty() {
        warn!("RETR command received with no arguments");
        send_response(&writer, b"501 Syntax error in parameters or arguments.\r\n").await?;
        return Ok(());
    }

    let path = construct_path(&config, &sanitize_input(&arg));
    info!("RETR {:?}", path);

    let mut link = link.lock().await;
    let connect = link
        .request(CommandFrame::request(CommandCode::TryConnectReq))
        .await
        .map_err(ipc_io_error)?;
    if !connect.status {
        send_response(&writer, b"425 Can't open data connection.\r\n").await?;
        return Ok(());
    }

    send_response(&writer, b"150 Opening data connection.\r\n").await?;

    link.notify(CommandFrame::request_with(
        CommandCode::FileDownloadReq,
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
