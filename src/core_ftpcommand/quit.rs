use std::sync::Arc;

use log::info;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::session::FtpSession;

/// Handles the QUIT FTP command.
///
/// Clears the session liveness flag; the transfer worker notices on its next
/// poll and shuts down, and the control loop exits after this response.
pub async fn handle_quit_command(
    writer: Arc<Mutex<TcpStream>>,
    session: Arc<Mutex<FtpSession>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    info!("client is quitting the session");
    session.lock().await.conn.alive = false;
    send_response(&writer, b"221 Service closing control connection.\r\n").await
}
