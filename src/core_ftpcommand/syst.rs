use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;

/// Handles the SYST (System) FTP command.
pub async fn handle_syst_command(writer: Arc<Mutex<TcpStream>>) -> Result<(), std::io::Error> {
    send_response(&writer, b"215 UNIX Type: L8\r\n").await
}
