use std::sync::Arc;

use log::info;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;

/// Handles the USER FTP command.
///
/// Authentication is not this server's concern; any user name is accepted
/// and waved through to PASS.
pub async fn handle_user_command(
    writer: Arc<Mutex<TcpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    info!("USER {}", arg.trim());
    send_response(&writer, b"331 User name okay, need password.\r\n").await
}
