use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;

/// Handles the PASS FTP command. Always succeeds, see USER.
pub async fn handle_pass_command(
    writer: Arc<Mutex<TcpStream>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_response(&writer, b"230 User logged in, proceed.\r\n").await
}
