use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;

/// Handles the TYPE FTP command.
///
/// Every transfer here moves raw bytes, so ASCII and Image are both
/// acknowledged without changing behavior.
pub async fn handle_type_command(
    writer: Arc<Mutex<TcpStream>>,
    arg: String,
) -> Result<(), std::io::Error> {
    let primary = arg
        .split_whitespace()
        .next()
        .map(|s| s.to_ascii_uppercase())
        .unwrap_or_default();

    let response: &[u8] = match primary.as_str() {
        "A" => b"200 Type set to A\r\n",
        "I" => b"200 Type set to I\r\n",
        _ => b"504 Command not implemented for that parameter.\r\n",
    };
    send_response(&writer, response).await
}
