use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;

pub async fn handle_noop_command(
    writer: Arc<Mutex<TcpStream>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    send_response(&writer, b"200 NOOP ok.\r\n").await
}
