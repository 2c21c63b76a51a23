use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;

use crate::config::Config;
use crate::constants::POLL_INTERVAL;
use crate::core_transfer::envelope::CommandFrame;
use crate::ipc::{ControllerLink, IpcError};
use crate::session::FtpSession;

/// Constructs the on-disk path for a transfer argument inside the server's
/// chroot directory.
pub fn construct_path(config: &Config, sanitized_arg: &str) -> PathBuf {
    PathBuf::from(&config.server.chroot_dir)
        .join(config.server.min_homedir.trim_start_matches('/'))
        .join(sanitized_arg)
}

pub fn ipc_io_error(e: IpcError) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, e)
}

/// Waits for a streaming transfer's response while watching the control
/// connection for an out-of-band ABOR.
///
/// The worker only observes an abort between chunks, so all this has to do
/// is flag the session; the transfer then ends on its own and its failure
/// response arrives here. Returns the response frame and whether the client
/// aborted. A control connection that goes away counts as an abort.
pub async fn await_transfer_reply(
    writer: &Arc<Mutex<TcpStream>>,
    session: &Arc<Mutex<FtpSession>>,
    link: &mut ControllerLink,
) -> Result<(CommandFrame, bool), std::io::Error> {
    let mut aborted = false;
    loop {
        if let Ok(reply) = timeout(POLL_INTERVAL, link.recv()).await {
            return Ok((reply.map_err(ipc_io_error)?, aborted));
        }

        let mut buf = [0u8; 128];
        let read = {
            let socket = writer.lock().await;
            match socket.try_read(&mut buf) {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => continue,
                Err(e) => return Err(e),
            }
        };
        if read == 0 {
            // client hung up mid-transfer
            session.lock().await.request_abort();
            aborted = true;
        } else if String::from_utf8_lossy(&buf[..read])
            .to_ascii_uppercase()
            .contains("ABOR")
        {
            session.lock().await.request_abort();
            aborted = true;
        }
    }
}
