//! Download engine: stream a local file to the client data socket.

use std::io::ErrorKind;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;

use crate::constants::{MSG_TRANSFER_FAIL, POLL_INTERVAL, TRANSFER_CHUNK_SIZE};
use crate::core_transfer::envelope::{CommandCode, CommandFrame, Envelope};
use crate::core_transfer::reply;
use crate::core_transfer::zerocopy;
use crate::session::FtpSession;

/// Handles a file-download request whose payload is a filesystem path.
///
/// Runs the streaming loop, then closes the data socket and reports the
/// outcome to the controller. The socket and the file handle are released on
/// every exit path, abort included.
pub async fn transfer(
    session: &Arc<Mutex<FtpSession>>,
    reply_tx: &mpsc::Sender<Envelope>,
    frame: CommandFrame,
) {
    let path = frame.content.trim().to_string();
    let (status, content) = run(session, &path).await;

    // single release point for the data socket, whatever the loop did
    session.lock().await.conn.take_data_stream();

    let frame = CommandFrame::response(CommandCode::FileDownloadRes, status, content);
    reply::reply_controller(reply_tx, frame).await;
}

async fn run(session: &Arc<Mutex<FtpSession>>, path: &str) -> (bool, String) {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) => meta,
        Err(_) => {
            warn!("download: {} does not exist", path);
            return (false, MSG_TRANSFER_FAIL.to_string());
        }
    };

    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("download: failed to open {}: {}", path, e);
            return (false, MSG_TRANSFER_FAIL.to_string());
        }
    };

    let Some(stream) = session.lock().await.conn.data_stream.clone() else {
        warn!("download: no data connection is open");
        return (false, MSG_TRANSFER_FAIL.to_string());
    };
    let abort = session.lock().await.abort_token();

    let size = meta.len();
    let mut sent: u64 = 0;
    let stream = stream.lock().await;

    loop {
        if sent == size {
            break;
        }

        if abort.is_cancelled() {
            session.lock().await.take_abort();
            info!("download: transfer aborted at {} of {} bytes", sent, size);
            return (false, MSG_TRANSFER_FAIL.to_string());
        }

        match timeout(POLL_INTERVAL, stream.writable()).await {
            // quiet socket, go back around to re-check the abort signal
            Err(_) => continue,
            Ok(Err(e)) => {
                error!("download: data socket failed: {}", e);
                return (false, MSG_TRANSFER_FAIL.to_string());
            }
            Ok(Ok(())) => {
                let chunk = TRANSFER_CHUNK_SIZE.min((size - sent) as usize);
                match zerocopy::file_to_socket(&stream, &file, chunk) {
                    Ok(0) => {
                        // the file shrank underneath us; what was sent is all
                        // there is
                        warn!("download: source ended early at {} bytes", sent);
                        break;
                    }
                    Ok(n) => sent += n as u64,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                    Err(e) => {
                        error!("download: transfer failed: {}", e);
                        return (false, MSG_TRANSFER_FAIL.to_string());
                    }
                }
            }
        }
    }

    info!("download: transfer ok, {} bytes", sent);
    (true, format!("Transfer complete. Total {} bytes.", sent))
}
