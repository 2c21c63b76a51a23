//! Upload engine: stream the client data socket into a local file.

use std::io::ErrorKind;
use std::sync::Arc;

use log::{error, info};
use tokio::io::AsyncWriteExt;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;

use crate::constants::{MSG_TRANSFER_FAIL, POLL_INTERVAL, TRANSFER_CHUNK_SIZE};
use crate::core_transfer::envelope::{CommandCode, CommandFrame, Envelope};
use crate::core_transfer::reply;
use crate::session::FtpSession;

/// Handles a file-upload request whose payload is the destination path.
///
/// Mirror of the download engine with the direction reversed: poll the data
/// socket readable, append what arrives to the file. End-of-stream is the
/// client closing its side (a zero-byte read); a `WouldBlock` after a
/// readiness event is a spurious wakeup and just means poll again.
pub async fn transfer(
    session: &Arc<Mutex<FtpSession>>,
    reply_tx: &mpsc::Sender<Envelope>,
    frame: CommandFrame,
) {
    let path = frame.content.trim().to_string();
    let (status, content) = run(session, &path).await;

    session.lock().await.conn.take_data_stream();

    let frame = CommandFrame::response(CommandCode::FileUploadRes, status, content);
    reply::reply_controller(reply_tx, frame).await;
}

async fn run(session: &Arc<Mutex<FtpSession>>, path: &str) -> (bool, String) {
    let mut file = match tokio::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .await
    {
        Ok(file) => file,
        Err(e) => {
            error!("upload: failed to open {}: {}", path, e);
            return (false, MSG_TRANSFER_FAIL.to_string());
        }
    };

    let Some(stream) = session.lock().await.conn.data_stream.clone() else {
        error!("upload: no data connection is open");
        return (false, MSG_TRANSFER_FAIL.to_string());
    };
    let abort = session.lock().await.abort_token();

    let mut total: u64 = 0;
    let mut buf = vec![0u8; TRANSFER_CHUNK_SIZE];
    let stream = stream.lock().await;

    loop {
        if abort.is_cancelled() {
            session.lock().await.take_abort();
            info!("upload: transfer aborted at {} bytes", total);
            return (false, MSG_TRANSFER_FAIL.to_string());
        }

        match timeout(POLL_INTERVAL, stream.readable()).await {
            Err(_) => continue,
            Ok(Err(e)) => {
                error!("upload: data socket failed: {}", e);
                return (false, MSG_TRANSFER_FAIL.to_string());
            }
            Ok(Ok(())) => match stream.try_read(&mut buf) {
                // client closed its side: the stream is complete
                Ok(0) => break,
                Ok(n) => {
                    if let Err(e) = file.write_all(&buf[..n]).await {
                        error!("upload: write to {} failed: {}", path, e);
                        return (false, MSG_TRANSFER_FAIL.to_string());
                    }
                    total += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::WouldBlock => continue,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    error!("upload: read from data socket failed: {}", e);
                    return (false, MSG_TRANSFER_FAIL.to_string());
                }
            },
        }
    }

    if let Err(e) = file.flush().await {
        error!("upload: flush of {} failed: {}", path, e);
        return (false, MSG_TRANSFER_FAIL.to_string());
    }

    info!("upload: transfer ok, {} bytes", total);
    (true, format!("Transfer complete. Total {} bytes.", total))
}
