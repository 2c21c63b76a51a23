use std::sync::Arc;

use log::info;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::helpers::send_response;
use crate::session::FtpSession;

/// Handles an ABOR that arrives between transfers.
///
/// The abort signal is raised out-of-band on the session rather than queued
/// to the worker, so an in-flight transfer would also see it; an ABOR mid-
/// transfer is intercepted by the RETR/STOR wait loop instead of here.
pub async fn handle_abor_command(
    writer: Arc<Mutex<TcpStream>>,
    session: Arc<Mutex<FtpSession>>,
    _arg: String,
) -> Result<(), std::io::Error> {
    info!("ABOR received");
    session.lock().await.request_abort();
    send_response(&writer, b"226 ABOR command successful.\r\n").await
}
