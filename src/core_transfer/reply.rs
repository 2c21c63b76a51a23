//! Reply routing: every handler funnels its result through one of these two
//! entry points instead of touching the transport directly.

use std::sync::Arc;

use log::warn;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

use crate::core_transfer::envelope::{CommandFrame, Endpoint, Envelope};

/// Wraps a response frame as a JSON command envelope addressed to the
/// controller and hands it to the reply channel. A closed channel only means
/// the controller hung up; the worker notices on its next poll, so the send
/// result is not surfaced to handlers.
pub async fn reply_controller(reply_tx: &mpsc::Sender<Envelope>, frame: CommandFrame) {
    let mut envelope = Envelope::command(frame);
    envelope.destination = Endpoint::Controller;
    if reply_tx.send(envelope).await.is_err() {
        warn!("controller hung up before the reply could be delivered");
    }
}

/// Addresses an envelope to the client and writes its wire form to the data
/// socket, leaving the content type as the caller set it.
pub async fn reply_client(
    stream: &Arc<Mutex<TcpStream>>,
    mut envelope: Envelope,
) -> std::io::Result<()> {
    envelope.destination = Endpoint::Client;
    let bytes = envelope
        .to_wire()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    let mut stream = stream.lock().await;
    stream.write_all(&bytes).await?;
    stream.flush().await
}
