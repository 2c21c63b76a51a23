//! In-process command/reply link between a control connection and its
//! transfer worker.
//!
//! One bounded channel pair per session. The controller end sends command
//! envelopes and awaits the matching response; the worker end is owned by the
//! dispatcher loop. Dropping either end shuts the worker down cleanly.

use thiserror::Error;
use tokio::sync::mpsc;

use crate::constants::IPC_CHANNEL_CAPACITY;
use crate::core_transfer::envelope::{CommandFrame, Envelope, EnvelopeBody, ProtocolError};

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("transfer worker is gone")]
    Closed,
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// Controller-side handle: sends requests, receives responses.
pub struct ControllerLink {
    cmd_tx: mpsc::Sender<Envelope>,
    reply_rx: mpsc::Receiver<Envelope>,
}

/// Worker-side handle, consumed by the dispatcher loop.
pub struct WorkerLink {
    pub cmd_rx: mpsc::Receiver<Envelope>,
    pub reply_tx: mpsc::Sender<Envelope>,
}

pub fn link() -> (ControllerLink, WorkerLink) {
    let (cmd_tx, cmd_rx) = mpsc::channel(IPC_CHANNEL_CAPACITY);
    let (reply_tx, reply_rx) = mpsc::channel(IPC_CHANNEL_CAPACITY);
    (
        ControllerLink { cmd_tx, reply_rx },
        WorkerLink { cmd_rx, reply_tx },
    )
}

impl ControllerLink {
    /// Sends a request frame and waits for the worker's response frame.
    pub async fn request(&mut self, frame: CommandFrame) -> Result<CommandFrame, IpcError> {
        self.notify(frame).await?;
        self.recv().await
    }

    /// Sends a frame without waiting; abort is the only frame that never
    /// gets a response, but streaming requests can also be sent this way and
    /// collected later with [`ControllerLink::recv`].
    pub async fn notify(&self, frame: CommandFrame) -> Result<(), IpcError> {
        self.cmd_tx
            .send(Envelope::command(frame))
            .await
            .map_err(|_| IpcError::Closed)
    }

    /// Waits for the next response frame from the worker.
    pub async fn recv(&mut self) -> Result<CommandFrame, IpcError> {
        match self.reply_rx.recv().await {
            Some(envelope) => match envelope.body {
                EnvelopeBody::Command(frame) => Ok(frame),
                EnvelopeBody::Raw(_) => Err(ProtocolError::NotJson.into()),
            },
            None => Err(IpcError::Closed),
        }
    }
}
