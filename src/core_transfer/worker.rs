//! The data-channel worker: one per client session.
//!
//! A single sequential task multiplexes two things cooperatively: the
//! command channel from the controller (polled here) and the data socket
//! (polled inside the streaming engines). The bounded poll keeps the worker
//! responsive to the session liveness flag while idle.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use crate::constants::POLL_INTERVAL;
use crate::core_transfer::envelope::{
    CommandCode, Endpoint, Envelope, EnvelopeBody, ProtocolError,
};
use crate::core_transfer::{contact, download, pasv, port, sendcmd, upload};
use crate::ipc::WorkerLink;
use crate::session::FtpSession;

pub struct TransferWorker {
    session: Arc<Mutex<FtpSession>>,
    link: WorkerLink,
}

impl TransferWorker {
    pub fn new(session: Arc<Mutex<FtpSession>>, link: WorkerLink) -> Self {
        Self { session, link }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Runs for the lifetime of the session. Exits when the controller drops
    /// its end of the link or the liveness flag is cleared, closing the data
    /// socket on the way out.
    pub async fn run(mut self) {
        loop {
            match timeout(POLL_INTERVAL, self.link.cmd_rx.recv()).await {
                Err(_) => {
                    if !self.session.lock().await.conn.alive {
                        break;
                    }
                }
                Ok(None) => break,
                Ok(Some(mut envelope)) => {
                    envelope.source = Endpoint::Controller;
                    if let Err(e) = self.dispatch(envelope).await {
                        // a bad frame costs its own iteration, never the worker
                        warn!("rejected command frame: {}", e);
                    }
                }
            }
        }

        self.session.lock().await.conn.take_data_stream();
        debug!("transfer worker stopped");
    }

    async fn dispatch(&mut self, envelope: Envelope) -> Result<(), ProtocolError> {
        let frame = match &envelope.body {
            EnvelopeBody::Command(frame) => frame.clone(),
            EnvelopeBody::Raw(_) => return Err(ProtocolError::NotJson),
        };

        let session = &self.session;
        let reply_tx = &self.link.reply_tx;
        match frame.code()? {
            CommandCode::PasvStandbyReq => pasv::standby(session, reply_tx).await,
            CommandCode::PortStandbyReq => port::standby(session, reply_tx, frame).await,
            CommandCode::TryConnectReq => contact::try_contact(session, reply_tx).await,
            CommandCode::SendCommandReq => sendcmd::relay(session, reply_tx, envelope).await,
            CommandCode::FileUploadReq => upload::transfer(session, reply_tx, frame).await,
            CommandCode::FileDownloadReq => download::transfer(session, reply_tx, frame).await,
            CommandCode::AbortReq => {
                // one-way: flag the session and send nothing back
                session.lock().await.request_abort();
            }
            other => return Err(ProtocolError::UnexpectedCommand(other.as_u32())),
        }
        Ok(())
    }
}
