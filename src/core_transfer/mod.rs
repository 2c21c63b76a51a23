//! The data-channel engine: everything that happens on the second socket.
//!
//! The controller owns the client's command socket and forwards data-channel
//! work to a per-session [`worker::TransferWorker`] over the in-process link
//! in [`crate::ipc`]. The worker negotiates passive or active mode, opens
//! the data connection and runs the streaming engines against the client.

pub mod addr;
pub mod contact;
pub mod download;
pub mod envelope;
pub mod pasv;
pub mod port;
pub mod reply;
pub mod sendcmd;
pub mod upload;
pub mod worker;
pub mod zerocopy;

#[cfg(test)]
mod test_transfer;
