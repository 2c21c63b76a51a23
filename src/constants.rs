// src/constants.rs

use std::time::Duration;

/// Bounded wait used by the transfer worker when polling the command channel
/// and the data socket.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Bytes moved per transfer call in the streaming engines.
pub const TRANSFER_CHUNK_SIZE: usize = 4096;

/// Capacity of the controller/worker command and reply channels.
pub const IPC_CHANNEL_CAPACITY: usize = 32;

/// Default deadline for accepting or dialing a data connection, seconds.
pub const DEFAULT_DATA_TIMEOUT_SECS: u64 = 30;

/// Seconds between watchdog sweeps over the session registry.
pub const WATCHDOG_INTERVAL_SECS: u64 = 30;

/// Generic failure text surfaced to the controller for any failed transfer.
pub const MSG_TRANSFER_FAIL: &str = "Transfer fail.";
