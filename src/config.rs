use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_DATA_TIMEOUT_SECS;

#[derive(Debug, Deserialize, Serialize)]
pub struct ServerConfig {
    pub listen_port: u16,
    pub pasv_address: String,
    pub chroot_dir: String,
    pub min_homedir: String,
    pub data_timeout_secs: Option<u64>, // Optional to allow default value
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_port: 21,
            pasv_address: String::from("127.0.0.1"),
            chroot_dir: String::from("/var/ftp"),
            min_homedir: String::from("/home/ftp"),
            data_timeout_secs: Some(DEFAULT_DATA_TIMEOUT_SECS),
        }
    }
}

impl Config {
    /// Deadline applied to data-connection accepts and dials.
    pub fn data_timeout(&self) -> Duration {
        Duration::from_secs(
            self.server
                .data_timeout_secs
                .unwrap_or(DEFAULT_DATA_TIMEOUT_SECS),
        )
    }
}
