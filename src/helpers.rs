use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::Mutex;

use crate::config::Config;

/// Sanitizes input to prevent directory traversal attacks and ensure paths are relative.
pub fn sanitize_input(input: &str) -> String {
    let sanitized_input = input.replace("../", "").replace("..\\", "");
    sanitized_input.trim_start_matches('/').to_string()
}

/// Sends a response to the client over the control connection.
pub async fn send_response(
    writer: &Arc<Mutex<TcpStream>>,
    message: &[u8],
) -> Result<(), std::io::Error> {
    let mut writer = writer.lock().await;
    writer.write_all(message).await?;
    Ok(())
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path))?;
    let config: Config = toml::from_str(&config_str)
        .with_context(|| format!("Failed to parse configuration file: {}", path))?;
    Ok(config)
}

// Helper function to log configuration options
pub fn log_config(config: &Config) {
    info!("  Listen Port: {}", config.server.listen_port);
    info!("  PASV Address: {}", config.server.pasv_address);
    info!("  Chroot Directory: {}", config.server.chroot_dir);
    info!("  Minimum Home Directory: {}", config.server.min_homedir);
    info!("  Data Timeout: {}s", config.data_timeout().as_secs());
}
