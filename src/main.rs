mod config;
mod constants;
mod core_cli;
mod core_ftpcommand;
mod core_log;
mod core_transfer;
mod helpers;
mod ipc;
mod server;
mod session;
mod watchdog;

use anyhow::Result;
use env_logger::{Builder, Env};
use std::io::Write;
use structopt::StructOpt;

use crate::core_cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Cli::from_args();

    // Initialize the logger with a custom format
    Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();

    let default_config_path = "/etc/ferroftpd.conf";

    // Load configuration from the TOML file
    let config_path = if args.config.is_empty() {
        default_config_path
    } else {
        args.config.as_str()
    };
    let mut config = helpers::load_config(config_path)?;

    // Override the listen port from the CLI if provided
    if let Some(listen_port) = args.listen_port {
        config.server.listen_port = listen_port;
    }
    helpers::log_config(&config);

    // Run the FTP server
    server::run(config).await
}
