use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "ferroftpd", about = "An FTP data-channel server written in Rust.")]
pub struct Cli {
    /// Path to the configuration file
    #[structopt(short, long, default_value = "")]
    pub config: String,

    /// Override the control-channel listen port from the configuration
    #[structopt(short, long)]
    pub listen_port: Option<u16>,
}
