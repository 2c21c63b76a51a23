use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::{Context, Result};
use log::warn;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::core_ftpcommand::handlers::initialize_command_handlers;
use crate::core_log::logger::log_message;
use crate::core_transfer::worker::TransferWorker;
use crate::helpers::send_response;
use crate::ipc::{self, ControllerLink};
use crate::session::{FtpSession, SessionManager};
use crate::watchdog;

pub async fn run(config: Config) -> Result<()> {
    let config = Arc::new(config);
    let manager = Arc::new(Mutex::new(SessionManager::new()));
    watchdog::start_watchdog(Arc::clone(&manager));
    start_server(config, manager).await
}

pub async fn start_server(config: Arc<Config>, manager: Arc<Mutex<SessionManager>>) -> Result<()> {
    let listener = TcpListener::bind(format!("0.0.0.0:{}", config.server.listen_port))
        .await
        .with_context(|| {
            format!(
                "Failed to bind control listener on port {}",
                config.server.listen_port
            )
        })?;
    log_message(&format!(
        "Server listening on port {}",
        config.server.listen_port
    ));

    loop {
        let (socket, addr) = listener.accept().await?;
        log_message(&format!("New connection from {:?}", addr));

        // the address PASV advertises: the server side of the connection
        // the client already reached us on
        let local_ip = advertised_ip(&socket, &config);

        let session = Arc::new(Mutex::new(FtpSession::new(local_ip, config.data_timeout())));
        manager.lock().await.insert(addr, Arc::clone(&session));

        let (controller, worker_link) = ipc::link();
        TransferWorker::new(Arc::clone(&session), worker_link).spawn();

        let config = Arc::clone(&config);
        let manager = Arc::clone(&manager);
        let session_for_cleanup = Arc::clone(&session);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, config, session, controller).await {
                log_message(&format!("Connection error: {:?}", e));
            }
            session_for_cleanup.lock().await.conn.alive = false;
            manager.lock().await.remove(&addr);
            log_message(&format!("Connection closed for {:?}", addr));
        });
    }
}

fn advertised_ip(socket: &TcpStream, config: &Config) -> Ipv4Addr {
    match socket.local_addr() {
        Ok(SocketAddr::V4(addr)) => *addr.ip(),
        _ => match config.server.pasv_address.parse::<IpAddr>() {
            Ok(IpAddr::V4(ip)) => ip,
            _ => {
                warn!("no usable IPv4 address to advertise, falling back to loopback");
                Ipv4Addr::LOCALHOST
            }
        },
    }
}

pub async fn handle_connection(
    socket: TcpStream,
    config: Arc<Config>,
    session: Arc<Mutex<FtpSession>>,
    link: ControllerLink,
) -> Result<()> {
    let socket = Arc::new(Mutex::new(socket));
    let link = Arc::new(Mutex::new(link));
    send_response(&socket, b"220 ferroftpd ready.\r\n").await?;

    let handlers = initialize_command_handlers();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        {
            let mut locked_socket = socket.lock().await;
            let mut reader = BufReader::new(&mut *locked_socket);
            let n = reader.read_line(&mut buffer).await?;
            drop(locked_socket);

            if n == 0 {
                log_message("Client disconnected unexpectedly");
                break;
            }
        }

        let command = buffer.trim();
        if command.is_empty() {
            continue;
        }
        log_message(&format!("Received command: {}", command));

        let mut parts = command.splitn(2, ' ');
        let cmd = parts.next().unwrap_or_default();
        let arg = parts.next().unwrap_or_default().trim().to_string();

        match FtpCommand::from_str(cmd) {
            Some(cmd) => {
                // every registered command has a handler
                if let Some(handler) = handlers.get(&cmd) {
                    if let Err(e) = handler(
                        Arc::clone(&socket),
                        Arc::clone(&config),
                        Arc::clone(&session),
                        Arc::clone(&link),
                        arg,
                    )
                    .await
                    {
                        log_message(&format!("Error handling command {:?}: {:?}", cmd, e));
                        break;
                    }
                }
            }
            None => {
                send_response(&socket, b"502 Command not implemented.\r\n").await?;
            }
        }

        if !session.lock().await.conn.alive {
            break;
        }
    }

    session.lock().await.conn.alive = false;
    Ok(())
}
