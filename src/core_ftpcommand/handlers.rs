use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::Mutex as TokioMutex;

use crate::config::Config;
use crate::core_ftpcommand::ftpcommand::FtpCommand;
use crate::ipc::ControllerLink;
use crate::session::FtpSession;

type CommandHandler = Box<
    dyn Fn(
            Arc<TokioMutex<TcpStream>>,
            Arc<Config>,
            Arc<TokioMutex<FtpSession>>,
            Arc<TokioMutex<ControllerLink>>, // Link to the transfer worker
            String,                          // Command argument
        ) -> Pin<Box<dyn Future<Output = Result<(), std::io::Error>> + Send>>
        + Send
        + Sync,
>;

pub fn initialize_command_handlers() -> HashMap<FtpCommand, Arc<CommandHandler>> {
    let mut handlers: HashMap<FtpCommand, Arc<CommandHandler>> = HashMap::new();

    handlers.insert(
        FtpCommand::USER,
        Arc::new(Box::new(|writer, _config, _session, _link, arg| {
            Box::pin(crate::core_ftpcommand::user::handle_user_command(
                writer, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::PASS,
        Arc::new(Box::new(|writer, _config, _session, _link, arg| {
            Box::pin(crate::core_ftpcommand::pass::handle_pass_command(
                writer, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::SYST,
        Arc::new(Box::new(|writer, _config, _session, _link, _arg| {
            Box::pin(crate::core_ftpcommand::syst::handle_syst_command(writer))
        })),
    );

    handlers.insert(
        FtpCommand::TYPE,
        Arc::new(Box::new(|writer, _config, _session, _link, arg| {
            Box::pin(crate::core_ftpcommand::type_::handle_type_command(
                writer, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::NOOP,
        Arc::new(Box::new(|writer, _config, _session, _link, arg| {
            Box::pin(crate::core_ftpcommand::noop::handle_noop_command(
                writer, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::QUIT,
        Arc::new(Box::new(|writer, _config, session, _link, arg| {
            Box::pin(crate::core_ftpcommand::quit::handle_quit_command(
                writer, session, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::PASV,
        Arc::new(Box::new(|writer, _config, _session, link, arg| {
            Box::pin(crate::core_ftpcommand::pasv::handle_pasv_command(
                writer, link, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::PORT,
        Arc::new(Box::new(|writer, _config, _session, link, arg| {
            Box::pin(crate::core_ftpcommand::port::handle_port_command(
                writer, link, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::RETR,
        Arc::new(Box::new(|writer, config, session, link, arg| {
            Box::pin(crate::core_ftpcommand::retr::handle_retr_command(
                writer, config, session, link, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::STOR,
        Arc::new(Box::new(|writer, config, session, link, arg| {
            Box::pin(crate::core_ftpcommand::stor::handle_stor_command(
                writer, config, session, link, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::ABOR,
        Arc::new(Box::new(|writer, _config, session, _link, arg| {
            Box::pin(crate::core_ftpcommand::abor::handle_abor_command(
                writer, session, arg,
            ))
        })),
    );

    handlers.insert(
        FtpCommand::SITE,
        Arc::new(Box::new(|writer, _config, _session, link, arg| {
            Box::pin(crate::core_ftpcommand::site::handle_site_command(
                writer, link, arg,
            ))
        })),
    );

    handlers
}
