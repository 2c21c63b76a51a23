#[derive(Eq, Hash, PartialEq, Debug)]
pub enum FtpCommand {
    USER,
    PASS,
    SYST,
    TYPE,
    NOOP,
    QUIT,
    PASV,
    PORT,
    RETR,
    STOR,
    ABOR,
    SITE,
}

impl FtpCommand {
    pub fn from_str(cmd: &str) -> Option<FtpCommand> {
        match cmd.to_ascii_uppercase().as_str() {
            "USER" => Some(FtpCommand::USER),
            "PASS" => Some(FtpCommand::PASS),
            "SYST" => Some(FtpCommand::SYST),
            "TYPE" => Some(FtpCommand::TYPE),
            "NOOP" => Some(FtpCommand::NOOP),
            "QUIT" => Some(FtpCommand::QUIT),
            "PASV" => Some(FtpCommand::PASV),
            "PORT" => Some(FtpCommand::PORT),
            "RETR" => Some(FtpCommand::RETR),
            "STOR" => Some(FtpCommand::STOR),
            "ABOR" => Some(FtpCommand::ABOR),
            "SITE" => Some(FtpCommand::SITE),
            _ => None,
        }
    }
}
