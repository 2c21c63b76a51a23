// Control-channel commands: the subset needed to drive the data channel.
pub mod abor;
pub mod ftpcommand;
pub mod handlers;
pub mod noop;
pub mod pass;
pub mod pasv;
pub mod port;
pub mod quit;
pub mod retr;
pub mod site;
pub mod stor;
pub mod syst;
pub mod type_;
pub mod user;

// The utils and common functions are here
pub mod utils;
