mod check_config;
mod init;
mod serve;

pub use check_config::cmd_check_config;
pub use init::cmd_init;
pub use serve::cmd_serve;
