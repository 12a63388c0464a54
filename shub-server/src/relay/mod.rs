mod connection;
mod relay_command;
mod relay_error;

pub use connection::*;
pub use relay_command::*;
pub use relay_error::*;
