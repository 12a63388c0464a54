mod access;
mod config;
mod relay;
mod socket;
mod transport;

pub use access::*;
pub use config::*;
pub use relay::*;
pub use socket::*;
pub use transport::*;
