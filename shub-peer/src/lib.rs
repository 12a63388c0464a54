mod error;
mod peer;
pub mod protocol;
mod relay_client;
mod room;
pub mod store;
mod transport;
mod volume;

pub use error::*;
pub use peer::*;
pub use protocol::PeerProtocol;
pub use relay_client::*;
pub use room::*;
pub use transport::*;
pub use volume::*;
