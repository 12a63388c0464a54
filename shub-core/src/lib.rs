pub mod error;
pub mod model;

pub use error::ProtocolError;
pub use model::{ConnectionId, DistanceMatrix, Envelope, PeerId, RelayMessage};
