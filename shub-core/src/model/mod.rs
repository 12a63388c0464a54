mod connection;
pub mod distance;
mod envelope;
mod peer;
mod relay;

pub use connection::ConnectionId;
pub use distance::{DistanceMatrix, FAR_DISTANCE, NEAR_DISTANCE};
pub use envelope::{Envelope, EnvelopeKind};
pub use peer::PeerId;
pub use relay::{
    CONNECTED_KEY, DISCONNECT_KEY, DisconnectNotice, JOIN_KEY, LEAVE_ALL_KEY, LEAVE_KEY,
    MOVE_KEY, MembershipNotice, RESPONSE_MESSAGE_KEY, RelayBucket, RelayMessage, RelayOptions,
    RoomTarget,
};
