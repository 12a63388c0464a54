use crate::store::StoreError;
use shub_core::{PeerId, ProtocolError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PeerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error("room is not joined")]
    NotJoined,
    #[error("unknown peer: {0}")]
    UnknownPeer(PeerId),
    #[error("volume out of range (0 to 1.0): {0}")]
    VolumeOutOfRange(f64),
    #[error("cannot call {0} on connect message handler")]
    MembershipInConnectHandler(String),
    #[error("malformed relay frame: {0}")]
    MalformedFrame(String),
}
