use crate::relay::ConnectionState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("invalid room target: {0}")]
    InvalidRoomTarget(String),

    #[error("`{key}` requires a room")]
    MissingRoom { key: String },

    #[error("connection is {0:?}, room operations need an active connection")]
    NotActive(ConnectionState),

    #[error("malformed relay frame: {0}")]
    Decode(String),

    #[error("failed to encode relay frame: {0}")]
    Encode(#[from] serde_json::Error),
}
