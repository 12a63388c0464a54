use crate::model::connection::ConnectionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const JOIN_KEY: &str = "shub.join";
pub const LEAVE_KEY: &str = "shub.leave";
pub const LEAVE_ALL_KEY: &str = "shub.leave_all";
pub const MOVE_KEY: &str = "shub.move";
pub const DISCONNECT_KEY: &str = "shub.disconnect";
pub const RESPONSE_MESSAGE_KEY: &str = "response:message";
pub const CONNECTED_KEY: &str = "connected";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RelayOptions>,
}

impl RelayMessage {
    pub fn new(key: impl Into<String>, value: Option<Value>) -> Self {
        Self {
            key: key.into(),
            value,
            options: None,
        }
    }

    pub fn with_room(mut self, room: RoomTarget) -> Self {
        self.options = Some(RelayOptions { room: Some(room) });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomTarget>,
}

/// `true` fans out to every joined room, `false` suppresses delivery, a string
/// names a single room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoomTarget {
    Flag(bool),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayBucket {
    pub key: String,
    pub value: Value,
}

impl RelayBucket {
    pub fn new(key: impl Into<String>, value: impl Serialize) -> Result<Self, serde_json::Error> {
        Ok(Self {
            key: key.into(),
            value: serde_json::to_value(value)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MembershipNotice {
    pub id: ConnectionId,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisconnectNotice {
    pub id: ConnectionId,
}
