use crate::relay::RelayError;
use serde::Deserialize;
use serde_json::Value;
use shub_core::model::{JOIN_KEY, LEAVE_ALL_KEY, LEAVE_KEY, MOVE_KEY, RelayMessage};

#[derive(Debug, Clone, PartialEq)]
pub enum RelayCommand {
    LeaveAll,
    Leave { room: String },
    Join(RoomSelector),
    Move(RoomSelector),
    /// Application message as received, unknown fields included.
    Publish(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomSelector {
    One(String),
    Many(Vec<String>),
}

impl RoomSelector {
    pub fn names(&self) -> &[String] {
        match self {
            Self::One(name) => std::slice::from_ref(name),
            Self::Many(names) => names,
        }
    }
}

impl From<&str> for RoomSelector {
    fn from(name: &str) -> Self {
        Self::One(name.to_owned())
    }
}

impl TryFrom<&Value> for RoomSelector {
    type Error = RelayError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        match value {
            Value::String(name) => Ok(Self::One(name.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(name) => Ok(name.clone()),
                    other => Err(RelayError::InvalidRoomTarget(other.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Many),
            other => Err(RelayError::InvalidRoomTarget(other.to_string())),
        }
    }
}

impl TryFrom<Value> for RelayCommand {
    type Error = RelayError;

    fn try_from(frame: Value) -> Result<Self, Self::Error> {
        let message = RelayMessage::deserialize(&frame)
            .map_err(|e| RelayError::Decode(e.to_string()))?;

        match message.key.as_str() {
            LEAVE_ALL_KEY => Ok(Self::LeaveAll),
            LEAVE_KEY => match room_of(&message)? {
                Value::String(room) => Ok(Self::Leave { room: room.clone() }),
                other => Err(RelayError::InvalidRoomTarget(other.to_string())),
            },
            JOIN_KEY => RoomSelector::try_from(room_of(&message)?).map(Self::Join),
            MOVE_KEY => RoomSelector::try_from(room_of(&message)?).map(Self::Move),
            _ => Ok(Self::Publish(frame)),
        }
    }
}

fn room_of(message: &RelayMessage) -> Result<&Value, RelayError> {
    message
        .value
        .as_ref()
        .and_then(|v| v.get("room"))
        .ok_or_else(|| RelayError::MissingRoom {
            key: message.key.clone(),
        })
}
