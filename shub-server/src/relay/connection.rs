use crate::access::{AccessError, AccessGate};
use crate::relay::{RelayCommand, RelayError, RoomSelector};
use crate::transport::{Outbound, RoomIndex};
use serde::Deserialize;
use serde_json::{Value, json};
use shub_core::ConnectionId;
use shub_core::model::{
    CONNECTED_KEY, DISCONNECT_KEY, DisconnectNotice, JOIN_KEY, LEAVE_KEY, MembershipNotice,
    RESPONSE_MESSAGE_KEY, RelayBucket, RoomTarget,
};
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unvalidated,
    Validated,
    Active,
    Disposed,
}

pub struct Connection {
    id: ConnectionId,
    remote_addr: Option<String>,
    index: Arc<RoomIndex>,
    // Held until `start`; the index only learns about active connections.
    outbound: Option<Outbound>,
    state: ConnectionState,
}

impl Connection {
    pub fn open(index: Arc<RoomIndex>, tx: Outbound, remote_addr: Option<String>) -> Self {
        let id = ConnectionId::new();
        info!("connection: {}", id);

        Self {
            id,
            remote_addr,
            index,
            outbound: Some(tx),
            state: ConnectionState::Unvalidated,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn remote_addr(&self) -> Option<&str> {
        self.remote_addr.as_deref()
    }

    pub fn rooms(&self) -> Vec<String> {
        let self_room = self.id.self_room();
        self.index
            .rooms_of(&self.id)
            .into_iter()
            .filter(|room| *room != self_room)
            .collect()
    }

    pub async fn validate(
        &mut self,
        gate: &dyn AccessGate,
        origin: Option<&str>,
    ) -> Result<(), AccessError> {
        if self.state != ConnectionState::Unvalidated {
            return Ok(());
        }

        gate.validate(origin).await?;
        self.state = ConnectionState::Validated;
        Ok(())
    }

    pub fn start(&mut self, home_room: Option<&str>) -> Result<(), RelayError> {
        if self.state != ConnectionState::Validated {
            return Err(RelayError::NotActive(self.state));
        }
        let Some(tx) = self.outbound.take() else {
            return Err(RelayError::NotActive(self.state));
        };
        self.index.register(self.id, tx);
        self.state = ConnectionState::Active;

        if let Some(room) = home_room {
            self.join_room(&RoomSelector::from(room))?;
        }

        let connected = RelayBucket::new(CONNECTED_KEY, json!({ "status": "OK" }))?;
        self.index.send(&self.id, &connected);
        Ok(())
    }

    pub fn process_message(&mut self, frame: Value) {
        debug!("message from {}: {}", self.id, frame);

        let result = RelayCommand::try_from(frame).and_then(|command| self.dispatch(command));
        if let Err(e) = result {
            error!(
                "Failed to process message from {} (IP: {}): {}",
                self.id,
                self.remote_addr().unwrap_or("unknown"),
                e
            );
        }
    }

    pub fn dispatch(&mut self, command: RelayCommand) -> Result<(), RelayError> {
        match command {
            RelayCommand::LeaveAll => self.leave_all_rooms(),
            RelayCommand::Leave { room } => self.leave_room(&room),
            RelayCommand::Join(rooms) => self.join_room(&rooms),
            RelayCommand::Move(rooms) => self.move_to(&rooms),
            RelayCommand::Publish(message) => self.publish(&message).map(|_| ()),
        }
    }

    pub fn join_room(&mut self, rooms: &RoomSelector) -> Result<(), RelayError> {
        self.ensure_active()?;

        for room in rooms.names() {
            self.join_a_room(room)?;
        }
        Ok(())
    }

    /// Announces first so the joiner never sees its own notice.
    fn join_a_room(&self, room: &str) -> Result<(), RelayError> {
        debug!("joinARoom: {} {}", self.id, room);

        let notice = RelayBucket::new(
            JOIN_KEY,
            MembershipNotice {
                id: self.id,
                room: room.to_owned(),
            },
        )?;
        self.index.emit_to_room(room, &notice, Some(&self.id));
        self.index.join(&self.id, room);

        info!("socket.join {} {}", self.id, room);
        Ok(())
    }

    /// Leaves first so the notice only reaches remaining members.
    pub fn leave_room(&mut self, room: &str) -> Result<(), RelayError> {
        self.ensure_active()?;

        if room == self.id.self_room() {
            debug!("{} ignored request to leave its self-room", self.id);
            return Ok(());
        }

        self.index.leave(&self.id, room);
        let notice = RelayBucket::new(
            LEAVE_KEY,
            MembershipNotice {
                id: self.id,
                room: room.to_owned(),
            },
        )?;
        self.index.emit_to_room(room, &notice, Some(&self.id));

        info!("socket.leave {} {}", self.id, room);
        Ok(())
    }

    pub fn leave_all_rooms(&mut self) -> Result<(), RelayError> {
        self.ensure_active()?;

        for room in self.rooms() {
            self.leave_room(&room)?;
        }
        Ok(())
    }

    pub fn move_to(&mut self, rooms: &RoomSelector) -> Result<(), RelayError> {
        debug!("move {} {:?}", self.id, rooms);

        self.leave_all_rooms()?;
        self.join_room(rooms)
    }

    pub fn publish(&self, message: &Value) -> Result<usize, RelayError> {
        self.ensure_active()?;

        let Some(target) = room_target(message)? else {
            debug!("{} sent options without a room, dropping", self.id);
            return Ok(0);
        };

        match target {
            // Restricted delivery is reserved; nothing is sent for now.
            RoomTarget::Flag(false) => Ok(0),
            RoomTarget::Flag(true) => {
                let bucket = RelayBucket::new(RESPONSE_MESSAGE_KEY, message)?;
                Ok(self.emit_to_rooms(&bucket))
            }
            RoomTarget::Name(room) => {
                let bucket = RelayBucket::new(RESPONSE_MESSAGE_KEY, message)?;
                Ok(self.index.emit_to_room(&room, &bucket, Some(&self.id)))
            }
        }
    }

    fn emit_to_rooms(&self, bucket: &RelayBucket) -> usize {
        self.rooms()
            .iter()
            .map(|room| self.index.emit_to_room(room, bucket, Some(&self.id)))
            .sum()
    }

    /// Only the first call has any effect.
    pub fn dispose(&mut self) {
        match self.state {
            ConnectionState::Disposed => return,
            ConnectionState::Unvalidated | ConnectionState::Validated => {}
            ConnectionState::Active => {
                debug!("dispose {}", self.id);
                match RelayBucket::new(DISCONNECT_KEY, DisconnectNotice { id: self.id }) {
                    Ok(notice) => {
                        self.emit_to_rooms(&notice);
                    }
                    Err(e) => error!("Failed to encode disconnect notice: {}", e),
                }
            }
        }

        self.outbound = None;
        self.index.unregister(&self.id);
        self.state = ConnectionState::Disposed;
    }

    fn ensure_active(&self) -> Result<(), RelayError> {
        match self.state {
            ConnectionState::Active => Ok(()),
            state => Err(RelayError::NotActive(state)),
        }
    }
}

fn room_target(message: &Value) -> Result<Option<RoomTarget>, RelayError> {
    let options = match message.get("options") {
        None | Some(Value::Null) => return Ok(Some(RoomTarget::Flag(true))),
        Some(options) => options,
    };
    match options.get("room") {
        None | Some(Value::Null) => Ok(None),
        Some(room) => RoomTarget::deserialize(room)
            .map(Some)
            .map_err(|_| RelayError::InvalidRoomTarget(room.to_string())),
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.dispose();
    }
}
