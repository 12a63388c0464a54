use axum::extract::ws::Message;
use dashmap::DashMap;
use shub_core::ConnectionId;
use shub_core::model::RelayBucket;
use std::collections::HashSet;
use tokio::sync::mpsc;
use tracing::{error, warn};

pub type Outbound = mpsc::UnboundedSender<Message>;

/// Process-wide table of live connections and the rooms they belong to.
#[derive(Default)]
pub struct RoomIndex {
    connections: DashMap<ConnectionId, Outbound>,
    rooms: DashMap<String, HashSet<ConnectionId>>,
    /// Rooms per connection in join order, self-room first.
    memberships: DashMap<ConnectionId, Vec<String>>,
}

impl RoomIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, id: ConnectionId, tx: Outbound) {
        self.connections.insert(id, tx);
        self.join(&id, &id.self_room());
    }

    pub fn unregister(&self, id: &ConnectionId) {
        self.connections.remove(id);

        let Some((_, rooms)) = self.memberships.remove(id) else {
            return;
        };
        for room in rooms {
            self.remove_member(&room, id);
        }
    }

    pub fn join(&self, id: &ConnectionId, room: &str) {
        self.rooms.entry(room.to_owned()).or_default().insert(*id);

        let mut rooms = self.memberships.entry(*id).or_default();
        if !rooms.iter().any(|r| r == room) {
            rooms.push(room.to_owned());
        }
    }

    pub fn leave(&self, id: &ConnectionId, room: &str) -> bool {
        let was_member = self.remove_member(room, id);

        if let Some(mut rooms) = self.memberships.get_mut(id) {
            rooms.retain(|r| r != room);
        }
        was_member
    }

    fn remove_member(&self, room: &str, id: &ConnectionId) -> bool {
        let (removed, now_empty) = match self.rooms.get_mut(room) {
            Some(mut members) => {
                let removed = members.remove(id);
                (removed, members.is_empty())
            }
            None => (false, false),
        };

        if now_empty {
            self.rooms.remove_if(room, |_, members| members.is_empty());
        }
        removed
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    pub fn is_member(&self, id: &ConnectionId, room: &str) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|members| members.contains(id))
    }

    pub fn rooms_of(&self, id: &ConnectionId) -> Vec<String> {
        self.memberships
            .get(id)
            .map(|rooms| rooms.clone())
            .unwrap_or_default()
    }

    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn send(&self, id: &ConnectionId, bucket: &RelayBucket) -> bool {
        let Some(json) = encode(bucket) else {
            return false;
        };
        self.deliver(id, json)
    }

    pub fn emit_to_room(
        &self,
        room: &str,
        bucket: &RelayBucket,
        except: Option<&ConnectionId>,
    ) -> usize {
        // Collect first so no shard guard is held while sending.
        let targets: Vec<ConnectionId> = self
            .members(room)
            .into_iter()
            .filter(|id| Some(id) != except)
            .collect();
        if targets.is_empty() {
            return 0;
        }

        let Some(json) = encode(bucket) else {
            return 0;
        };
        targets
            .iter()
            .filter(|id| self.deliver(id, json.clone()))
            .count()
    }

    fn deliver(&self, id: &ConnectionId, json: String) -> bool {
        let Some(tx) = self.connections.get(id) else {
            warn!("Attempted to send relay frame to disconnected connection {}", id);
            return false;
        };
        if let Err(e) = tx.send(Message::Text(json.into())) {
            error!("Failed to queue relay frame for {}: {:?}", id, e);
            return false;
        }
        true
    }
}

fn encode(bucket: &RelayBucket) -> Option<String> {
    match serde_json::to_string(bucket) {
        Ok(json) => Some(json),
        Err(e) => {
            error!("Failed to serialize relay frame '{}': {}", bucket.key, e);
            None
        }
    }
}
