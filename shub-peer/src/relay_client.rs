//! Client side of the room relay: sends `{key, value, options}` frames and
//! demultiplexes relayed application messages back onto per-key handlers.

use crate::error::PeerError;
use serde_json::Value;
use shub_core::RelayMessage;
use shub_core::model::{
    CONNECTED_KEY, JOIN_KEY, LEAVE_ALL_KEY, LEAVE_KEY, MOVE_KEY, RESPONSE_MESSAGE_KEY,
    RelayBucket, RelayOptions,
};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Write half of the relay socket.
pub trait RelaySink {
    fn send(&mut self, message: &RelayMessage);
}

impl RelaySink for Vec<RelayMessage> {
    fn send(&mut self, message: &RelayMessage) {
        self.push(message.clone());
    }
}

const MEMBERSHIP_KEYS: [&str; 4] = [JOIN_KEY, LEAVE_KEY, LEAVE_ALL_KEY, MOVE_KEY];

/// Sending side, also handed to handlers so they can reply.
pub struct Emitter<S> {
    sink: S,
    in_connect_handler: bool,
}

impl<S: RelaySink> Emitter<S> {
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Membership changes are refused while the `connected` handlers run;
    /// the server has not finished setting the connection up yet.
    pub fn emit(
        &mut self,
        key: &str,
        value: Option<Value>,
        options: Option<RelayOptions>,
    ) -> Result<(), PeerError> {
        if self.in_connect_handler && MEMBERSHIP_KEYS.contains(&key) {
            return Err(PeerError::MembershipInConnectHandler(key.to_owned()));
        }

        let mut message = RelayMessage::new(key, value);
        message.options = options;
        debug!("relay emit {}", key);
        self.sink.send(&message);
        Ok(())
    }

    pub fn join(&mut self, room: &str) -> Result<(), PeerError> {
        self.emit(JOIN_KEY, Some(room_value(room)), None)
    }

    pub fn leave(&mut self, room: &str) -> Result<(), PeerError> {
        self.emit(LEAVE_KEY, Some(room_value(room)), None)
    }

    pub fn move_to(&mut self, room: &str) -> Result<(), PeerError> {
        self.emit(MOVE_KEY, Some(room_value(room)), None)
    }

    pub fn leave_all(&mut self) -> Result<(), PeerError> {
        self.emit(LEAVE_ALL_KEY, None, None)
    }
}

fn room_value(room: &str) -> Value {
    serde_json::json!({ "room": room })
}

pub type RelayHandler<S> = Box<dyn FnMut(&mut Emitter<S>, &Value) -> Result<(), PeerError>>;

/// Returned by [`RelayClient::on`]; pass it to [`RelayClient::off`] to stop
/// receiving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    key: String,
    id: u64,
}

impl Subscription {
    pub fn key(&self) -> &str {
        &self.key
    }
}

pub struct RelayClient<S> {
    emitter: Emitter<S>,
    handlers: BTreeMap<String, Vec<(u64, RelayHandler<S>)>>,
    next_id: u64,
}

impl<S: RelaySink> RelayClient<S> {
    pub fn new(sink: S) -> Self {
        Self {
            emitter: Emitter {
                sink,
                in_connect_handler: false,
            },
            handlers: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn emitter(&mut self) -> &mut Emitter<S> {
        &mut self.emitter
    }

    pub fn emit(
        &mut self,
        key: &str,
        value: Option<Value>,
        options: Option<RelayOptions>,
    ) -> Result<(), PeerError> {
        self.emitter.emit(key, value, options)
    }

    pub fn join(&mut self, room: &str) -> Result<(), PeerError> {
        self.emitter.join(room)
    }

    pub fn leave(&mut self, room: &str) -> Result<(), PeerError> {
        self.emitter.leave(room)
    }

    pub fn move_to(&mut self, room: &str) -> Result<(), PeerError> {
        self.emitter.move_to(room)
    }

    pub fn leave_all(&mut self) -> Result<(), PeerError> {
        self.emitter.leave_all()
    }

    /// Handlers for one key run in registration order.
    pub fn on<F>(&mut self, key: &str, handler: F) -> Subscription
    where
        F: FnMut(&mut Emitter<S>, &Value) -> Result<(), PeerError> + 'static,
    {
        let id = self.next_id;
        self.next_id += 1;
        self.handlers
            .entry(key.to_owned())
            .or_default()
            .push((id, Box::new(handler)));

        Subscription {
            key: key.to_owned(),
            id,
        }
    }

    /// Returns whether the handler was still registered.
    pub fn off(&mut self, subscription: &Subscription) -> bool {
        let Some(handlers) = self.handlers.get_mut(&subscription.key) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(id, _)| *id != subscription.id);
        let removed = handlers.len() != before;

        if handlers.is_empty() {
            self.handlers.remove(&subscription.key);
        }
        removed
    }

    pub fn has_handlers(&self, key: &str) -> bool {
        self.handlers.contains_key(key)
    }

    /// Decodes one text frame from the server and dispatches it.
    pub fn handle_text(&mut self, text: &str) -> Result<usize, PeerError> {
        let bucket: RelayBucket =
            serde_json::from_str(text).map_err(|e| PeerError::MalformedFrame(e.to_string()))?;
        self.handle_frame(bucket)
    }

    /// Relayed application messages go to the handlers of their own key,
    /// everything else to the handlers of the frame key. Returns how many
    /// handlers ran.
    pub fn handle_frame(&mut self, bucket: RelayBucket) -> Result<usize, PeerError> {
        if bucket.key != RESPONSE_MESSAGE_KEY {
            return self.trigger(&bucket.key, &bucket.value);
        }

        let Some(key) = bucket.value.get("key").and_then(Value::as_str) else {
            return Err(PeerError::MalformedFrame(format!(
                "{} without key",
                RESPONSE_MESSAGE_KEY
            )));
        };
        let key = key.to_owned();
        let value = bucket.value.get("value").cloned().unwrap_or(Value::Null);
        self.trigger(&key, &value)
    }

    fn trigger(&mut self, key: &str, value: &Value) -> Result<usize, PeerError> {
        let Some(mut handlers) = self.handlers.remove(key) else {
            return Ok(0);
        };

        let connecting = key == CONNECTED_KEY;
        self.emitter.in_connect_handler = connecting;

        let mut first_error = None;
        for (_, handler) in handlers.iter_mut() {
            if let Err(e) = handler(&mut self.emitter, value) {
                warn!("Relay handler for {} failed: {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        self.emitter.in_connect_handler = false;

        let ran = handlers.len();
        self.handlers.insert(key.to_owned(), handlers);

        match first_error {
            Some(e) => Err(e),
            None => Ok(ran),
        }
    }
}
