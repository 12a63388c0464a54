use crate::error::PeerError;
use crate::peer::{Peers, SharedVolumeSink};
use crate::protocol::{self, PeerProtocol};
use crate::store::{Record, StoreError};
use crate::transport::{
    JoinOptions, MediaTransport, RoomEvent, RoomHandle, RoomMode, VIDEO_BANDWIDTH,
};
use shub_core::PeerId;
use shub_core::model::{FAR_DISTANCE, NEAR_DISTANCE};
use tracing::{debug, info, warn};

pub const STATUS: &str = "status";
pub const LOCAL_TEXT: &str = "local_text";
pub const MY_FACE: &str = "my_face";

/// Base64 of a fully black JPEG is mostly `A`; such frames are not shared.
const BLACK_FRAME_RUN: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomStatus {
    #[default]
    Left,
    Joining,
    Joined,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoomAttr {
    Status(RoomStatus),
    LocalText(String),
    MyFace(Option<String>),
}

pub struct RoomState {
    record: Record<RoomAttr>,
}

impl Default for RoomState {
    fn default() -> Self {
        Self {
            record: Record::new([
                (STATUS, RoomAttr::Status(RoomStatus::Left)),
                (LOCAL_TEXT, RoomAttr::LocalText(String::new())),
                (MY_FACE, RoomAttr::MyFace(None)),
            ]),
        }
    }
}

impl RoomState {
    pub fn status(&self) -> RoomStatus {
        match self.record.get(STATUS) {
            Ok(RoomAttr::Status(status)) => *status,
            _ => RoomStatus::Left,
        }
    }

    pub fn local_text(&self) -> &str {
        match self.record.get(LOCAL_TEXT) {
            Ok(RoomAttr::LocalText(text)) => text,
            _ => "",
        }
    }

    pub fn my_face(&self) -> Option<&str> {
        match self.record.get(MY_FACE) {
            Ok(RoomAttr::MyFace(face)) => face.as_deref(),
            _ => None,
        }
    }

    pub fn on_status<F>(&mut self, mut listener: F) -> Result<(), StoreError>
    where
        F: FnMut(RoomStatus) + 'static,
    {
        self.record.on_set(STATUS, move |_, _, value| {
            if let RoomAttr::Status(status) = value {
                listener(*status);
            }
        })
    }

    pub fn record_mut(&mut self) -> &mut Record<RoomAttr> {
        &mut self.record
    }

    fn set_status(&mut self, status: RoomStatus) -> Result<(), StoreError> {
        self.record.set(STATUS, RoomAttr::Status(status))
    }

    fn set_local_text(&mut self, text: &str) -> Result<(), StoreError> {
        self.record.set(LOCAL_TEXT, RoomAttr::LocalText(text.to_owned()))
    }

    fn set_my_face(&mut self, face: &str) -> Result<(), StoreError> {
        self.record.set(MY_FACE, RoomAttr::MyFace(Some(face.to_owned())))
    }
}

pub struct PeerRoom<T: MediaTransport> {
    transport: T,
    handle: Option<T::Room>,
    state: RoomState,
    peers: Peers<T::Stream>,
    protocol: PeerProtocol,
}

impl<T: MediaTransport> PeerRoom<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            handle: None,
            state: RoomState::default(),
            peers: Peers::new(),
            protocol: PeerProtocol::new(),
        }
    }

    pub fn with_volume_sink(mut self, sink: SharedVolumeSink) -> Self {
        self.peers.set_volume_sink(sink);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> &RoomState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RoomState {
        &mut self.state
    }

    pub fn peers(&self) -> &Peers<T::Stream> {
        &self.peers
    }

    pub fn peers_mut(&mut self) -> &mut Peers<T::Stream> {
        &mut self.peers
    }

    pub fn protocol(&self) -> &PeerProtocol {
        &self.protocol
    }

    pub fn protocol_mut(&mut self) -> &mut PeerProtocol {
        &mut self.protocol
    }

    pub fn status(&self) -> RoomStatus {
        self.state.status()
    }

    pub fn is_joined(&self) -> bool {
        self.status() == RoomStatus::Joined
    }

    pub fn is_joining(&self) -> bool {
        self.status() == RoomStatus::Joining
    }

    /// Returns `false` without side effects while the transport is not open.
    pub fn join(
        &mut self,
        room_id: &str,
        stream: Option<T::Stream>,
        mode: RoomMode,
    ) -> Result<bool, PeerError> {
        if !self.transport.is_open() {
            debug!("Transport not open, not joining room {}", room_id);
            return Ok(false);
        }

        let options = JoinOptions {
            mode,
            stream,
            video_bandwidth: VIDEO_BANDWIDTH,
        };
        self.handle = Some(self.transport.join_room(room_id, options));
        self.state.set_status(RoomStatus::Joining)?;
        info!("Joining room {} as {:?}", room_id, mode);
        Ok(true)
    }

    pub fn handle_event(&mut self, event: RoomEvent<T::Stream>) -> Result<(), PeerError> {
        match event {
            RoomEvent::Open => {
                self.state.set_status(RoomStatus::Joined)?;
                info!("Room open");
                if self.handle.is_some() {
                    self.send_my_face()?;
                } else {
                    warn!("Room opened without a room handle, face not sent");
                }
            }
            RoomEvent::PeerJoin(peer_id) => {
                info!("Peer joined: {}", peer_id);
                self.peers.find_or_create(&peer_id)?;
            }
            RoomEvent::Stream { peer_id, stream } => {
                self.peers.find_or_create(&peer_id)?.set_stream(stream)?;
            }
            RoomEvent::Data { src, data } => {
                let me = self.transport.peer_id();
                if let Err(e) = self.protocol.dispatch(&me, &src, data, &mut self.peers) {
                    warn!("Dropping data from peer {}: {}", src, e);
                }
            }
            RoomEvent::PeerLeave(peer_id) => {
                info!("Peer left: {}", peer_id);
                self.peers.remove(&peer_id);
            }
            RoomEvent::Close => {
                self.peers.clear();
                self.handle = None;
                self.state.set_status(RoomStatus::Left)?;
                info!("Room closed");
            }
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), PeerError> {
        self.room()?.close();
        Ok(())
    }

    pub fn replace_stream(&mut self, stream: T::Stream) -> Result<(), PeerError> {
        self.room()?.replace_stream(stream);
        Ok(())
    }

    pub fn send_message(&mut self, text: &str) -> Result<(), PeerError> {
        protocol::send_text(self.room()?, text);
        self.state.set_local_text(text)?;
        Ok(())
    }

    pub fn send_my_face(&mut self) -> Result<bool, PeerError> {
        let Some(face) = self.state.my_face().map(str::to_owned) else {
            return Ok(false);
        };
        protocol::send_face(self.room()?, &face);
        Ok(true)
    }

    /// Stores the local thumbnail unless it is a black frame and shares it
    /// when joined. Returns whether it was stored.
    pub fn set_my_face(&mut self, data_url: &str) -> Result<bool, PeerError> {
        if data_url.contains(BLACK_FRAME_RUN) {
            debug!("Ignoring black face frame");
            return Ok(false);
        }

        self.state.set_my_face(data_url)?;
        if self.is_joined() {
            self.send_my_face()?;
        }
        Ok(true)
    }

    pub fn move_to(&mut self, peer_id: &PeerId, distance: f64) -> Result<(), PeerError> {
        self.peers
            .get_mut(peer_id)
            .ok_or_else(|| PeerError::UnknownPeer(peer_id.clone()))?
            .set_distance(distance)?;
        Ok(())
    }

    pub fn near_to(&mut self, peer_id: &PeerId) -> Result<(), PeerError> {
        self.announce_distance(peer_id, NEAR_DISTANCE)
    }

    pub fn far_from(&mut self, peer_id: &PeerId) -> Result<(), PeerError> {
        self.announce_distance(peer_id, FAR_DISTANCE)
    }

    fn announce_distance(&mut self, peer_id: &PeerId, distance: f64) -> Result<(), PeerError> {
        self.move_to(peer_id, distance)?;
        let me = self.transport.peer_id();
        protocol::send_distance_pair(self.room()?, me, peer_id.clone(), distance);
        Ok(())
    }

    fn room(&mut self) -> Result<&mut T::Room, PeerError> {
        self.handle.as_mut().ok_or(PeerError::NotJoined)
    }
}
