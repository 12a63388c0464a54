//! Boundary to the media transport that carries streams and room data.

use shub_core::{Envelope, PeerId};
use serde_json::Value;

/// Bandwidth hint passed on every join.
pub const VIDEO_BANDWIDTH: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoomMode {
    #[default]
    Mesh,
    Sfu,
}

#[derive(Debug, Clone)]
pub struct JoinOptions<S> {
    pub mode: RoomMode,
    pub stream: Option<S>,
    pub video_bandwidth: u32,
}

pub trait MediaTransport {
    type Stream: Clone + 'static;
    type Room: RoomHandle<Stream = Self::Stream>;

    fn is_open(&self) -> bool;

    /// This client's own id; only meaningful once the transport is open.
    fn peer_id(&self) -> PeerId;

    fn join_room(&mut self, room_id: &str, options: JoinOptions<Self::Stream>) -> Self::Room;
}

/// A joined room on the media transport.
pub trait RoomHandle {
    type Stream;

    fn send(&mut self, envelope: &Envelope);

    /// Asks the transport to leave; it answers with [`RoomEvent::Close`].
    fn close(&mut self);

    fn replace_stream(&mut self, stream: Self::Stream);
}

/// Something the transport reports about a joined room.
#[derive(Debug, Clone)]
pub enum RoomEvent<S> {
    Open,
    PeerJoin(PeerId),
    PeerLeave(PeerId),
    Stream { peer_id: PeerId, stream: S },
    Data { src: PeerId, data: Value },
    Close,
}
