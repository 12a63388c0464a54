mod distance_receiver;
mod text_receiver;

pub use distance_receiver::*;
pub use text_receiver::*;

use crate::error::PeerError;
use crate::peer::Peers;
use crate::transport::RoomHandle;
use regex::Regex;
use serde_json::Value;
use shub_core::model::{DistanceMatrix, EnvelopeKind};
use shub_core::{Envelope, PeerId, ProtocolError};
use std::sync::LazyLock;
use tracing::debug;

static JPEG_DATA_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^data:image/jpeg;base64,[A-Za-z0-9_/=+]+$").expect("face pattern is valid")
});

pub fn is_face_image(image: &str) -> bool {
    JPEG_DATA_URL.is_match(image)
}

pub fn send_text<R: RoomHandle + ?Sized>(room: &mut R, body: &str) {
    room.send(&Envelope::text(body));
}

pub fn send_distance<R: RoomHandle + ?Sized>(room: &mut R, matrix: DistanceMatrix) {
    room.send(&Envelope::Distance { matrix });
}

pub fn send_distance_pair<R: RoomHandle + ?Sized>(
    room: &mut R,
    from: PeerId,
    to: PeerId,
    distance: f64,
) {
    room.send(&Envelope::distance_pair(from, to, distance));
}

pub fn send_face<R: RoomHandle + ?Sized>(room: &mut R, data_url: &str) {
    room.send(&Envelope::face(data_url));
}

/// Routes inbound data-channel payloads to their handlers.
#[derive(Default)]
pub struct PeerProtocol {
    text: TextReceiver,
    distance: DistanceReceiver,
}

impl PeerProtocol {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &TextReceiver {
        &self.text
    }

    pub fn text_mut(&mut self) -> &mut TextReceiver {
        &mut self.text
    }

    pub fn distance(&self) -> &DistanceReceiver {
        &self.distance
    }

    /// Handles one payload from `src`. A failure leaves every store untouched.
    pub fn dispatch<S: 'static>(
        &mut self,
        me: &PeerId,
        src: &PeerId,
        data: Value,
        peers: &mut Peers<S>,
    ) -> Result<(), PeerError> {
        match Envelope::from_value(data)? {
            Envelope::Text { body } => self.text.receive(src, body)?,
            Envelope::Distance { matrix } => {
                self.distance.receive(src, matrix);
                self.apply_distances(me, peers)?;
            }
            Envelope::Face { image } => receive_face(src, image, peers)?,
        }
        Ok(())
    }

    fn apply_distances<S: 'static>(
        &self,
        me: &PeerId,
        peers: &mut Peers<S>,
    ) -> Result<(), PeerError> {
        for (peer_id, distance) in self.distance.normalized(me) {
            match peers.get_mut(&peer_id) {
                Some(peer) => peer.set_distance(distance)?,
                None => debug!("Skipping distance for unknown peer {}", peer_id),
            }
        }
        Ok(())
    }
}

fn receive_face<S: 'static>(
    src: &PeerId,
    image: String,
    peers: &mut Peers<S>,
) -> Result<(), PeerError> {
    if !is_face_image(&image) {
        return Err(ProtocolError::MalformedPayload {
            kind: EnvelopeKind::Face,
            reason: "illegal image".to_owned(),
        }
        .into());
    }
    peers.find_or_create(src)?.set_face(image)?;
    Ok(())
}
