use crate::error::PeerError;
use crate::store::{ObservableMap, Record, StoreError};
use crate::volume::{VolumeSink, volume_from_distance};
use shub_core::PeerId;
use shub_core::model::FAR_DISTANCE;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::warn;

pub const STREAM: &str = "stream";
pub const DISTANCE: &str = "distance";
pub const FACE: &str = "face";

#[derive(Debug, Clone, PartialEq)]
pub enum PeerAttr<S> {
    Stream(Option<S>),
    Distance(f64),
    Face(String),
}

/// A remote participant as seen from this client.
pub struct Peer<S> {
    id: PeerId,
    record: Record<PeerAttr<S>>,
}

impl<S: 'static> Peer<S> {
    pub fn new(id: PeerId) -> Self {
        Self {
            id,
            record: Record::new([
                (STREAM, PeerAttr::Stream(None)),
                (DISTANCE, PeerAttr::Distance(FAR_DISTANCE)),
                (FACE, PeerAttr::Face(String::new())),
            ]),
        }
    }

    pub fn id(&self) -> &PeerId {
        &self.id
    }

    pub fn stream(&self) -> Option<&S> {
        match self.record.get(STREAM) {
            Ok(PeerAttr::Stream(stream)) => stream.as_ref(),
            _ => None,
        }
    }

    pub fn distance(&self) -> f64 {
        match self.record.get(DISTANCE) {
            Ok(PeerAttr::Distance(distance)) => *distance,
            _ => FAR_DISTANCE,
        }
    }

    /// Latest thumbnail as a data URL, empty until one arrives.
    pub fn face(&self) -> &str {
        match self.record.get(FACE) {
            Ok(PeerAttr::Face(face)) => face,
            _ => "",
        }
    }

    pub fn set_stream(&mut self, stream: S) -> Result<(), StoreError> {
        self.record.set(STREAM, PeerAttr::Stream(Some(stream)))
    }

    pub fn set_distance(&mut self, distance: f64) -> Result<(), StoreError> {
        self.record.set(DISTANCE, PeerAttr::Distance(distance))
    }

    pub fn set_face(&mut self, face: impl Into<String>) -> Result<(), StoreError> {
        self.record.set(FACE, PeerAttr::Face(face.into()))
    }

    pub fn on_stream<F>(&mut self, mut listener: F) -> Result<(), StoreError>
    where
        F: FnMut(&PeerId, &S) + 'static,
    {
        let id = self.id.clone();
        self.record.on_set(STREAM, move |_, _, value| {
            if let PeerAttr::Stream(Some(stream)) = value {
                listener(&id, stream);
            }
        })
    }

    pub fn on_distance<F>(&mut self, mut listener: F) -> Result<(), StoreError>
    where
        F: FnMut(&PeerId, f64) + 'static,
    {
        let id = self.id.clone();
        self.record.on_set(DISTANCE, move |_, _, value| {
            if let PeerAttr::Distance(distance) = value {
                listener(&id, *distance);
            }
        })
    }

    pub fn on_face<F>(&mut self, mut listener: F) -> Result<(), StoreError>
    where
        F: FnMut(&PeerId, &str) + 'static,
    {
        let id = self.id.clone();
        self.record.on_set(FACE, move |_, _, value| {
            if let PeerAttr::Face(face) = value {
                listener(&id, face);
            }
        })
    }

    pub fn record(&self) -> &Record<PeerAttr<S>> {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut Record<PeerAttr<S>> {
        &mut self.record
    }
}

pub type SharedVolumeSink = Rc<RefCell<dyn VolumeSink>>;

/// Every known remote participant, keyed by peer id.
pub struct Peers<S> {
    map: ObservableMap<Peer<S>>,
    volume: Option<SharedVolumeSink>,
}

impl<S> Default for Peers<S> {
    fn default() -> Self {
        Self {
            map: ObservableMap::new(),
            volume: None,
        }
    }
}

impl<S: 'static> Peers<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Peers created from now on drive `sink` from their distance.
    pub fn set_volume_sink(&mut self, sink: SharedVolumeSink) {
        self.volume = Some(sink);
    }

    pub fn get(&self, id: &PeerId) -> Option<&Peer<S>> {
        self.map.get(id.as_str())
    }

    pub fn get_mut(&mut self, id: &PeerId) -> Option<&mut Peer<S>> {
        self.map.get_mut(id.as_str())
    }

    pub fn find_or_create(&mut self, id: &PeerId) -> Result<&mut Peer<S>, PeerError> {
        if !self.map.contains_key(id.as_str()) {
            let mut peer = Peer::new(id.clone());
            if let Some(sink) = &self.volume {
                link_volume(&mut peer, sink.clone())?;
            }
            self.map.insert(id.as_str(), peer);
        }
        self.map
            .get_mut(id.as_str())
            .ok_or_else(|| PeerError::UnknownPeer(id.clone()))
    }

    pub fn remove(&mut self, id: &PeerId) -> Option<Peer<S>> {
        self.map.remove(id.as_str())
    }

    /// Drops every peer together with its listeners.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = PeerId> + '_ {
        self.map.keys().map(PeerId::from)
    }

    pub fn map(&self) -> &ObservableMap<Peer<S>> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut ObservableMap<Peer<S>> {
        &mut self.map
    }
}

fn link_volume<S: 'static>(peer: &mut Peer<S>, sink: SharedVolumeSink) -> Result<(), StoreError> {
    apply_volume(&sink, peer.id(), peer.distance());
    peer.on_distance(move |id, distance| apply_volume(&sink, id, distance))
}

fn apply_volume(sink: &SharedVolumeSink, id: &PeerId, distance: f64) {
    match volume_from_distance(distance) {
        Ok(volume) => sink.borrow_mut().set_volume(id, volume),
        Err(e) => warn!("Dropping volume for peer {}: {}", id, e),
    }
}
