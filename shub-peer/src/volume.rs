use crate::error::PeerError;
use shub_core::PeerId;

/// Receives the playback volume derived from a peer's distance.
pub trait VolumeSink {
    fn set_volume(&mut self, peer_id: &PeerId, volume: f64);
}

/// Maps a distance onto `[0, 1]` playback volume; closer is louder.
pub fn volume_from_distance(distance: f64) -> Result<f64, PeerError> {
    let volume = 1.0 - distance;
    if !(0.0..=1.0).contains(&volume) {
        return Err(PeerError::VolumeOutOfRange(volume));
    }
    Ok(volume)
}
