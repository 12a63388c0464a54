//! Pairwise distances reported by peers and their reconciliation into one
//! value per counterpart.

use crate::model::peer::PeerId;
use std::collections::BTreeMap;

/// Distance at which a peer is heard at full volume.
pub const NEAR_DISTANCE: f64 = 0.0;

/// Distance every peer starts at.
pub const FAR_DISTANCE: f64 = 0.9;

/// `sender -> (receiver -> distance)`.
pub type DistanceMatrix = BTreeMap<PeerId, BTreeMap<PeerId, f64>>;

/// Matrix holding a single `from -> to` entry.
pub fn pair(from: PeerId, to: PeerId, distance: f64) -> DistanceMatrix {
    let mut row = BTreeMap::new();
    row.insert(to, distance);

    let mut matrix = BTreeMap::new();
    matrix.insert(from, row);
    matrix
}

/// Folds `matrix` into the distance `me` should apply to every other peer.
///
/// The row keyed by `me` is taken verbatim. Any other row contributes only its
/// `me` column, read as the distance to the row's sender, and never overrides
/// a value from `me`'s own row.
pub fn normalize(matrix: &DistanceMatrix, me: &PeerId) -> BTreeMap<PeerId, f64> {
    let mut distances = matrix.get(me).cloned().unwrap_or_default();

    for (sender, row) in matrix {
        if sender == me {
            continue;
        }
        if let Some(distance) = row.get(me) {
            distances.entry(sender.clone()).or_insert(*distance);
        }
    }

    distances
}
