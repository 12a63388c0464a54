use shub_core::PeerId;
use shub_core::model::{DistanceMatrix, distance};
use std::collections::BTreeMap;

/// Last distance matrix received and who sent it.
#[derive(Debug, Default)]
pub struct DistanceReceiver {
    matrix: DistanceMatrix,
    src: Option<PeerId>,
}

impl DistanceReceiver {
    pub fn receive(&mut self, src: &PeerId, matrix: DistanceMatrix) {
        self.src = Some(src.clone());
        self.matrix = matrix;
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn src(&self) -> Option<&PeerId> {
        self.src.as_ref()
    }

    /// Distance `me` should apply to each peer the matrix mentions.
    pub fn normalized(&self, me: &PeerId) -> BTreeMap<PeerId, f64> {
        distance::normalize(&self.matrix, me)
    }
}
