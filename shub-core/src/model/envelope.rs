use crate::error::ProtocolError;
use crate::model::distance::{self, DistanceMatrix};
use crate::model::peer::PeerId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Message exchanged between peers over the room data channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Text { body: String },
    Distance { matrix: DistanceMatrix },
    Face { image: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvelopeKind {
    Text,
    Distance,
    Face,
}

impl EnvelopeKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "text" => Some(Self::Text),
            "distance" => Some(Self::Distance),
            "face" => Some(Self::Face),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Distance => "distance",
            Self::Face => "face",
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Envelope {
    pub fn text(body: impl Into<String>) -> Self {
        Self::Text { body: body.into() }
    }

    pub fn distance_pair(from: PeerId, to: PeerId, distance: f64) -> Self {
        Self::Distance {
            matrix: distance::pair(from, to, distance),
        }
    }

    pub fn face(image: impl Into<String>) -> Self {
        Self::Face {
            image: image.into(),
        }
    }

    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Self::Text { .. } => EnvelopeKind::Text,
            Self::Distance { .. } => EnvelopeKind::Distance,
            Self::Face { .. } => EnvelopeKind::Face,
        }
    }

    /// Decodes a raw data-channel payload.
    ///
    /// The `type` tag is checked first so an unrecognized tag is reported as
    /// such rather than as a shape mismatch.
    pub fn from_value(data: Value) -> Result<Self, ProtocolError> {
        let tag = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| ProtocolError::UnknownProtocolType(describe_tag(&data)))?;
        let kind = EnvelopeKind::from_tag(tag)
            .ok_or_else(|| ProtocolError::UnknownProtocolType(tag.to_owned()))?;

        serde_json::from_value(data).map_err(|e| ProtocolError::MalformedPayload {
            kind,
            reason: e.to_string(),
        })
    }
}

fn describe_tag(data: &Value) -> String {
    match data.get("type") {
        Some(tag) => tag.to_string(),
        None => "<missing>".to_owned(),
    }
}
