use crate::model::EnvelopeKind;
use thiserror::Error;

/// Reasons an inbound peer-channel envelope is dropped.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProtocolError {
    #[error("unknown protocol type: {0}")]
    UnknownProtocolType(String),
    #[error("malformed {kind} payload: {reason}")]
    MalformedPayload { kind: EnvelopeKind, reason: String },
}
