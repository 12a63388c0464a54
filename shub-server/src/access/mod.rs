mod referer_validator;

pub use referer_validator::RefererValidator;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AccessError {
    #[error("connection presented no origin")]
    MissingOrigin,
    #[error("unexpected referer: {origin}")]
    Rejected { origin: String },
}

/// Admission check run once per connection before it may touch any room.
#[async_trait]
pub trait AccessGate: Send + Sync {
    /// `origin` is the declared page origin of the connection, if it sent one.
    async fn validate(&self, origin: Option<&str>) -> Result<(), AccessError>;
}
