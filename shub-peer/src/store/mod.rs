//! Change-observable containers.
//!
//! Each container keeps at most one listener per field or event; registering
//! another replaces it. Composing several reactions is up to the caller.

mod list;
mod map;
mod record;

pub use list::{ListListener, ObservableList};
pub use map::{MapListener, ObservableMap};
pub use record::{Record, RecordListener};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("field is not declared on this record: {0}")]
    SchemaViolation(String),
    #[error("index {index} out of bounds for list of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
