//! Error types for roost-client.

use roost_core::CoreError;
use roost_types::TypeError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::store::StoreError;
use crate::updates::UpdateError;

/// Errors surfaced by [`crate::Roost`] commands.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A move referenced an index outside the list.
    #[error("invalid index: move {from} -> {to} in list of {len}")]
    InvalidIndex {
        /// Source index.
        from: usize,
        /// Destination index.
        to: usize,
        /// List length.
        len: usize,
    },

    /// A page cursor did not parse.
    #[error("malformed cursor: {0:?}")]
    MalformedCursor(String),

    /// Input rejected before any write was attempted.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The storage collaborator failed; passed through unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// No row with this id exists in the group.
    #[error("not found: {0}")]
    NotFound(String),

    /// The update stream rejected a push.
    #[error("update stream error: {0}")]
    Updates(#[from] UpdateError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl From<CoreError> for ClientError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidIndex { from, to, len } => ClientError::InvalidIndex { from, to, len },
            CoreError::MalformedCursor(cursor) => ClientError::MalformedCursor(cursor),
            CoreError::Validation(reason) => ClientError::Validation(reason),
        }
    }
}

impl From<TypeError> for ClientError {
    fn from(err: TypeError) -> Self {
        ClientError::Validation(err.to_string())
    }
}
