//! Error types for roost-core.

use thiserror::Error;

/// Errors from the pure ordering and paging logic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
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

    /// A page cursor did not parse as a timestamp.
    #[error("malformed cursor: {0:?}")]
    MalformedCursor(String),

    /// Input rejected before any write was attempted.
    #[error("validation failed: {0}")]
    Validation(String),
}
