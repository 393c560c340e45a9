//! Error types for roost-types.

use thiserror::Error;

/// Errors produced while constructing Roost value types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    /// An identifier string did not decode to 16 bytes.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// A category was paired with the wrong kind of container.
    #[error("category {category} does not apply to {container}")]
    CategoryMismatch {
        /// The requested category.
        category: String,
        /// The container kind it was paired with.
        container: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = TypeError::InvalidId("abc".into());
        assert_eq!(err.to_string(), "invalid id: abc");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeError>();
    }
}
