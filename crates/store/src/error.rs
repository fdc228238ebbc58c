//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures surfaced by a [`crate::Store`] implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Operation addressed a collection that was never registered
    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    /// A write would break a unique index
    #[error("unique index violation on {collection}.{index}")]
    UniqueViolation { collection: String, index: String },

    /// Document or patch was not a JSON object
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}
