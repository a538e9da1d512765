//! Error type shared by all engine operations.

use thiserror::Error;

/// Failure of a path operation.
///
/// Every failure aborts the running operation immediately; nothing is
/// retried internally. Messages carry the offending segment, the rendered
/// path and, where relevant, the keys available at the failure point.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TraverseError {
    /// A path segment has content after its closing bracket, e.g. `blocks[2]x`.
    #[error("illegal content after closing bracket: \"{trailing}\" (segment: \"{segment}\")")]
    MalformedSegment { segment: String, trailing: String },

    /// A segment could not be resolved: missing key, missing embedded ID,
    /// or a null value encountered before the end of the path.
    #[error("path not found: {reason}")]
    PathNotFound { reason: String },

    /// Traversal ended in (or passed through) a non-container value where a
    /// map or list was required.
    #[error("not a container: {reason}")]
    NotAContainer { reason: String },

    /// The target key or index of an update/removal does not exist in its
    /// parent container.
    #[error("key not found: \"{key}\" (available: {available})")]
    KeyNotFound { key: String, available: String },

    /// A list-style insert was attempted on an associative container.
    #[error("cannot insert a list element into an associative container at \"{path}\"")]
    InvalidInsert { path: String },

    /// An operation-specific precondition was violated.
    #[error("invalid path: {reason}")]
    InvalidPath { reason: String },
}
