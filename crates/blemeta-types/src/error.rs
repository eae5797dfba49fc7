//! Error types for advertisement decoding in blemeta-types.

use thiserror::Error;

/// Errors that can occur when decoding a raw advertisement field.
///
/// This error type is platform-agnostic and does not include
/// registry or configuration errors (those belong in blemeta-core).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A present field could not be decoded according to its expected shape.
    #[error("Malformed advertisement field '{field}': {reason}")]
    MalformedAdvertisement {
        /// The platform key or logical field name.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },
}

impl ParseError {
    /// Create a malformed advertisement error for a field.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAdvertisement {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias using blemeta-types' ParseError type.
pub type ParseResult<T> = std::result::Result<T, ParseError>;
