//! Error types for blemeta-core.
//!
//! # Error Handling Strategy
//!
//! | Error Type | Raised by | Handling |
//! |------------|-----------|----------|
//! | [`Error::MalformedAdvertisement`] | Platform decoders | Drop the single event, keep scanning |
//! | [`Error::UnsupportedPlatform`] | [`crate::DecoderRegistry`] | Fatal at configuration time only |
//! | [`Error::InvalidConfig`] | Registry construction | Fix configuration and restart |
//! | [`Error::Config`] | [`crate::Config`] loading | Fix configuration and restart |
//!
//! Advertisements are transient broadcasts, so nothing here is retryable.
//! A failed decode never reaches the merge step, so a record is never left
//! half-updated.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while normalizing advertisement metadata.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A present advertisement field did not have the expected shape.
    #[error("Malformed advertisement field '{field}': {reason}")]
    MalformedAdvertisement {
        /// The platform key or logical field name.
        field: String,
        /// What was wrong with the value.
        reason: String,
    },

    /// No decoder is registered for the platform.
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Create a malformed advertisement error.
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedAdvertisement {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported platform error.
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform(platform.into())
    }

    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    /// Returns `true` if only the current advertisement event is affected.
    ///
    /// Callers should drop the event and keep the scan session running.
    pub fn is_per_event(&self) -> bool {
        matches!(self, Self::MalformedAdvertisement { .. })
    }
}

impl From<blemeta_types::ParseError> for Error {
    fn from(err: blemeta_types::ParseError) -> Self {
        match err {
            blemeta_types::ParseError::MalformedAdvertisement { field, reason } => {
                Error::MalformedAdvertisement { field, reason }
            }
            // Handle future ParseError variants (non_exhaustive)
            _ => Error::malformed("unknown", err.to_string()),
        }
    }
}

/// Result type alias using blemeta-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
