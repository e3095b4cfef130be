//! Common error types used throughout segcat.
//!
//! This module covers the failures of the shared utilities: time values that
//! do not parse.

/// Common error type for segcat.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A time value could not be parsed.
    #[error("Invalid duration: '{0}'")]
    InvalidDuration(String),
}

impl Error {
    /// Create a new InvalidDuration error.
    pub fn invalid_duration<S: Into<String>>(value: S) -> Self {
        Self::InvalidDuration(value.into())
    }
}

/// Result type alias for segcat-common operations.
pub type Result<T> = std::result::Result<T, Error>;
