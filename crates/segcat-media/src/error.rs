//! Error types for segcat-media.

use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Result type for segcat-media operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for segcat-media operations.
///
/// Errors are `Clone` so a reader can latch one and hand out copies.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The descriptor could not be parsed.
    #[error(transparent)]
    Parse(#[from] segcat_parser::Error),

    /// A sourced location failed the safe-filename rule.
    #[error("Unsafe location: '{0}'")]
    UnsafeLocation(String),

    /// No segments to concatenate.
    #[error("Segment list is empty")]
    EmptyCatalog,

    /// Memory could not be reserved.
    #[error("Out of memory: {0}")]
    Resource(String),

    /// A segment could not be opened.
    #[error("Failed to open segment {index} ('{location}'): {reason}")]
    SegmentOpen {
        index: usize,
        location: String,
        reason: String,
    },

    /// Every segment has been played.
    #[error("End of concatenation")]
    EndOfConcatenation,

    /// Some segment duration is unknown.
    #[error("Timeline is not seekable")]
    NotSeekable,

    /// Byte and frame seeks are not supported.
    #[error("Unsupported seek: {0}")]
    UnsupportedSeek(String),

    /// Caller passed an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The opened segment has no stream with the requested index.
    #[error("Segment {segment} has no stream {stream}")]
    StreamMissing { segment: usize, stream: usize },

    /// The segment demuxer reported a failure.
    #[error("Demuxer error: {0}")]
    Demuxer(String),

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(Arc<io::Error>),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}

impl Error {
    /// Create a segment open error.
    pub fn segment_open(
        index: usize,
        location: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self::SegmentOpen {
            index,
            location: location.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a demuxer error.
    pub fn demuxer(msg: impl Into<String>) -> Self {
        Self::Demuxer(msg.into())
    }

    /// Create an invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Whether this error marks the normal end of the timeline.
    pub fn is_end_of_concatenation(&self) -> bool {
        matches!(self, Self::EndOfConcatenation)
    }
}
