//! Interface to the per-segment demuxer.
//!
//! Container and codec parsing for a single segment lives outside this
//! crate. A [`SegmentOpener`] turns a location into a [`SegmentDemuxer`],
//! which reports its streams, yields packets and seeks locally.

use std::fmt;
use std::ops::BitOr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use segcat_common::time::{Rational, SeekWindow};

use crate::error::Result;

/// Media type of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Data,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => write!(f, "video"),
            Self::Audio => write!(f, "audio"),
            Self::Subtitle => write!(f, "subtitle"),
            Self::Data => write!(f, "data"),
        }
    }
}

/// Parameters of one elementary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct StreamParams {
    /// Stream index within its container.
    pub index: usize,
    /// Media type.
    pub kind: StreamKind,
    /// Codec name.
    pub codec: String,
    /// Codec-specific setup data (SPS/PPS, AudioSpecificConfig, ...).
    pub extradata: Bytes,
    /// Unit of the stream's timestamps.
    pub time_base: Rational,
    /// Base frame rate.
    pub r_frame_rate: Rational,
    /// Average frame rate.
    pub avg_frame_rate: Rational,
    /// Sample aspect ratio.
    pub sample_aspect_ratio: Rational,
}

impl StreamParams {
    /// Create stream parameters with unset rates and no extradata.
    pub fn new(index: usize, kind: StreamKind, codec: impl Into<String>, time_base: Rational) -> Self {
        Self {
            index,
            kind,
            codec: codec.into(),
            extradata: Bytes::new(),
            time_base,
            r_frame_rate: Rational::default(),
            avg_frame_rate: Rational::default(),
            sample_aspect_ratio: Rational::default(),
        }
    }
}

/// A compressed media packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Index of the stream the packet belongs to.
    pub stream_index: usize,
    /// Presentation timestamp in the stream time base.
    pub pts: Option<i64>,
    /// Decoding timestamp in the stream time base.
    pub dts: Option<i64>,
    /// Duration in the stream time base.
    pub duration: i64,
    /// Whether the packet starts a keyframe.
    pub keyframe: bool,
    /// Payload.
    pub data: Bytes,
}

impl Packet {
    /// Shift known timestamps by `delta` ticks.
    pub fn offset_timestamps(&mut self, delta: i64) {
        if let Some(pts) = self.pts.as_mut() {
            *pts = pts.saturating_add(delta);
        }
        if let Some(dts) = self.dts.as_mut() {
            *dts = dts.saturating_add(delta);
        }
    }
}

/// Seek behaviour flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeekFlags(u32);

impl SeekFlags {
    /// No flags.
    pub const NONE: Self = Self(0);
    /// Prefer positions at or before the target.
    pub const BACKWARD: Self = Self(1);
    /// Seek by byte offset.
    pub const BYTE: Self = Self(2);
    /// Allow non-keyframe positions.
    pub const ANY: Self = Self(4);
    /// Seek by frame number.
    pub const FRAME: Self = Self(8);

    /// Raw flag bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether every flag in `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether any flag in `other` is set.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for SeekFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Shared cancellation flag handed to every segment open.
///
/// The concatenation core only forwards it; segment demuxers poll it.
#[derive(Debug, Clone, Default)]
pub struct InterruptToken(Arc<AtomicBool>);

impl InterruptToken {
    /// Create an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of blocking work.
    pub fn interrupt(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_interrupted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options forwarded unchanged to every segment open.
#[derive(Debug, Clone, Default)]
pub struct OpenOptions {
    /// Socket timeout for network locations.
    pub timeout: Option<Duration>,
    /// Cancellation flag.
    pub interrupt: InterruptToken,
}

/// Opens segments by location.
pub trait SegmentOpener {
    /// Demuxer type produced by this opener.
    type Demuxer: SegmentDemuxer;

    /// Open the segment at `location`.
    fn open(&mut self, location: &str, options: &OpenOptions) -> Result<Self::Demuxer>;
}

/// A demuxer for one opened segment.
pub trait SegmentDemuxer {
    /// Read enough of the segment to learn its stream parameters.
    fn probe_streams(&mut self) -> Result<()>;

    /// Streams of this segment.
    fn streams(&self) -> &[StreamParams];

    /// First timestamp of the segment, in microseconds.
    fn start_time(&self) -> Option<i64>;

    /// Duration of the segment, in microseconds.
    fn duration(&self) -> Option<i64>;

    /// Read the next packet; `None` at the end of the segment.
    fn read_packet(&mut self) -> Result<Option<Packet>>;

    /// Seek within the segment.
    ///
    /// With `stream` set the window is in that stream's time base, otherwise
    /// in microseconds.
    fn seek(&mut self, stream: Option<usize>, window: SeekWindow, flags: SeekFlags) -> Result<()>;
}
