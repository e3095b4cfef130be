//! Segcat-Media: Virtual concatenation of media segments
//!
//! This crate presents an ordered list of independently encoded segments as
//! one seamless, seekable stream without re-encoding.
//!
//! # Modules
//!
//! - `catalog` - Segment list and virtual timeline (start times, total duration, seekability)
//! - `source` - Out-of-band segment lists and per-open location overrides
//! - `demux` - Interface to the per-segment demuxer, packets and stream parameters
//! - `reader` - Active-segment reader that stitches packets across boundaries
//! - `seek` - Timeline seeking with boundary fallback and rollback
//!
//! # Architecture
//!
//! A stream is opened in three steps:
//!
//! 1. The segment list comes from a [`source::CatalogSource`] or, failing
//!    that, from parsing the descriptor
//! 2. The catalog derives start times and decides whether the timeline is
//!    seekable
//! 3. Segment 0 is opened; its streams become the output streams
//!
//! While reading, each packet's timestamps are shifted by the segment's
//! timeline start minus the segment's own start time, so timestamps stay
//! continuous across segment boundaries.
//!
//! # Examples
//!
//! ```
//! use segcat_media::Catalog;
//! use segcat_parser::parse;
//!
//! let script = parse("file a.ts\nduration 10\nfile b.ts\nduration 20\nfile c.ts\nduration 15\n").unwrap();
//! let catalog = Catalog::builder().script(&script).unwrap().build().unwrap();
//!
//! assert!(catalog.is_seekable());
//! assert_eq!(catalog.total_duration(), Some(45_000_000));
//! assert_eq!(catalog.locate(25_000_000), 1);
//! ```

pub mod catalog;
pub mod demux;
pub mod error;
pub mod reader;
pub mod seek;
pub mod source;

pub use catalog::{Catalog, CatalogBuilder, Segment};
pub use demux::{
    InterruptToken, OpenOptions, Packet, SeekFlags, SegmentDemuxer, SegmentOpener, StreamKind,
    StreamParams,
};
pub use error::{Error, Result};
pub use reader::{ConcatDemuxer, ConcatDemuxerBuilder, Packets, ReaderState, MAX_OPEN_ATTEMPTS};
pub use segcat_common::time::SeekWindow;
pub use source::{CatalogSource, LocationLease, LocationOverride, SourcedSegment};
