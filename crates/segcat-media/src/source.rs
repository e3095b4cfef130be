//! Out-of-band segment lists and per-open location overrides.
//!
//! A host application can hand the demuxer its segment list directly
//! through a [`CatalogSource`], bypassing descriptor parsing, and can swap
//! in a different location for a single open through a [`LocationOverride`]
//! (a freshly signed URL, for instance). Both are optional; without them the
//! descriptor text drives everything.

use std::fmt;

use segcat_common::paths::{is_safe_location, make_absolute};
use segcat_parser::{ParserConfig, SafeMode};
use tracing::{debug, warn};

use crate::catalog::{CatalogBuilder, Segment};
use crate::error::{Error, Result};

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// A borrowed location string with an optional release hook.
///
/// The hook runs exactly once, when the lease is dropped.
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use segcat_media::source::LocationLease;
///
/// let released = Arc::new(AtomicUsize::new(0));
/// let counter = released.clone();
/// let lease = LocationLease::with_release("https://cdn/a.ts?sig=1", move || {
///     counter.fetch_add(1, Ordering::SeqCst);
/// });
///
/// assert_eq!(lease.as_str(), "https://cdn/a.ts?sig=1");
/// drop(lease);
/// assert_eq!(released.load(Ordering::SeqCst), 1);
/// ```
pub struct LocationLease {
    location: String,
    release: Option<ReleaseHook>,
}

impl LocationLease {
    /// A lease with nothing to release.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            release: None,
        }
    }

    /// A lease that runs `release` when dropped.
    pub fn with_release(location: impl Into<String>, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            location: location.into(),
            release: Some(Box::new(release)),
        }
    }

    /// The leased location.
    pub fn as_str(&self) -> &str {
        &self.location
    }
}

impl fmt::Debug for LocationLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationLease")
            .field("location", &self.location)
            .field("release", &self.release.is_some())
            .finish()
    }
}

impl Drop for LocationLease {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

/// One entry produced by a [`CatalogSource`].
#[derive(Debug)]
pub struct SourcedSegment {
    /// Where the segment lives.
    pub location: LocationLease,
    /// Declared duration in microseconds.
    pub duration: Option<i64>,
}

/// Supplies the whole segment list in place of a descriptor.
pub trait CatalogSource {
    /// Number of segments, or `None` when the source has no list to offer.
    fn segment_count(&mut self) -> Option<usize>;

    /// The segment at `index`, or `None` if it cannot be produced.
    fn segment(&mut self, index: usize) -> Option<SourcedSegment>;
}

/// Substitutes the location used for a single segment open.
pub trait LocationOverride {
    /// A replacement location for segment `index`, if any.
    fn override_location(&mut self, index: usize) -> Option<LocationLease>;
}

/// Collect the segment list from `source`.
///
/// Returns `Ok(None)` when the source reports no positive count, in which
/// case the descriptor should be parsed instead. Entries the source cannot
/// produce are skipped. Sourced start times are always left unset.
pub fn sourced_catalog(
    source: &mut dyn CatalogSource,
    config: &ParserConfig,
) -> Result<Option<CatalogBuilder>> {
    let count = match source.segment_count() {
        Some(count) if count > 0 => count,
        _ => return Ok(None),
    };
    debug!(count, "Using out-of-band segment list");

    let mut builder = CatalogBuilder::new();
    for index in 0..count {
        let Some(entry) = source.segment(index) else {
            warn!(index, "Segment source produced no entry, skipping");
            continue;
        };

        let location = entry.location.as_str().to_string();
        drop(entry.location);

        if config.safe == SafeMode::On && !is_safe_location(&location) {
            return Err(Error::UnsafeLocation(location));
        }

        let location = make_absolute(config.base.as_deref(), &location);
        debug!(index, location = %location, duration_us = ?entry.duration, "Sourced segment");
        builder.try_push(Segment::new(location, entry.duration))?;
    }

    Ok(Some(builder))
}
