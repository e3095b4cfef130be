//! Segment catalog and virtual timeline.
//!
//! The catalog is the ordered list of segments that make up the virtual
//! stream. Start times that were not given explicitly are derived from the
//! predecessor's start and duration, on the common microsecond clock.
//! The timeline is seekable only when every duration is known at build time.

mod builder;

pub use builder::CatalogBuilder;

use tracing::warn;

#[cfg(feature = "serialize")]
use crate::error::Error;

/// One entry of the virtual timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Resolved absolute location.
    pub location: String,
    /// Start on the virtual timeline, in microseconds.
    pub start_time: Option<i64>,
    /// Duration in microseconds.
    pub duration: Option<i64>,
}

impl Segment {
    /// Create a segment with unset start time and the given duration.
    pub fn new(location: impl Into<String>, duration: Option<i64>) -> Self {
        Self {
            location: location.into(),
            start_time: None,
            duration,
        }
    }

    /// End on the virtual timeline, if both start and duration are known.
    pub fn end_time(&self) -> Option<i64> {
        Some(self.start_time?.saturating_add(self.duration?))
    }
}

/// Ordered segment list with derived timeline values.
///
/// With the `serialize` feature a catalog deserializes through
/// [`CatalogBuilder`]: only the segment locations and durations are read
/// back, and start times, total and seekability are derived again.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serialize", serde(try_from = "CatalogRecord"))]
pub struct Catalog {
    segments: Vec<Segment>,
    total_duration: Option<i64>,
    seekable: bool,
}

#[cfg(feature = "serialize")]
#[derive(serde::Deserialize)]
struct CatalogRecord {
    segments: Vec<Segment>,
}

#[cfg(feature = "serialize")]
impl TryFrom<CatalogRecord> for Catalog {
    type Error = Error;

    fn try_from(record: CatalogRecord) -> Result<Self, Error> {
        record
            .segments
            .into_iter()
            .fold(CatalogBuilder::new(), |builder, seg| {
                builder.segment(Segment::new(seg.location, seg.duration))
            })
            .build()
    }
}

impl Catalog {
    /// Create a new catalog builder.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    /// Get segment count.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether the catalog has no segments. Never true for a built catalog.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get a segment by index.
    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    /// All segments in timeline order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sum of all durations, fixed when the catalog was built.
    pub fn total_duration(&self) -> Option<i64> {
        self.total_duration
    }

    /// Whether every duration was known when the catalog was built.
    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// Index of the segment a seek to `ts` should open.
    ///
    /// This is the last segment whose start is at or before `ts`, so on a
    /// shared boundary the later segment wins. Timestamps before the first
    /// segment select index 0.
    pub fn locate(&self, ts: i64) -> usize {
        self.segments
            .partition_point(|seg| seg.start_time.is_some_and(|start| start <= ts))
            .saturating_sub(1)
    }

    /// Record a duration learned during playback.
    ///
    /// Only an unset duration is filled; returns whether it was. The cached
    /// total and seekability are left untouched.
    pub fn backfill_duration(&mut self, index: usize, duration: i64) -> bool {
        match self.segments.get_mut(index) {
            Some(seg) if seg.duration.is_none() => {
                seg.duration = Some(duration);
                true
            }
            _ => false,
        }
    }

    /// Resolve and return the start time of `index` as it is opened.
    ///
    /// An unset start is the predecessor's start plus its duration (0 for the
    /// first segment). When the predecessor's duration is still unknown its
    /// start is used and a warning is logged. Returns `None` for an index
    /// outside the catalog.
    pub fn resolve_start_time(&mut self, index: usize) -> Option<i64> {
        if index >= self.segments.len() {
            return None;
        }

        let first_unset = self.segments[..=index]
            .iter()
            .rposition(|seg| seg.start_time.is_some())
            .map_or(0, |i| i + 1);

        for i in first_unset..=index {
            let start = match i.checked_sub(1) {
                None => 0,
                Some(p) => {
                    let prev = &self.segments[p];
                    let prev_start = prev.start_time.unwrap_or(0);
                    match prev.duration {
                        Some(d) => prev_start.saturating_add(d),
                        None => {
                            warn!(
                                segment = i,
                                "Predecessor duration unknown, reusing its start time"
                            );
                            prev_start
                        }
                    }
                }
            };
            self.segments[i].start_time = Some(start);
        }

        self.segments[index].start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: i64 = 1_000_000;

    fn catalog(durations: &[Option<i64>]) -> Catalog {
        let mut builder = Catalog::builder();
        for (i, d) in durations.iter().enumerate() {
            builder = builder.segment(Segment::new(format!("{}.ts", i), *d));
        }
        builder.build().unwrap()
    }

    #[test]
    fn test_locate() {
        let cat = catalog(&[Some(10 * S), Some(20 * S), Some(5 * S)]);

        assert_eq!(cat.locate(-5 * S), 0);
        assert_eq!(cat.locate(0), 0);
        assert_eq!(cat.locate(9 * S), 0);
        assert_eq!(cat.locate(10 * S), 1);
        assert_eq!(cat.locate(25 * S), 1);
        assert_eq!(cat.locate(30 * S), 2);
        assert_eq!(cat.locate(100 * S), 2);
    }

    #[test]
    fn test_locate_ties_to_later_segment() {
        let cat = catalog(&[Some(10 * S), Some(0), Some(5 * S)]);
        assert_eq!(cat.locate(10 * S), 2);
    }

    #[test]
    fn test_backfill_does_not_change_seekability() {
        let mut cat = catalog(&[Some(10 * S), None]);
        assert!(!cat.is_seekable());

        assert!(cat.backfill_duration(1, 7 * S));
        assert_eq!(cat.get(1).unwrap().duration, Some(7 * S));
        assert!(!cat.is_seekable());
        assert_eq!(cat.total_duration(), None);

        assert!(!cat.backfill_duration(0, 3 * S));
        assert_eq!(cat.get(0).unwrap().duration, Some(10 * S));
        assert!(!cat.backfill_duration(9, S));
    }

    #[test]
    fn test_resolve_start_time() {
        let mut cat = catalog(&[None, None, None]);
        assert_eq!(cat.get(1).unwrap().start_time, None);

        cat.backfill_duration(0, 4 * S);
        assert_eq!(cat.resolve_start_time(1), Some(4 * S));

        cat.backfill_duration(1, 6 * S);
        assert_eq!(cat.resolve_start_time(2), Some(10 * S));
        assert_eq!(cat.resolve_start_time(3), None);
    }

    #[test]
    fn test_resolve_start_time_unknown_predecessor() {
        let mut cat = catalog(&[Some(5 * S), None, None]);
        assert_eq!(cat.get(1).unwrap().start_time, Some(5 * S));
        assert_eq!(cat.resolve_start_time(2), Some(5 * S));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_deserialize_rebuilds_timeline() {
        let cat: Catalog = serde_json::from_str(
            r#"{"segments":[
                {"location":"a.ts","start_time":null,"duration":null},
                {"location":"b.ts","start_time":null,"duration":null}
            ],"total_duration":5,"seekable":true}"#,
        )
        .unwrap();
        assert!(!cat.is_seekable());
        assert_eq!(cat.total_duration(), None);
        assert_eq!(cat.get(0).unwrap().start_time, Some(0));

        let cat: Catalog = serde_json::from_str(
            r#"{"segments":[
                {"location":"a.ts","start_time":70,"duration":4000000},
                {"location":"b.ts","duration":6000000}
            ]}"#,
        )
        .unwrap();
        assert!(cat.is_seekable());
        assert_eq!(cat.get(0).unwrap().start_time, Some(0));
        assert_eq!(cat.get(1).unwrap().start_time, Some(4 * S));
        assert_eq!(cat.total_duration(), Some(10 * S));
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn test_deserialize_empty_catalog_rejected() {
        let err = serde_json::from_str::<Catalog>(
            r#"{"segments":[],"total_duration":0,"seekable":true}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_segment_end_time() {
        let cat = catalog(&[Some(10 * S), None]);
        assert_eq!(cat.get(0).unwrap().end_time(), Some(10 * S));
        assert_eq!(cat.get(1).unwrap().end_time(), None);
    }
}
