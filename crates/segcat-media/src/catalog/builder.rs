//! Catalog builder.

use segcat_parser::Script;
use tracing::info;

use super::{Catalog, Segment};
use crate::error::{Error, Result};

/// Builder for creating a catalog from declared segments.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    segments: Vec<Segment>,
}

impl CatalogBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a segment.
    pub fn segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    /// Add a segment, reporting allocation failure instead of aborting.
    pub fn try_push(&mut self, segment: Segment) -> Result<()> {
        self.segments
            .try_reserve(1)
            .map_err(|e| Error::Resource(e.to_string()))?;
        self.segments.push(segment);
        Ok(())
    }

    /// Add every entry of a parsed descriptor.
    pub fn script(mut self, script: &Script) -> Result<Self> {
        self.segments
            .try_reserve(script.entries.len())
            .map_err(|e| Error::Resource(e.to_string()))?;
        self.segments.extend(
            script
                .entries
                .iter()
                .map(|entry| Segment::new(entry.location.clone(), entry.duration)),
        );
        Ok(self)
    }

    /// Number of segments collected so far.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Whether no segments have been collected.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Build the catalog and its timeline.
    ///
    /// Unset start times follow the running clock, an explicit start resets
    /// it, and accumulation stops at the first unknown duration. The catalog
    /// is seekable only when the end of the list is reached.
    pub fn build(self) -> Result<Catalog> {
        let mut segments = self.segments;
        if segments.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut clock: i64 = 0;
        let mut complete = true;
        for seg in segments.iter_mut() {
            match seg.start_time {
                Some(start) => clock = start,
                None => seg.start_time = Some(clock),
            }
            match seg.duration {
                Some(d) => clock = clock.saturating_add(d),
                None => {
                    complete = false;
                    break;
                }
            }
        }

        let total_duration = complete.then_some(clock);
        info!(
            segments = segments.len(),
            seekable = complete,
            total_duration_us = ?total_duration,
            "Built segment catalog"
        );

        Ok(Catalog {
            segments,
            total_duration,
            seekable: complete,
        })
    }
}
