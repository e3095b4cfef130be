//! Human and JSON renderings of a descriptor's timeline.

use segcat_common::time::format_timestamp;
use segcat_media::Catalog;
use segcat_parser::Script;
use serde::Serialize;
use std::fmt::Write;

/// One row of the timeline report.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRow {
    pub index: usize,
    pub location: String,
    pub line: Option<usize>,
    pub start_us: Option<i64>,
    pub duration_us: Option<i64>,
}

/// Timeline of a parsed descriptor.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineReport {
    pub segments: Vec<SegmentRow>,
    pub total_duration_us: Option<i64>,
    pub seekable: bool,
    pub has_version_header: bool,
    pub safety_active: bool,
}

impl TimelineReport {
    /// Build the report from a script and the catalog built from it.
    pub fn new(script: &Script, catalog: &Catalog) -> Self {
        let segments = catalog
            .segments()
            .iter()
            .enumerate()
            .map(|(index, seg)| SegmentRow {
                index,
                location: seg.location.clone(),
                line: script.entries.get(index).map(|e| e.line),
                start_us: seg.start_time,
                duration_us: seg.duration,
            })
            .collect();

        Self {
            segments,
            total_duration_us: catalog.total_duration(),
            seekable: catalog.is_seekable(),
            has_version_header: script.has_version_header,
            safety_active: script.safety_active,
        }
    }

    /// Render as an aligned text table.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:>5}  {:>16}  {:>16}  LOCATION", "#", "START", "DURATION");
        for row in &self.segments {
            let _ = writeln!(
                out,
                "{:>5}  {:>16}  {:>16}  {}",
                row.index,
                format_optional(row.start_us),
                format_optional(row.duration_us),
                row.location
            );
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Segments: {}", self.segments.len());
        let _ = writeln!(out, "Total duration: {}", format_optional(self.total_duration_us));
        let _ = writeln!(out, "Seekable: {}", if self.seekable { "yes" } else { "no" });
        out
    }
}

/// Where a seek to a timeline position lands.
#[derive(Debug, Clone, Serialize)]
pub struct LocateReport {
    pub target_us: i64,
    pub index: usize,
    pub location: String,
    pub segment_start_us: Option<i64>,
    pub offset_us: Option<i64>,
}

impl LocateReport {
    /// Locate `target_us` in `catalog`.
    pub fn new(catalog: &Catalog, target_us: i64) -> Option<Self> {
        let index = catalog.locate(target_us);
        let seg = catalog.get(index)?;
        Some(Self {
            target_us,
            index,
            location: seg.location.clone(),
            segment_start_us: seg.start_time,
            offset_us: seg.start_time.map(|start| target_us - start),
        })
    }

    /// Render as text.
    pub fn render_text(&self) -> String {
        format!(
            "{} -> segment {} ({}) at {}",
            format_timestamp(self.target_us),
            self.index,
            self.location,
            format_optional(self.offset_us)
        )
    }
}

fn format_optional(value: Option<i64>) -> String {
    value.map_or_else(|| "unknown".to_string(), format_timestamp)
}
