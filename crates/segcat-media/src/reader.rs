//! Active-segment reader.
//!
//! [`ConcatDemuxer`] owns the catalog and at most one open segment. Packets
//! are pulled from the active segment; when it ends the next catalog entry is
//! opened and packet timestamps are shifted onto the virtual timeline.

use std::fmt;
use std::io::BufRead;
use std::time::Duration;

use segcat_common::time::{rescale_q, TIME_BASE_Q};
use segcat_parser::{Parser, ParserConfig, Script};
use tracing::{debug, error, warn};

use crate::catalog::{Catalog, CatalogBuilder};
use crate::demux::{InterruptToken, OpenOptions, Packet, SegmentDemuxer, SegmentOpener, StreamParams};
use crate::error::{Error, Result};
use crate::source::{sourced_catalog, CatalogSource, LocationOverride};

/// Consecutive failed opens tolerated while advancing before the error is latched.
pub const MAX_OPEN_ATTEMPTS: u32 = 3;

/// Observable reader state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// No segment is open.
    Unopened,
    /// Reading from the segment at `index`.
    Active { index: usize },
    /// The timeline ended or an error was latched.
    Exhausted,
}

pub(crate) struct ActiveSegment<D> {
    pub(crate) index: usize,
    pub(crate) demuxer: D,
}

/// Builder for opening a [`ConcatDemuxer`].
pub struct ConcatDemuxerBuilder<O> {
    opener: O,
    config: ParserConfig,
    options: OpenOptions,
    source: Option<Box<dyn CatalogSource>>,
    overrides: Option<Box<dyn LocationOverride>>,
}

impl<O: SegmentOpener> ConcatDemuxerBuilder<O> {
    fn new(opener: O) -> Self {
        Self {
            opener,
            config: ParserConfig::default(),
            options: OpenOptions::default(),
            source: None,
            overrides: None,
        }
    }

    /// Set the descriptor parser configuration.
    pub fn parser_config(mut self, config: ParserConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the options forwarded to every segment open.
    pub fn options(mut self, options: OpenOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the socket timeout forwarded to every segment open.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    /// Set the interrupt token forwarded to every segment open.
    pub fn interrupt(mut self, token: InterruptToken) -> Self {
        self.options.interrupt = token;
        self
    }

    /// Consult `source` for the segment list before parsing the descriptor.
    pub fn catalog_source(mut self, source: impl CatalogSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Consult `overrides` before every segment open.
    pub fn location_override(mut self, overrides: impl LocationOverride + 'static) -> Self {
        self.overrides = Some(Box::new(overrides));
        self
    }

    /// Open a descriptor held in memory.
    pub fn open_str(mut self, descriptor: &str) -> Result<ConcatDemuxer<O>> {
        let catalog = self.resolve_catalog(|parser| parser.parse(descriptor))?;
        self.open_catalog(catalog)
    }

    /// Open a descriptor read line by line from `reader`.
    ///
    /// The reader is left untouched when a catalog source supplies the list.
    pub fn open_reader<R: BufRead>(mut self, reader: R) -> Result<ConcatDemuxer<O>> {
        let catalog = self.resolve_catalog(|parser| parser.parse_reader(reader))?;
        self.open_catalog(catalog)
    }

    /// Open a catalog built by the caller.
    ///
    /// Segment 0 is opened immediately and defines the output streams; a
    /// failure here is returned as is, without retrying.
    pub fn open_catalog(self, catalog: Catalog) -> Result<ConcatDemuxer<O>> {
        let mut demuxer = ConcatDemuxer {
            opener: self.opener,
            options: self.options,
            overrides: self.overrides,
            catalog,
            streams: Vec::new(),
            active: None,
            sticky_error: None,
            failed_opens: 0,
            at_end: false,
        };

        demuxer.open_segment(0)?;
        if let Some(active) = demuxer.active.as_ref() {
            demuxer.streams = active.demuxer.streams().to_vec();
        }
        debug!(streams = demuxer.streams.len(), "Output streams taken from segment 0");

        Ok(demuxer)
    }

    fn resolve_catalog<F>(&mut self, parse: F) -> Result<Catalog>
    where
        F: FnOnce(&Parser) -> segcat_parser::Result<Script>,
    {
        if let Some(source) = self.source.as_deref_mut() {
            if let Some(builder) = sourced_catalog(source, &self.config)? {
                return builder.build();
            }
        }

        let script = parse(&Parser::new(self.config.clone()))?;
        CatalogBuilder::new().script(&script)?.build()
    }
}

impl<O> fmt::Debug for ConcatDemuxerBuilder<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcatDemuxerBuilder")
            .field("config", &self.config)
            .field("options", &self.options)
            .field("source", &self.source.is_some())
            .field("overrides", &self.overrides.is_some())
            .finish_non_exhaustive()
    }
}

/// Presents a list of segments as one continuous stream.
pub struct ConcatDemuxer<O: SegmentOpener> {
    opener: O,
    options: OpenOptions,
    overrides: Option<Box<dyn LocationOverride>>,
    pub(crate) catalog: Catalog,
    pub(crate) streams: Vec<StreamParams>,
    pub(crate) active: Option<ActiveSegment<O::Demuxer>>,
    pub(crate) sticky_error: Option<Error>,
    pub(crate) failed_opens: u32,
    pub(crate) at_end: bool,
}

impl<O: SegmentOpener> fmt::Debug for ConcatDemuxer<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConcatDemuxer")
            .field("catalog", &self.catalog)
            .field("streams", &self.streams.len())
            .field("active", &self.active.as_ref().map(|active| active.index))
            .field("sticky_error", &self.sticky_error)
            .field("failed_opens", &self.failed_opens)
            .field("at_end", &self.at_end)
            .finish_non_exhaustive()
    }
}

impl<O: SegmentOpener> ConcatDemuxer<O> {
    /// Start configuring a demuxer that opens segments with `opener`.
    pub fn builder(opener: O) -> ConcatDemuxerBuilder<O> {
        ConcatDemuxerBuilder::new(opener)
    }

    /// Open a descriptor with default settings.
    pub fn open(opener: O, descriptor: &str) -> Result<Self> {
        Self::builder(opener).open_str(descriptor)
    }

    /// The catalog, including start times and durations learned so far.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Output streams, as reported by segment 0.
    pub fn streams(&self) -> &[StreamParams] {
        &self.streams
    }

    /// Total duration in microseconds, when every duration was declared.
    pub fn duration(&self) -> Option<i64> {
        self.catalog.total_duration()
    }

    /// Current reader state.
    pub fn state(&self) -> ReaderState {
        if self.sticky_error.is_some() || self.at_end {
            return ReaderState::Exhausted;
        }
        match &self.active {
            Some(active) => ReaderState::Active {
                index: active.index,
            },
            None => ReaderState::Unopened,
        }
    }

    /// Read the next packet of the virtual stream.
    ///
    /// Returns [`Error::EndOfConcatenation`] once the last segment ends.
    pub fn next_packet(&mut self) -> Result<Packet> {
        if let Some(err) = &self.sticky_error {
            return Err(err.clone());
        }

        loop {
            let active = self
                .active
                .as_mut()
                .ok_or_else(|| Error::invalid_argument("demuxer is closed"))?;

            let Some(mut packet) = active.demuxer.read_packet()? else {
                self.advance()?;
                continue;
            };

            let start = self
                .catalog
                .get(active.index)
                .and_then(|seg| seg.start_time)
                .unwrap_or(0);
            let offset = start.saturating_sub(active.demuxer.start_time().unwrap_or(0));
            let time_base = active
                .demuxer
                .streams()
                .get(packet.stream_index)
                .map(|stream| stream.time_base)
                .ok_or(Error::StreamMissing {
                    segment: active.index,
                    stream: packet.stream_index,
                })?;
            if !time_base.is_positive() {
                return Err(Error::demuxer(format!(
                    "stream {} has invalid time base {}",
                    packet.stream_index, time_base
                )));
            }

            packet.offset_timestamps(rescale_q(offset, TIME_BASE_Q, time_base));
            return Ok(packet);
        }
    }

    /// Iterate over packets until the end of the timeline.
    ///
    /// The iterator yields at most one error and then stops.
    pub fn packets(&mut self) -> Packets<'_, O> {
        Packets {
            demuxer: self,
            done: false,
        }
    }

    /// Close the active segment.
    pub fn close(&mut self) {
        if let Some(active) = self.active.take() {
            debug!(index = active.index, "Closing segment");
        }
        self.at_end = false;
    }

    /// Open catalog entry `index` and make it active.
    ///
    /// The previous segment is dropped only after the new one opened and
    /// reported its streams.
    pub(crate) fn open_segment(&mut self, index: usize) -> Result<()> {
        let segment = self
            .catalog
            .get(index)
            .ok_or_else(|| Error::invalid_argument(format!("segment {} out of range", index)))?;

        let lease = self
            .overrides
            .as_mut()
            .and_then(|overrides| overrides.override_location(index));
        let location = lease.as_ref().map_or(segment.location.as_str(), |l| l.as_str());
        debug!(index, location, "Opening segment");

        let opened = self
            .opener
            .open(location, &self.options)
            .and_then(|mut demuxer| {
                demuxer.probe_streams()?;
                Ok(demuxer)
            });
        drop(lease);

        let demuxer = opened.map_err(|err| {
            error!(index, location = %segment.location, error = %err, "Impossible to open segment");
            Error::segment_open(index, segment.location.as_str(), err)
        })?;

        self.active = Some(ActiveSegment { index, demuxer });
        self.catalog.resolve_start_time(index);
        Ok(())
    }

    /// Move past the segment that just ended.
    fn advance(&mut self) -> Result<()> {
        let (current, reported) = match &self.active {
            Some(active) => (active.index, active.demuxer.duration()),
            None => return Err(Error::invalid_argument("demuxer is closed")),
        };

        if let Some(duration) = reported {
            if self.catalog.backfill_duration(current, duration) {
                debug!(index = current, duration_us = duration, "Back-filled segment duration");
            }
        }

        let next = current + 1;
        if next >= self.catalog.len() {
            self.at_end = true;
            return Err(Error::EndOfConcatenation);
        }

        loop {
            match self.open_segment(next) {
                Ok(()) => {
                    self.failed_opens = 0;
                    return Ok(());
                }
                Err(err) => {
                    self.failed_opens += 1;
                    warn!(
                        index = next,
                        attempt = self.failed_opens,
                        error = %err,
                        "Failed to open next segment"
                    );
                    if self.failed_opens >= MAX_OPEN_ATTEMPTS {
                        self.sticky_error = Some(err.clone());
                        return Err(err);
                    }
                }
            }
        }
    }
}

/// Iterator over the packets of a [`ConcatDemuxer`].
pub struct Packets<'a, O: SegmentOpener> {
    demuxer: &'a mut ConcatDemuxer<O>,
    done: bool,
}

impl<O: SegmentOpener> fmt::Debug for Packets<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Packets")
            .field("demuxer", &self.demuxer)
            .field("done", &self.done)
            .finish()
    }
}

impl<O: SegmentOpener> Iterator for Packets<'_, O> {
    type Item = Result<Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.demuxer.next_packet() {
            Ok(packet) => Some(Ok(packet)),
            Err(Error::EndOfConcatenation) => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
