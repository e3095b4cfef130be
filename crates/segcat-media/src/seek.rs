//! Timeline seeking.
//!
//! A seek picks the segment whose start is the last one at or before the
//! target, opens it, and asks it to seek within the window translated into
//! its own time. When that fails and the next segment also starts inside the
//! window, the next segment is tried once. A failed seek leaves the reader
//! exactly as it was.

use segcat_common::time::{SeekWindow, TIME_BASE_Q};
use tracing::{debug, warn};

use crate::demux::{SeekFlags, SegmentDemuxer, SegmentOpener};
use crate::error::{Error, Result};
use crate::reader::ConcatDemuxer;

impl<O: SegmentOpener> ConcatDemuxer<O> {
    /// Seek the virtual stream.
    ///
    /// With `stream` set, the window is in that output stream's time base;
    /// otherwise it is in microseconds. Clears a latched error.
    pub fn seek(&mut self, stream: Option<usize>, window: SeekWindow, flags: SeekFlags) -> Result<()> {
        if !self.catalog.is_seekable() {
            return Err(Error::NotSeekable);
        }
        if flags.intersects(SeekFlags::BYTE | SeekFlags::FRAME) {
            return Err(Error::UnsupportedSeek(format!("flags {:#x}", flags.bits())));
        }

        self.sticky_error = None;
        self.failed_opens = 0;

        let window = match stream {
            Some(index) => {
                let time_base = self
                    .streams
                    .get(index)
                    .map(|s| s.time_base)
                    .ok_or_else(|| Error::invalid_argument(format!("no output stream {}", index)))?;
                window.rescale(time_base, TIME_BASE_Q)
            }
            None => window,
        };

        let candidate = self.catalog.locate(window.target);
        debug!(?stream, target_us = window.target, candidate, "Seeking");

        let saved = self.active.take();
        match self.seek_from(candidate, stream, window, flags) {
            Ok(()) => {
                drop(saved);
                self.at_end = false;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Seek failed, restoring previous segment");
                self.active = saved;
                Err(err)
            }
        }
    }

    /// Seek to `target` microseconds with an unbounded window.
    pub fn seek_to(&mut self, target: i64) -> Result<()> {
        self.seek(None, SeekWindow::at(target), SeekFlags::NONE)
    }

    fn seek_from(
        &mut self,
        candidate: usize,
        stream: Option<usize>,
        window: SeekWindow,
        flags: SeekFlags,
    ) -> Result<()> {
        self.open_segment(candidate)?;
        let err = match self.try_seek(stream, window, flags) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };

        let next = candidate + 1;
        let next_in_window = self
            .catalog
            .get(next)
            .and_then(|seg| seg.start_time)
            .is_some_and(|start| start < window.max);
        if !next_in_window {
            return Err(err);
        }

        debug!(index = next, error = %err, "Retrying seek in next segment");
        self.open_segment(next)?;
        self.try_seek(stream, window, flags)
    }

    /// Translate `window` into the active segment's own time and seek it.
    fn try_seek(&mut self, stream: Option<usize>, window: SeekWindow, flags: SeekFlags) -> Result<()> {
        let active = self
            .active
            .as_mut()
            .ok_or_else(|| Error::invalid_argument("no active segment"))?;

        let start = self
            .catalog
            .get(active.index)
            .and_then(|seg| seg.start_time)
            .unwrap_or(0);
        let offset = start.saturating_sub(active.demuxer.start_time().unwrap_or(0));
        let mut local = window.shift_back(offset);

        if let Some(index) = stream {
            let time_base = active
                .demuxer
                .streams()
                .get(index)
                .map(|s| s.time_base)
                .ok_or(Error::StreamMissing {
                    segment: active.index,
                    stream: index,
                })?;
            local = local.rescale(TIME_BASE_Q, time_base);
        }

        active.demuxer.seek(stream, local, flags)
    }
}
