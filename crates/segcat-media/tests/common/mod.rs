//! Scripted in-memory segment demuxer for integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use bytes::Bytes;
use segcat_common::time::{Rational, SeekWindow};
use segcat_media::{
    Error, OpenOptions, Packet, Result, SeekFlags, SegmentDemuxer, SegmentOpener, StreamKind,
    StreamParams,
};

pub const S: i64 = 1_000_000;

/// Milliseconds, the stream time base used by mock segments.
pub const MS: Rational = Rational::new(1, 1000);

/// How a mock segment answers seek requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekBehavior {
    Accept,
    Reject,
}

/// Description of one mock segment.
#[derive(Debug, Clone)]
pub struct MockSegment {
    /// Intrinsic start time in microseconds.
    pub start_time: Option<i64>,
    /// Reported duration in microseconds.
    pub duration: Option<i64>,
    /// Packet pts values in milliseconds, all on stream 0.
    pub packets: Vec<i64>,
    pub seek: SeekBehavior,
    /// Number of stream the segment exposes.
    pub stream_count: usize,
}

impl MockSegment {
    /// A segment starting at 0 with packets every `step_ms` up to `duration`.
    pub fn new(duration: i64, step_ms: i64) -> Self {
        let packets = (0..duration / 1000).step_by(step_ms as usize).collect();
        Self {
            start_time: Some(0),
            duration: Some(duration),
            packets,
            seek: SeekBehavior::Accept,
            stream_count: 1,
        }
    }

    pub fn start_time(mut self, start: i64) -> Self {
        let shift_ms = start / 1000;
        self.packets.iter_mut().for_each(|pts| *pts += shift_ms);
        self.start_time = Some(start);
        self
    }

    pub fn unknown_duration(mut self) -> Self {
        self.duration = None;
        self
    }

    pub fn reject_seeks(mut self) -> Self {
        self.seek = SeekBehavior::Reject;
        self
    }
}

/// Shared record of everything the mock saw.
#[derive(Debug, Default)]
pub struct MockLog {
    pub opens: RefCell<Vec<String>>,
    pub seeks: RefCell<Vec<(String, Option<usize>, SeekWindow)>>,
    pub timeouts: RefCell<Vec<Option<Duration>>>,
    pub live_handles: Cell<usize>,
}

impl MockLog {
    pub fn open_count(&self, location: &str) -> usize {
        self.opens.borrow().iter().filter(|l| *l == location).count()
    }

    pub fn total_opens(&self) -> usize {
        self.opens.borrow().len()
    }

    pub fn last_seek(&self) -> Option<(String, Option<usize>, SeekWindow)> {
        self.seeks.borrow().last().cloned()
    }
}

/// Opener over a fixed table of mock segments.
pub struct MockOpener {
    segments: HashMap<String, MockSegment>,
    failures: HashMap<String, usize>,
    pub log: Rc<MockLog>,
}

impl MockOpener {
    pub fn new() -> Self {
        Self {
            segments: HashMap::new(),
            failures: HashMap::new(),
            log: Rc::new(MockLog::default()),
        }
    }

    pub fn segment(mut self, location: &str, segment: MockSegment) -> Self {
        self.segments.insert(location.to_string(), segment);
        self
    }

    /// Make the first `times` opens of `location` fail.
    pub fn fail_opens(mut self, location: &str, times: usize) -> Self {
        self.failures.insert(location.to_string(), times);
        self
    }

    /// The standard three-segment timeline: durations 10 s, 20 s, 15 s.
    pub fn three_segments() -> Self {
        Self::new()
            .segment("a.ts", MockSegment::new(10 * S, 5000))
            .segment("b.ts", MockSegment::new(20 * S, 5000))
            .segment("c.ts", MockSegment::new(15 * S, 5000))
    }
}

impl SegmentOpener for MockOpener {
    type Demuxer = MockDemuxer;

    fn open(&mut self, location: &str, options: &OpenOptions) -> Result<MockDemuxer> {
        self.log.opens.borrow_mut().push(location.to_string());
        self.log.timeouts.borrow_mut().push(options.timeout);

        if let Some(remaining) = self.failures.get_mut(location) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(Error::demuxer("connection refused"));
            }
        }

        let segment = self
            .segments
            .get(location)
            .cloned()
            .ok_or_else(|| Error::demuxer(format!("no such segment: {}", location)))?;

        self.log.live_handles.set(self.log.live_handles.get() + 1);
        Ok(MockDemuxer {
            location: location.to_string(),
            streams: Vec::new(),
            segment,
            position: 0,
            log: self.log.clone(),
        })
    }
}

/// Demuxer over one mock segment.
pub struct MockDemuxer {
    location: String,
    streams: Vec<StreamParams>,
    segment: MockSegment,
    position: usize,
    log: Rc<MockLog>,
}

impl SegmentDemuxer for MockDemuxer {
    fn probe_streams(&mut self) -> Result<()> {
        self.streams = (0..self.segment.stream_count)
            .map(|i| {
                let mut params = StreamParams::new(i, StreamKind::Video, "h264", MS);
                params.extradata = Bytes::from_static(&[0x01, 0x64, 0x00, 0x1f]);
                params.avg_frame_rate = Rational::new(25, 1);
                params
            })
            .collect();
        Ok(())
    }

    fn streams(&self) -> &[StreamParams] {
        &self.streams
    }

    fn start_time(&self) -> Option<i64> {
        self.segment.start_time
    }

    fn duration(&self) -> Option<i64> {
        self.segment.duration
    }

    fn read_packet(&mut self) -> Result<Option<Packet>> {
        let Some(&pts) = self.segment.packets.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        Ok(Some(Packet {
            stream_index: 0,
            pts: Some(pts),
            dts: Some(pts),
            duration: 40,
            keyframe: true,
            data: Bytes::from_static(b"frame"),
        }))
    }

    fn seek(&mut self, stream: Option<usize>, window: SeekWindow, _flags: SeekFlags) -> Result<()> {
        self.log
            .seeks
            .borrow_mut()
            .push((self.location.clone(), stream, window));
        match self.segment.seek {
            SeekBehavior::Accept => {
                let target_ms = match stream {
                    Some(_) => window.target,
                    None => window.target / 1000,
                };
                self.position = self
                    .segment
                    .packets
                    .partition_point(|&pts| pts < target_ms);
                Ok(())
            }
            SeekBehavior::Reject => Err(Error::demuxer("no keyframe in window")),
        }
    }
}

impl Drop for MockDemuxer {
    fn drop(&mut self) {
        self.log.live_handles.set(self.log.live_handles.get() - 1);
    }
}

/// Descriptor for the three-segment timeline.
pub const THREE_SEGMENTS: &str = "ffconcat version 1.0\n\
    file a.ts\nduration 10\n\
    file b.ts\nduration 20\n\
    file c.ts\nduration 15\n";
