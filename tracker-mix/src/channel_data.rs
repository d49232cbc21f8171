//! Playback segments handed to the mixer, one row at a time

use crate::sampling::Sampler;
use std::fmt;
use tracker_volume::{ChannelMatrix, Position, Volume};

/// Callback run before a segment is read, with mutable access to its data
pub type FlushFn = Box<dyn FnMut(&mut SegmentData) + Send>;

/// Where a segment's per-tick gains come from
#[derive(Default)]
pub enum SegmentData {
    #[default]
    Empty,
    /// Pre-rendered gains, one matrix per tick
    Frames(Vec<ChannelMatrix>),
    /// Gains pulled lazily, one tick at a time
    Sampler(Box<dyn Sampler + Send>),
}

impl fmt::Debug for SegmentData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SegmentData::Empty => f.write_str("Empty"),
            SegmentData::Frames(frames) => f.debug_tuple("Frames").field(&frames.len()).finish(),
            SegmentData::Sampler(sampler) => f
                .debug_tuple("Sampler")
                .field(&sampler.position())
                .finish(),
        }
    }
}

/// One playback segment of a channel
pub struct ChannelData {
    pub data: SegmentData,
    pub pan: Position,
    pub volume: Volume,
    /// Ticks this segment covers
    pub samples_len: usize,
    /// First tick of the segment in the destination buffer
    pub offset: usize,
    pub flush: Option<FlushFn>,
}

impl ChannelData {
    pub fn new(data: SegmentData, samples_len: usize) -> Self {
        Self {
            data,
            pan: Position::CENTER_AHEAD,
            volume: Volume::UNITY,
            samples_len,
            offset: 0,
            flush: None,
        }
    }

    /// Segment backed by pre-rendered frames; its length is the frame count
    pub fn from_frames(frames: Vec<ChannelMatrix>) -> Self {
        let len = frames.len();
        Self::new(SegmentData::Frames(frames), len)
    }

    pub fn from_sampler(sampler: impl Sampler + Send + 'static, samples_len: usize) -> Self {
        Self::new(SegmentData::Sampler(Box::new(sampler)), samples_len)
    }

    pub fn with_pan(mut self, pan: Position) -> Self {
        self.pan = pan;
        self
    }

    pub fn with_volume(mut self, volume: Volume) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_flush(mut self, flush: impl FnMut(&mut SegmentData) + Send + 'static) -> Self {
        self.flush = Some(Box::new(flush));
        self
    }

    /// Run the flush callback, if any
    pub fn run_flush(&mut self) {
        if let Some(flush) = self.flush.as_mut() {
            flush(&mut self.data);
        }
    }

    pub fn has_data(&self) -> bool {
        match &self.data {
            SegmentData::Empty => false,
            SegmentData::Frames(frames) => !frames.is_empty(),
            SegmentData::Sampler(_) => self.samples_len > 0,
        }
    }

    /// Lay out consecutive segments of one channel back to back starting at
    /// `start`. Returns the tick just past the last segment.
    pub fn chain_offsets(segments: &mut [ChannelData], start: usize) -> usize {
        segments.iter_mut().fold(start, |pos, segment| {
            segment.offset = pos;
            pos + segment.samples_len
        })
    }
}

impl fmt::Debug for ChannelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelData")
            .field("data", &self.data)
            .field("pan", &self.pan)
            .field("volume", &self.volume)
            .field("samples_len", &self.samples_len)
            .field("offset", &self.offset)
            .field("flush", &self.flush.is_some())
            .finish()
    }
}
