//! Sample sources consumed by the mixer
//!
//! Decoding and synthesis live outside this crate. The mixer only needs a
//! `Sampler`: something that reports the gains of the current tick and can
//! step forward. Stepping is destructive; a sampler is not restartable.

use tracker_volume::ChannelMatrix;

/// Playback position: whole sample index plus a fraction in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SamplePos {
    pub pos: i64,
    pub frac: f32,
}

impl SamplePos {
    pub fn new(pos: i64, frac: f32) -> Self {
        let mut out = Self { pos, frac: 0.0 };
        out.advance_by(frac);
        out
    }

    /// Move by `step` samples, carrying whole samples out of the fraction
    pub fn advance_by(&mut self, step: f32) {
        let total = self.frac as f64 + step as f64;
        let whole = total.floor();
        self.pos += whole as i64;
        self.frac = (total - whole) as f32;
        if self.frac >= 1.0 {
            // rounding on the f32 narrowing
            self.pos += 1;
            self.frac = 0.0;
        }
    }
}

/// A stateful source of per-tick channel gains
pub trait Sampler {
    /// Gains for the current tick; the channel count is the source's own
    fn sample(&self) -> ChannelMatrix;

    fn advance(&mut self);

    fn position(&self) -> SamplePos;

    /// Iterate `count` ticks, advancing after each one
    fn ticks(&mut self, count: usize) -> Ticks<'_, Self>
    where
        Self: Sized,
    {
        Ticks::new(self, count)
    }
}

impl<S: Sampler + ?Sized> Sampler for Box<S> {
    fn sample(&self) -> ChannelMatrix {
        (**self).sample()
    }

    fn advance(&mut self) {
        (**self).advance()
    }

    fn position(&self) -> SamplePos {
        (**self).position()
    }
}

/// Finite, destructive walk over a sampler
pub struct Ticks<'a, S: ?Sized> {
    sampler: &'a mut S,
    remaining: usize,
}

impl<'a, S: Sampler + ?Sized> Ticks<'a, S> {
    pub fn new(sampler: &'a mut S, count: usize) -> Self {
        Self {
            sampler,
            remaining: count,
        }
    }
}

impl<S: Sampler + ?Sized> Iterator for Ticks<'_, S> {
    type Item = ChannelMatrix;

    fn next(&mut self) -> Option<ChannelMatrix> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        let sample = self.sampler.sample();
        self.sampler.advance();
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<S: Sampler + ?Sized> ExactSizeIterator for Ticks<'_, S> {}

/// Random-access sample data addressed by position
pub trait SampleStream {
    fn sample_at(&self, pos: SamplePos) -> ChannelMatrix;
}

/// Steps through a `SampleStream` at a fixed period (samples per tick)
#[derive(Debug, Clone)]
pub struct StreamSampler<S> {
    stream: S,
    pos: SamplePos,
    period: f32,
}

impl<S: SampleStream> StreamSampler<S> {
    pub fn new(stream: S, start: SamplePos, period: f32) -> Self {
        Self {
            stream,
            pos: start,
            period,
        }
    }

    pub fn period(&self) -> f32 {
        self.period
    }

    pub fn set_period(&mut self, period: f32) {
        self.period = period;
    }
}

impl<S: SampleStream> Sampler for StreamSampler<S> {
    fn sample(&self) -> ChannelMatrix {
        self.stream.sample_at(self.pos)
    }

    fn advance(&mut self) {
        self.pos.advance_by(self.period);
    }

    fn position(&self) -> SamplePos {
        self.pos
    }
}

/// In-memory frames with nearest-frame lookup.
///
/// Positions outside the data read as the empty matrix, which mixes as
/// silence.
#[derive(Debug, Clone, Default)]
pub struct MatrixStream {
    frames: Vec<ChannelMatrix>,
}

impl MatrixStream {
    pub fn new(frames: Vec<ChannelMatrix>) -> Self {
        Self { frames }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl SampleStream for MatrixStream {
    fn sample_at(&self, pos: SamplePos) -> ChannelMatrix {
        usize::try_from(pos.pos)
            .ok()
            .and_then(|idx| self.frames.get(idx))
            .copied()
            .unwrap_or(ChannelMatrix::EMPTY)
    }
}
