//! Per-tick accumulation buffer and render conversion
//!
//! A `MixBuffer` holds one `ChannelMatrix` per output tick. Every slot
//! starts empty and takes the channel count of its first contribution.
//! Rendering scales by the mixer volume, converts each tick to the output
//! layout and quantizes with overflow protection.

use crate::error::{MixError, MixResult};
use crate::sampling::{Sampler, Ticks};
use tracker_volume::{BitDepth, ChannelMatrix, Sample, SpeakerLayout, Volume};

/// Request to mix a sampler into a buffer
pub struct SampleMixIn {
    pub sample: Box<dyn Sampler + Send>,
    pub static_volume: Volume,
    /// Per-output-channel gain, usually from a pan mixer
    pub volume_matrix: ChannelMatrix,
    /// First tick to write
    pub mix_pos: usize,
    /// Ticks to pull from `sample`
    pub mix_len: usize,
}

/// Premixed volume data awaiting conversion to the output format
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MixBuffer {
    slots: Vec<ChannelMatrix>,
}

impl MixBuffer {
    /// Buffer of `samples` empty ticks
    pub fn new(samples: usize) -> Self {
        Self {
            slots: vec![ChannelMatrix::EMPTY; samples],
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[ChannelMatrix] {
        &self.slots
    }

    /// Accumulated matrix for a tick; out-of-range ticks are empty
    pub fn get(&self, tick: usize) -> ChannelMatrix {
        self.slots.get(tick).copied().unwrap_or(ChannelMatrix::EMPTY)
    }

    /// Mix pre-rendered per-tick gains through `gain` starting at `offset`
    pub fn accumulate_segment(
        &mut self,
        offset: usize,
        frames: &[ChannelMatrix],
        gain: &ChannelMatrix,
    ) {
        self.accumulate_ticks(offset, frames.iter().copied(), gain);
    }

    /// Pull `len` ticks from `sampler` through `gain` starting at `offset`
    pub fn accumulate_sampler<S: Sampler + ?Sized>(
        &mut self,
        offset: usize,
        sampler: &mut S,
        len: usize,
        gain: &ChannelMatrix,
    ) {
        self.accumulate_ticks(offset, Ticks::new(sampler, len), gain);
    }

    /// Mix a queued request: the static volume scales the volume matrix
    pub fn mix_in_sample(&mut self, mut mix_in: SampleMixIn) {
        let gain = mix_in.volume_matrix.apply(mix_in.static_volume);
        self.accumulate_sampler(mix_in.mix_pos, &mut mix_in.sample, mix_in.mix_len, &gain);
    }

    fn accumulate_ticks<I>(&mut self, offset: usize, ticks: I, gain: &ChannelMatrix)
    where
        I: ExactSizeIterator<Item = ChannelMatrix>,
    {
        let total = ticks.len();
        let room = self.slots.len().saturating_sub(offset);
        if total > room {
            log::warn!(
                "dropping {} ticks past the end of a {}-tick mix buffer (offset {})",
                total - room,
                self.slots.len(),
                offset
            );
        }

        for (slot, sample) in self.slots.iter_mut().skip(offset).zip(ticks) {
            if sample.is_empty() {
                continue;
            }
            slot.accumulate(&gain.apply_to_matrix(&sample));
        }
    }

    /// Quantized samples of one tick, in output channel order.
    ///
    /// The tick is scaled by the mixer volume and converted to the layout
    /// first. Quantization clamps each channel, so a hot mix saturates.
    fn render_tick(
        &self,
        tick: usize,
        depth: BitDepth,
        channels: usize,
        mixer_volume: Volume,
    ) -> impl Iterator<Item = Sample> {
        let mixed = self.get(tick).apply(mixer_volume).to_channels(channels);
        (0..channels).map(move |ch| mixed.get(ch).quantize(depth))
    }

    /// Channel-interleaved little-endian bytes
    pub fn render_bytes(
        &self,
        samples: usize,
        depth: BitDepth,
        layout: SpeakerLayout,
        mixer_volume: Volume,
    ) -> Vec<u8> {
        let channels = layout.channel_count();
        let mut out = Vec::with_capacity(samples * channels * depth.bytes_per_sample());

        for tick in 0..samples {
            for sample in self.render_tick(tick, depth, channels, mixer_volume) {
                sample.extend_le(&mut out);
            }
        }
        out
    }

    /// Render into caller-owned buffers, continuing into the next buffer
    /// whenever the current one is full.
    ///
    /// Returns the number of bytes written. Running out of buffers is
    /// `MixError::OutputExhausted`; the bytes written before that are valid.
    pub fn render_into(
        &self,
        buffers: &mut [&mut [u8]],
        samples: usize,
        depth: BitDepth,
        layout: SpeakerLayout,
        mixer_volume: Volume,
    ) -> MixResult<usize> {
        let channels = layout.channel_count();
        let required = samples * channels * depth.bytes_per_sample();
        let mut cursor = OutputCursor::new(buffers);

        for tick in 0..samples {
            for sample in self.render_tick(tick, depth, channels, mixer_volume) {
                let bytes = sample.to_le_bytes();
                if !cursor.write(&bytes[..sample.byte_len()]) {
                    log::warn!(
                        "output buffers exhausted after {} of {} bytes",
                        cursor.written,
                        required
                    );
                    return Err(MixError::OutputExhausted {
                        written: cursor.written,
                        required,
                    });
                }
            }
        }
        Ok(cursor.written)
    }

    /// One `i32` array per output channel, ranged to `depth`
    pub fn render_int_stream(
        &self,
        samples: usize,
        depth: BitDepth,
        layout: SpeakerLayout,
        mixer_volume: Volume,
    ) -> Vec<Vec<i32>> {
        let channels = layout.channel_count();
        let mut planes: Vec<Vec<i32>> =
            (0..channels).map(|_| Vec::with_capacity(samples)).collect();

        for tick in 0..samples {
            let rendered = self.render_tick(tick, depth, channels, mixer_volume);
            for (plane, sample) in planes.iter_mut().zip(rendered) {
                plane.push(sample.to_i32());
            }
        }
        planes
    }
}

/// Byte cursor over a list of output buffers
struct OutputCursor<'a, 'b> {
    buffers: &'a mut [&'b mut [u8]],
    index: usize,
    pos: usize,
    written: usize,
}

impl<'a, 'b> OutputCursor<'a, 'b> {
    fn new(buffers: &'a mut [&'b mut [u8]]) -> Self {
        Self {
            buffers,
            index: 0,
            pos: 0,
            written: 0,
        }
    }

    /// Write all of `bytes`; false once every buffer is full
    fn write(&mut self, bytes: &[u8]) -> bool {
        for &byte in bytes {
            while self.index < self.buffers.len() && self.pos >= self.buffers[self.index].len() {
                self.index += 1;
                self.pos = 0;
            }
            let Some(out) = self.buffers.get_mut(self.index) else {
                return false;
            };
            out[self.pos] = byte;
            self.pos += 1;
            self.written += 1;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::{MatrixStream, SamplePos, StreamSampler};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn v(x: f32) -> Volume {
        Volume(x)
    }

    fn constant(value: f32, len: usize) -> Vec<ChannelMatrix> {
        vec![ChannelMatrix::mono(v(value)); len]
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer = MixBuffer::new(16);
        assert_eq!(buffer.len(), 16);
        assert!(buffer.slots().iter().all(ChannelMatrix::is_empty));
    }

    #[test]
    fn test_accumulate_segment_at_offset() {
        let mut buffer = MixBuffer::new(6);
        let gain = ChannelMatrix::stereo(v(1.0), v(0.5));
        buffer.accumulate_segment(2, &constant(0.5, 3), &gain);

        assert!(buffer.get(1).is_empty());
        assert_eq!(buffer.get(2), ChannelMatrix::stereo(v(0.5), v(0.25)));
        assert_eq!(buffer.get(4), ChannelMatrix::stereo(v(0.5), v(0.25)));
        assert!(buffer.get(5).is_empty());
    }

    #[test]
    fn test_accumulate_drops_ticks_past_end() {
        let mut buffer = MixBuffer::new(4);
        let gain = ChannelMatrix::mono(v(1.0));
        buffer.accumulate_segment(2, &constant(0.25, 10), &gain);

        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer.get(3), ChannelMatrix::mono(v(0.25)));

        buffer.accumulate_segment(9, &constant(0.25, 2), &gain);
        assert_eq!(buffer.get(3), ChannelMatrix::mono(v(0.25)));
    }

    #[test]
    fn test_accumulate_sampler_pulls_len_ticks() {
        let frames: Vec<ChannelMatrix> = (0..8)
            .map(|i| ChannelMatrix::mono(v(i as f32 / 8.0)))
            .collect();
        let mut sampler = StreamSampler::new(MatrixStream::new(frames), SamplePos::default(), 2.0);
        let mut buffer = MixBuffer::new(4);

        buffer.accumulate_sampler(1, &mut sampler, 3, &ChannelMatrix::mono(v(1.0)));

        assert!(buffer.get(0).is_empty());
        assert_eq!(buffer.get(1), ChannelMatrix::mono(v(0.0)));
        assert_eq!(buffer.get(2), ChannelMatrix::mono(v(0.25)));
        assert_eq!(buffer.get(3), ChannelMatrix::mono(v(0.5)));
        assert_eq!(sampler.position().pos, 6);
    }

    #[test]
    fn test_mix_in_sample_applies_static_volume() {
        let sampler = StreamSampler::new(
            MatrixStream::new(constant(0.5, 4)),
            SamplePos::default(),
            1.0,
        );
        let mut buffer = MixBuffer::new(4);
        buffer.mix_in_sample(SampleMixIn {
            sample: Box::new(sampler),
            static_volume: v(0.5),
            volume_matrix: ChannelMatrix::stereo(v(1.0), v(0.0)),
            mix_pos: 0,
            mix_len: 4,
        });

        for tick in 0..4 {
            assert_eq!(buffer.get(tick), ChannelMatrix::stereo(v(0.25), v(0.0)));
        }
    }

    #[test]
    fn test_accumulation_order_independent() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let gain = ChannelMatrix::stereo(v(0.75), v(0.25));
        let segments: Vec<(usize, Vec<ChannelMatrix>)> = (0..6)
            .map(|i| {
                // disjoint 8-tick windows
                let frames = (0..8)
                    .map(|_| ChannelMatrix::mono(v(rng.gen_range(-1.0..1.0))))
                    .collect();
                (i * 8, frames)
            })
            .collect();

        let mut forward = MixBuffer::new(48);
        for (offset, frames) in &segments {
            forward.accumulate_segment(*offset, frames, &gain);
        }
        let mut backward = MixBuffer::new(48);
        for (offset, frames) in segments.iter().rev() {
            backward.accumulate_segment(*offset, frames, &gain);
        }

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_render_bytes_interleaves_little_endian() {
        let mut buffer = MixBuffer::new(2);
        buffer.accumulate_segment(0, &constant(0.5, 2), &ChannelMatrix::stereo(v(1.0), v(-0.5)));

        let bytes = buffer.render_bytes(2, BitDepth::Bits16, SpeakerLayout::Stereo, Volume::UNITY);

        // 0.5 * 32678 = 16339 (0x3fd3), -0.25 * 32678 = -8169.5 -> -8169 (0xe017)
        assert_eq!(bytes, vec![0xd3, 0x3f, 0x17, 0xe0, 0xd3, 0x3f, 0x17, 0xe0]);
    }

    #[test]
    fn test_render_bytes_converts_layout_and_fills_silence() {
        let mut buffer = MixBuffer::new(3);
        buffer.accumulate_segment(0, &constant(1.0, 1), &ChannelMatrix::stereo(v(0.5), v(0.25)));

        let bytes = buffer.render_bytes(3, BitDepth::Bits8, SpeakerLayout::Mono, Volume::UNITY);

        // (0.5 + 0.25) / 2 * 128 = 48, then two silent ticks
        assert_eq!(bytes, vec![48, 0, 0]);
    }

    #[test]
    fn test_render_applies_mixer_volume_then_clamps() {
        let mut buffer = MixBuffer::new(1);
        buffer.accumulate_segment(0, &constant(0.75, 1), &ChannelMatrix::mono(v(1.0)));

        let quiet = buffer.render_int_stream(1, BitDepth::Bits16, SpeakerLayout::Mono, v(0.5));
        assert_eq!(quiet, vec![vec![12254]]);

        let loud = buffer.render_int_stream(1, BitDepth::Bits16, SpeakerLayout::Mono, v(4.0));
        assert_eq!(loud, vec![vec![32678]]);
    }

    #[test]
    fn test_render_nan_channel_is_silent() {
        let mut buffer = MixBuffer::new(1);
        let frame = ChannelMatrix::stereo(v(f32::NAN), v(0.5));
        buffer.accumulate_segment(0, &[frame], &ChannelMatrix::stereo(v(1.0), v(1.0)));

        let stereo = buffer.render_bytes(1, BitDepth::Bits16, SpeakerLayout::Stereo, Volume::UNITY);
        assert_eq!(stereo, vec![0x00, 0x00, 0xd3, 0x3f], "only the NaN channel drops out");

        // the down-mix averages NaN into the single channel
        let mono =
            buffer.render_int_stream(1, BitDepth::Bits16, SpeakerLayout::Mono, Volume::UNITY);
        assert_eq!(mono, vec![vec![0]]);
    }

    #[test]
    fn test_render_int_stream_per_channel() {
        let mut buffer = MixBuffer::new(2);
        buffer.accumulate_segment(0, &constant(1.0, 2), &ChannelMatrix::stereo(v(0.5), v(-0.5)));

        let planes =
            buffer.render_int_stream(2, BitDepth::Bits24, SpeakerLayout::Quad, Volume::UNITY);

        assert_eq!(planes.len(), 4);
        assert_eq!(planes[0], vec![4_194_304, 4_194_304]);
        assert_eq!(planes[1], vec![-4_194_304, -4_194_304]);
        assert_eq!(planes[2], planes[0]);
        assert_eq!(planes[3], planes[1]);
    }

    #[test]
    fn test_render_into_spills_across_buffers() {
        let mut buffer = MixBuffer::new(2);
        buffer.accumulate_segment(0, &constant(0.5, 2), &ChannelMatrix::stereo(v(1.0), v(-0.5)));
        let expected =
            buffer.render_bytes(2, BitDepth::Bits16, SpeakerLayout::Stereo, Volume::UNITY);

        let mut first = [0u8; 3];
        let mut second = [0u8; 0];
        let mut third = [0u8; 5];
        let mut outputs: [&mut [u8]; 3] = [&mut first, &mut second, &mut third];

        let written = buffer
            .render_into(&mut outputs, 2, BitDepth::Bits16, SpeakerLayout::Stereo, Volume::UNITY)
            .unwrap();

        assert_eq!(written, 8);
        let joined: Vec<u8> = first.iter().chain(third.iter()).copied().collect();
        assert_eq!(joined, expected);
    }

    #[test]
    fn test_render_into_reports_exhaustion() {
        let mut buffer = MixBuffer::new(4);
        buffer.accumulate_segment(0, &constant(0.5, 4), &ChannelMatrix::mono(v(1.0)));

        let mut only = [0u8; 5];
        let mut outputs: [&mut [u8]; 1] = [&mut only];

        let err = buffer
            .render_into(&mut outputs, 4, BitDepth::Bits16, SpeakerLayout::Mono, Volume::UNITY)
            .unwrap_err();

        assert!(matches!(
            err,
            MixError::OutputExhausted {
                written: 5,
                required: 8
            }
        ));
        assert_eq!(&only[..4], &[0xd3, 0x3f, 0xd3, 0x3f]);
        assert_eq!(only[4], 0xd3);
    }
}
