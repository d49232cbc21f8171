//! Row flattening: many channel segments into one output buffer

use crate::channel_data::{ChannelData, SegmentData};
use crate::error::MixResult;
use crate::mix_buffer::MixBuffer;
use crate::pan_mixer::PanMixer;
use tracker_volume::{BitDepth, SpeakerLayout, Volume};

/// Output format of a mixer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixerConfig {
    pub channels: usize,
    pub bits_per_sample: u32,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self {
            channels: 2,
            bits_per_sample: 16,
        }
    }
}

/// Mixes single- and multi-channel segments into one multi-channel stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mixer {
    layout: SpeakerLayout,
    bit_depth: BitDepth,
}

impl Mixer {
    /// Validate `config` into a mixer
    pub fn new(config: MixerConfig) -> MixResult<Self> {
        Ok(Self {
            layout: SpeakerLayout::try_from(config.channels)?,
            bit_depth: BitDepth::try_from(config.bits_per_sample)?,
        })
    }

    pub fn layout(&self) -> SpeakerLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channel_count()
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }

    /// Bytes per interleaved output frame
    pub fn frame_size(&self) -> usize {
        self.channels() * self.bit_depth.bytes_per_sample()
    }

    pub fn new_mix_buffer(&self, samples: usize) -> MixBuffer {
        MixBuffer::new(samples)
    }

    /// Accumulate every segment of `row` into a fresh buffer.
    ///
    /// Each segment is flushed first, then mixed through the pan mixer's
    /// matrix for its position scaled by its static volume.
    pub fn accumulate_row<P>(
        &self,
        pan_mixer: &P,
        samples: usize,
        row: &mut [ChannelData],
    ) -> MixBuffer
    where
        P: PanMixer + ?Sized,
    {
        log::debug!(
            "flattening {} segments into {} ticks ({} -> {:?})",
            row.len(),
            samples,
            pan_mixer.channel_count(),
            self.layout
        );

        let mut buffer = self.new_mix_buffer(samples);
        for segment in row.iter_mut() {
            segment.run_flush();
            if !segment.has_data() {
                continue;
            }

            let gain = pan_mixer.mixing_matrix(segment.pan).apply(segment.volume);
            let len = segment.samples_len;
            match &mut segment.data {
                SegmentData::Frames(frames) => {
                    let take = len.min(frames.len());
                    buffer.accumulate_segment(segment.offset, &frames[..take], &gain);
                }
                SegmentData::Sampler(sampler) => {
                    buffer.accumulate_sampler(segment.offset, sampler, len, &gain);
                }
                SegmentData::Empty => {}
            }
        }
        buffer
    }

    /// Final saturating mix of a row into interleaved little-endian bytes
    pub fn flatten<P>(
        &self,
        pan_mixer: &P,
        samples: usize,
        row: &mut [ChannelData],
        mixer_volume: Volume,
    ) -> Vec<u8>
    where
        P: PanMixer + ?Sized,
    {
        self.accumulate_row(pan_mixer, samples, row)
            .render_bytes(samples, self.bit_depth, self.layout, mixer_volume)
    }

    /// Flatten into one `i32` array per output channel, ranged to the bit depth
    pub fn flatten_to_ints<P>(
        &self,
        pan_mixer: &P,
        samples: usize,
        row: &mut [ChannelData],
        mixer_volume: Volume,
    ) -> Vec<Vec<i32>>
    where
        P: PanMixer + ?Sized,
    {
        self.accumulate_row(pan_mixer, samples, row)
            .render_int_stream(samples, self.bit_depth, self.layout, mixer_volume)
    }

    /// Flatten into caller-owned buffers; see `MixBuffer::render_into`
    pub fn flatten_to<P>(
        &self,
        buffers: &mut [&mut [u8]],
        pan_mixer: &P,
        samples: usize,
        row: &mut [ChannelData],
        mixer_volume: Volume,
    ) -> MixResult<usize>
    where
        P: PanMixer + ?Sized,
    {
        self.accumulate_row(pan_mixer, samples, row)
            .render_into(buffers, samples, self.bit_depth, self.layout, mixer_volume)
    }

    /// Flatten independent rows in parallel, one output per row
    pub fn flatten_rows<P>(
        &self,
        pan_mixer: &P,
        samples: usize,
        rows: &mut [Vec<ChannelData>],
        mixer_volume: Volume,
    ) -> Vec<Vec<u8>>
    where
        P: PanMixer + ?Sized,
    {
        use rayon::prelude::*;

        rows.par_iter_mut()
            .map(|row| self.flatten(pan_mixer, samples, row, mixer_volume))
            .collect()
    }
}
