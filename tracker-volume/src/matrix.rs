//! Fixed-capacity per-channel gain/sample vector
//!
//! A `ChannelMatrix` carries up to four `Volume`s with a logical channel
//! count of 0 (empty), 1, 2 or 4. Storage is a plain array, so every
//! operation here is allocation-free and the type is `Copy`.
//!
//! Channel order for quad is front-left, front-right, rear-left, rear-right.

use crate::volume::Volume;

/// Maximum number of channels a matrix can hold
pub const MAX_CHANNELS: usize = 4;

/// Per-channel volumes with an explicit logical channel count
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelMatrix {
    values: [Volume; MAX_CHANNELS],
    channels: usize,
}

fn is_supported(channels: usize) -> bool {
    matches!(channels, 1 | 2 | 4)
}

impl ChannelMatrix {
    pub const EMPTY: ChannelMatrix = ChannelMatrix {
        values: [Volume::SILENT; MAX_CHANNELS],
        channels: 0,
    };

    pub fn mono(value: Volume) -> Self {
        Self {
            values: [value, Volume::SILENT, Volume::SILENT, Volume::SILENT],
            channels: 1,
        }
    }

    pub fn stereo(left: Volume, right: Volume) -> Self {
        Self {
            values: [left, right, Volume::SILENT, Volume::SILENT],
            channels: 2,
        }
    }

    pub fn quad(
        front_left: Volume,
        front_right: Volume,
        rear_left: Volume,
        rear_right: Volume,
    ) -> Self {
        Self {
            values: [front_left, front_right, rear_left, rear_right],
            channels: 4,
        }
    }

    /// All-zero matrix with `channels` channels, or empty if unsupported
    pub fn silence(channels: usize) -> Self {
        if is_supported(channels) {
            Self {
                values: [Volume::SILENT; MAX_CHANNELS],
                channels,
            }
        } else {
            Self::EMPTY
        }
    }

    /// Build from 1, 2 or 4 values; any other length is rejected
    pub fn from_slice(values: &[Volume]) -> Option<Self> {
        if !is_supported(values.len()) {
            return None;
        }
        let mut out = Self::silence(values.len());
        out.values[..values.len()].copy_from_slice(values);
        Some(out)
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.channels == 0
    }

    /// Active channel values
    pub fn as_slice(&self) -> &[Volume] {
        &self.values[..self.channels]
    }

    pub fn get(&self, ch: usize) -> Volume {
        self.values[ch]
    }

    pub fn set(&mut self, ch: usize, value: Volume) {
        self.values[ch] = value;
    }

    /// Multiply every active channel by `gain`
    pub fn apply(&self, gain: Volume) -> Self {
        let mut out = *self;
        for v in &mut out.values[..self.channels] {
            *v = v.apply(gain);
        }
        out
    }

    /// Elementwise product with `other`.
    ///
    /// A mono `other` is broadcast as a scalar. Any other mismatch converts
    /// `other` to this matrix's channel count before multiplying, so the
    /// result always has `self`'s channel count.
    pub fn apply_to_matrix(&self, other: &ChannelMatrix) -> Self {
        if other.channels == 1 && self.channels != 1 {
            return self.apply(other.values[0]);
        }

        let rhs = other.to_channels(self.channels);
        let mut out = *self;
        for (v, r) in out.values[..self.channels].iter_mut().zip(rhs.as_slice()) {
            *v = v.apply(*r);
        }
        out
    }

    /// Add `other` into this matrix.
    ///
    /// The first contribution into an empty matrix sets its channel count.
    pub fn accumulate(&mut self, other: &ChannelMatrix) {
        if self.channels == 0 {
            *self = *other;
            return;
        }

        let dry = other.to_channels(self.channels);
        for (v, d) in self.values[..self.channels].iter_mut().zip(dry.as_slice()) {
            *v += *d;
        }
    }

    /// Up-mix or down-mix to `channels`.
    ///
    /// Unsupported targets yield the empty matrix; an empty source yields
    /// silence at the target width.
    pub fn to_channels(&self, channels: usize) -> Self {
        if !is_supported(channels) {
            return Self::EMPTY;
        }
        if self.channels == channels {
            return *self;
        }
        if self.channels == 0 {
            return Self::silence(channels);
        }

        match channels {
            1 => {
                let [m] = self.as_mono();
                Self::mono(m)
            }
            2 => {
                let [l, r] = self.as_stereo();
                Self::stereo(l, r)
            }
            _ => {
                let [fl, fr, rl, rr] = self.as_quad();
                Self::quad(fl, fr, rl, rr)
            }
        }
    }

    /// Sum of the active channels
    pub fn sum(&self) -> Volume {
        self.as_slice().iter().sum()
    }

    /// Average of all active channels
    pub fn as_mono(&self) -> [Volume; 1] {
        match self.channels {
            0 => [Volume::SILENT],
            1 => [self.values[0]],
            n => [self.sum() / n as f32],
        }
    }

    pub fn as_stereo(&self) -> [Volume; 2] {
        let v = &self.values;
        match self.channels {
            0 => [Volume::SILENT; 2],
            1 => [v[0], v[0]],
            2 => [v[0], v[1]],
            _ => [(v[0] + v[2]) / 2.0, (v[1] + v[3]) / 2.0],
        }
    }

    pub fn as_quad(&self) -> [Volume; 4] {
        let v = &self.values;
        match self.channels {
            0 => [Volume::SILENT; 4],
            1 => [v[0]; 4],
            2 => [v[0], v[1], v[0], v[1]],
            _ => *v,
        }
    }

    /// Per-channel linear interpolation toward `other` by `t`.
    ///
    /// `t <= 0` or an empty `other` returns `self`; `t >= 1` returns
    /// `other` converted to this matrix's channel count.
    pub fn lerp(&self, other: &ChannelMatrix, t: f32) -> Self {
        if t <= 0.0 || other.is_empty() {
            return *self;
        }

        let from = if self.is_empty() {
            Self::silence(other.channels)
        } else {
            *self
        };
        let to = other.to_channels(from.channels);
        if t >= 1.0 {
            return to;
        }

        let mut out = from;
        for (v, target) in out.values[..from.channels].iter_mut().zip(to.as_slice()) {
            *v = *v + (*target - *v) * t;
        }
        out
    }
}

// Storage past the logical channel count does not take part in equality
impl PartialEq for ChannelMatrix {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl From<Volume> for ChannelMatrix {
    fn from(value: Volume) -> Self {
        Self::mono(value)
    }
}
