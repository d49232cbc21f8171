//! Output sample formats and speaker layouts

use crate::error::VolumeError;
use std::fmt;

/// Output bit depth
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitDepth {
    Bits8 = 8,
    Bits16 = 16,
    Bits24 = 24, // Packed, 3 bytes
    Bits32 = 32,
}

impl BitDepth {
    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn bytes_per_sample(self) -> usize {
        match self {
            BitDepth::Bits8 => 1,
            BitDepth::Bits16 => 2,
            BitDepth::Bits24 => 3,
            BitDepth::Bits32 => 4,
        }
    }

    /// Smallest value representable at this depth
    pub fn min_value(self) -> i64 {
        -(1i64 << (self.bits() - 1))
    }

    /// Largest value representable at this depth
    pub fn max_value(self) -> i64 {
        (1i64 << (self.bits() - 1)) - 1
    }
}

impl TryFrom<u32> for BitDepth {
    type Error = VolumeError;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        match bits {
            8 => Ok(BitDepth::Bits8),
            16 => Ok(BitDepth::Bits16),
            24 => Ok(BitDepth::Bits24),
            32 => Ok(BitDepth::Bits32),
            other => Err(VolumeError::UnsupportedBitDepth(other)),
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Signed 24-bit value split into a high byte and the low 16 bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Int24 {
    pub hi: i8,
    pub lo: u16,
}

impl Int24 {
    /// Split the low 24 bits of `value`
    pub fn from_i32(value: i32) -> Self {
        Self {
            hi: (value >> 16) as i8,
            lo: (value & 0xffff) as u16,
        }
    }

    pub fn to_i32(self) -> i32 {
        ((self.hi as i32) << 16) | self.lo as i32
    }

    /// True little-endian `[lo, mid, hi]`.
    ///
    /// Older mixers serialized the `{hi, lo}` struct field by field, giving
    /// `[hi, lo, mid]`. That layout is not produced here.
    pub fn to_le_bytes(self) -> [u8; 3] {
        let [lo0, lo1] = self.lo.to_le_bytes();
        [lo0, lo1, self.hi as u8]
    }
}

/// A quantized output sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sample {
    I8(i8),
    I16(i16),
    I24(Int24),
    I32(i32),
}

impl Sample {
    /// Encoded size in bytes
    pub fn byte_len(&self) -> usize {
        match self {
            Sample::I8(_) => 1,
            Sample::I16(_) => 2,
            Sample::I24(_) => 3,
            Sample::I32(_) => 4,
        }
    }

    /// Little-endian encoding; only the first `byte_len()` bytes are meaningful
    pub fn to_le_bytes(self) -> [u8; 4] {
        let mut out = [0u8; 4];
        match self {
            Sample::I8(v) => out[0] = v as u8,
            Sample::I16(v) => out[..2].copy_from_slice(&v.to_le_bytes()),
            Sample::I24(v) => out[..3].copy_from_slice(&v.to_le_bytes()),
            Sample::I32(v) => out.copy_from_slice(&v.to_le_bytes()),
        }
        out
    }

    /// Append the little-endian encoding to `out`
    pub fn extend_le(self, out: &mut Vec<u8>) {
        let len = self.byte_len();
        out.extend_from_slice(&self.to_le_bytes()[..len]);
    }

    /// Widen to an `i32` container
    pub fn to_i32(self) -> i32 {
        match self {
            Sample::I8(v) => v as i32,
            Sample::I16(v) => v as i32,
            Sample::I24(v) => v.to_i32(),
            Sample::I32(v) => v,
        }
    }
}

/// Output speaker layout
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpeakerLayout {
    Mono = 1,
    Stereo = 2,
    Quad = 4, // FL, FR, RL, RR
}

impl SpeakerLayout {
    pub fn channel_count(self) -> usize {
        match self {
            SpeakerLayout::Mono => 1,
            SpeakerLayout::Stereo => 2,
            SpeakerLayout::Quad => 4,
        }
    }
}

impl TryFrom<usize> for SpeakerLayout {
    type Error = VolumeError;

    fn try_from(channels: usize) -> Result<Self, Self::Error> {
        match channels {
            1 => Ok(SpeakerLayout::Mono),
            2 => Ok(SpeakerLayout::Stereo),
            4 => Ok(SpeakerLayout::Quad),
            other => Err(VolumeError::UnsupportedChannelCount(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_depth_from_bits() {
        assert_eq!(BitDepth::try_from(8u32), Ok(BitDepth::Bits8));
        assert_eq!(BitDepth::try_from(24u32), Ok(BitDepth::Bits24));
        assert_eq!(
            BitDepth::try_from(12u32),
            Err(VolumeError::UnsupportedBitDepth(12))
        );
        assert_eq!(
            BitDepth::try_from(0u32),
            Err(VolumeError::UnsupportedBitDepth(0))
        );
    }

    #[test]
    fn test_bit_depth_ranges() {
        assert_eq!(BitDepth::Bits8.min_value(), -128);
        assert_eq!(BitDepth::Bits8.max_value(), 127);
        assert_eq!(BitDepth::Bits24.max_value(), 8_388_607);
        assert_eq!(BitDepth::Bits32.min_value(), i32::MIN as i64);
        assert_eq!(BitDepth::Bits24.bytes_per_sample(), 3);
    }

    #[test]
    fn test_int24_split() {
        let v = Int24::from_i32(-2);
        assert_eq!(v.hi, -1);
        assert_eq!(v.lo, 0xfffe);
        assert_eq!(v.to_i32(), -2);
        assert_eq!(v.to_le_bytes(), [0xfe, 0xff, 0xff]);

        let v = Int24::from_i32(0x12_3456);
        assert_eq!(v.to_le_bytes(), [0x56, 0x34, 0x12]);
    }

    #[test]
    fn test_sample_encoding() {
        let mut out = Vec::new();
        Sample::I16(-2).extend_le(&mut out);
        Sample::I8(5).extend_le(&mut out);
        Sample::I32(1).extend_le(&mut out);
        assert_eq!(out, vec![0xfe, 0xff, 0x05, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_speaker_layouts() {
        assert_eq!(SpeakerLayout::try_from(4usize), Ok(SpeakerLayout::Quad));
        assert_eq!(SpeakerLayout::Stereo.channel_count(), 2);
        assert_eq!(
            SpeakerLayout::try_from(3usize),
            Err(VolumeError::UnsupportedChannelCount(3))
        );
    }
}
