//! Errors raised while building volume-layer values

use thiserror::Error;

/// Invalid construction of a volume, layout or pan value
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum VolumeError {
    /// Linear pan interpolation needs two distinct endpoints.
    #[error("pan endpoints must be distinct (both were {value})")]
    CoincidentPanEndpoints { value: f32 },

    #[error("unsupported bit depth: {0} bits per sample")]
    UnsupportedBitDepth(u32),

    #[error("unsupported channel count: {0}")]
    UnsupportedChannelCount(usize),
}
