//! Mixer error types

use thiserror::Error;
use tracker_volume::VolumeError;

pub type MixResult<T> = Result<T, MixError>;

/// Errors surfaced by the mixing engine
#[derive(Debug, Error)]
pub enum MixError {
    #[error(transparent)]
    Volume(#[from] VolumeError),

    /// Only mono, stereo and quad pan mixers exist.
    #[error("no pan mixer available for {0} output channels")]
    NoPanMixer(usize),

    /// Caller-supplied output buffers filled up before the render finished.
    /// Everything up to `written` bytes is valid output.
    #[error("output buffers exhausted after {written} of {required} bytes")]
    OutputExhausted { written: usize, required: usize },

    #[error("mix queue is closed")]
    QueueClosed,

    /// The worker died mid-mix; the buffer is missing queued requests.
    #[error("mix worker panicked after {mixed} mix-ins")]
    WorkerPanicked { mixed: u64 },

    #[error("failed to spawn mix worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
}
