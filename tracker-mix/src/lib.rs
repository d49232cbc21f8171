//! Tracker Mix - real-time mixing engine
//!
//! Mixes per-channel playback segments of a tracker song into one
//! interleaved PCM stream.
//!
//! Key features:
//! - Mono, stereo and quad pan mixers
//! - Per-tick `ChannelMatrix` accumulation with lazy samplers
//! - Saturating quantization to 8/16/24/32-bit PCM
//! - Parallel row flattening with rayon
//! - Bounded producer/consumer mix queue

pub mod channel_data;
pub mod error;
pub mod mix_buffer;
pub mod mixer;
pub mod pan_mixer;
pub mod queue;
pub mod sampling;

pub use channel_data::*;
pub use error::*;
pub use mix_buffer::*;
pub use mixer::*;
pub use pan_mixer::*;
pub use queue::*;
pub use sampling::*;

pub use tracker_volume;
