//! Tracker Mix - volume layer
//!
//! Numeric building blocks for the mixing engine:
//! - `Volume` scalar with bit-depth quantization and overflow protection
//! - `ChannelMatrix` fixed-capacity (mono/stereo/quad) gain vectors
//! - Polar pan `Position`s

pub mod error;
pub mod matrix;
pub mod panning;
pub mod types;
pub mod volume;

pub use error::*;
pub use matrix::*;
pub use panning::*;
pub use types::*;
pub use volume::*;
