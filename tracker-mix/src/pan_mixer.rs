//! Pan position to per-output-channel gain
//!
//! One stateless mixer per output layout. The layout is chosen once per
//! mixing session, so callers hold a `&'static dyn PanMixer`.

use crate::error::{MixError, MixResult};
use std::f64::consts::FRAC_PI_2;
use tracker_volume::{ChannelMatrix, Position, Volume};

/// Produces the gain matrix for a single source at a pan position
pub trait PanMixer: Send + Sync {
    fn mixing_matrix(&self, pan: Position) -> ChannelMatrix;

    /// Output width of every matrix this mixer returns
    fn channel_count(&self) -> usize;
}

/// Mono output; angle and distance are ignored
#[derive(Debug, Clone, Copy, Default)]
pub struct MonoPanMixer;

/// Stereo output using a sin/cos rotation of the pan angle
#[derive(Debug, Clone, Copy, Default)]
pub struct StereoPanMixer;

/// Quad output; the rear pair is rotated a quarter turn from the front pair
#[derive(Debug, Clone, Copy, Default)]
pub struct QuadPanMixer;

pub static PAN_MIXER_MONO: MonoPanMixer = MonoPanMixer;
pub static PAN_MIXER_STEREO: StereoPanMixer = StereoPanMixer;
pub static PAN_MIXER_QUAD: QuadPanMixer = QuadPanMixer;

/// Resolve the pan mixer for an output channel count
pub fn pan_mixer(channels: usize) -> MixResult<&'static dyn PanMixer> {
    match channels {
        1 => Ok(&PAN_MIXER_MONO),
        2 => Ok(&PAN_MIXER_STEREO),
        4 => Ok(&PAN_MIXER_QUAD),
        other => Err(MixError::NoPanMixer(other)),
    }
}

/// Inverse-square distance attenuation; zero distance is silent
fn attenuation(pan: &Position) -> Volume {
    if pan.distance > 0.0 {
        Volume(1.0 / (pan.distance * pan.distance))
    } else {
        Volume::SILENT
    }
}

fn rotate(angle: f64, d: Volume) -> (Volume, Volume) {
    let (s, c) = angle.sin_cos();
    (d * s as f32, d * c as f32)
}

impl PanMixer for MonoPanMixer {
    fn mixing_matrix(&self, _pan: Position) -> ChannelMatrix {
        ChannelMatrix::mono(Volume::UNITY)
    }

    fn channel_count(&self) -> usize {
        1
    }
}

impl PanMixer for StereoPanMixer {
    fn mixing_matrix(&self, pan: Position) -> ChannelMatrix {
        let (left, right) = rotate(pan.angle as f64, attenuation(&pan));
        ChannelMatrix::stereo(left, right)
    }

    fn channel_count(&self) -> usize {
        2
    }
}

impl PanMixer for QuadPanMixer {
    fn mixing_matrix(&self, pan: Position) -> ChannelMatrix {
        let d = attenuation(&pan);
        let angle = pan.angle as f64;
        let (front_left, front_right) = rotate(angle, d);
        let (rear_right, rear_left) = rotate(angle + FRAC_PI_2, d);
        ChannelMatrix::quad(front_left, front_right, rear_left, rear_right)
    }

    fn channel_count(&self) -> usize {
        4
    }
}
