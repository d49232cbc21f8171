//! Polar pan positions

use crate::error::VolumeError;
use std::f32::consts::FRAC_PI_2;
use std::f32::consts::FRAC_PI_4;

/// Pan position in polar coordinates.
///
/// An angle of 0 radians points directly right and grows counter-clockwise.
/// Distance 1.0 is the normal listening distance; gains fall off with the
/// square of the distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    pub angle: f32,
    pub distance: f32,
}

impl Position {
    /// Directly ahead of the listener
    pub const CENTER_AHEAD: Position = Position {
        angle: FRAC_PI_4,
        distance: 1.0,
    };

    pub fn new(angle: f32, distance: f32) -> Self {
        Self { angle, distance }
    }

    /// Linear stereo pan: `value == left` is hard left, `value == right` is
    /// hard right.
    ///
    /// The pan mixers treat the angle as the half angle of a 2D rotation, so
    /// the full left-to-right sweep covers a quarter turn.
    ///
    /// The fraction is taken relative to `right`, so ranges that do not
    /// start at zero (such as -64..=64) pan correctly; the historical
    /// `(span - value) / span` form only agreed with this when `left == 0`.
    pub fn from_linear(value: f32, left: f32, right: f32) -> Result<Self, VolumeError> {
        if left == right {
            return Err(VolumeError::CoincidentPanEndpoints { value: left });
        }

        let span = right as f64 - left as f64;
        let t = (right as f64 - value as f64) / span;
        Ok(Self {
            angle: (t * FRAC_PI_2 as f64) as f32,
            distance: 1.0,
        })
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::CENTER_AHEAD
    }
}
