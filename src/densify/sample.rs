use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A labeled point in the perceptual color space.
///
/// `x` and `y` are the chromaticity coordinates and `z` the intensity, each in
/// `[0, 1]`. A `label` of `0.0` marks a negative (background) sample; any other
/// value marks positive membership, and its sign and magnitude are passed through
/// to the trainer untouched.
///
/// On the wire a sample is the 4-element array `[x, y, z, label]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub label: f64,
}

/// Reasons a raw `[x, y, z, label]` tuple is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SampleError {
    /// A component was NaN or infinite.
    #[error("sample component {axis} is not finite")]
    NotFinite { axis: &'static str },
    /// A coordinate fell outside the unit interval.
    #[error("sample coordinate {axis}={value} is outside [0, 1]")]
    OutOfRange { axis: &'static str, value: f64 },
}

impl Sample {
    /// Build a sample without domain checks.
    ///
    /// Used for points the crate derives itself, such as bucket centers.
    pub const fn new(x: f64, y: f64, z: f64, label: f64) -> Self {
        Self { x, y, z, label }
    }

    /// Build a sample, rejecting non-finite values and coordinates outside `[0, 1]`.
    pub fn try_new(x: f64, y: f64, z: f64, label: f64) -> Result<Self, SampleError> {
        for (axis, value) in [("x", x), ("y", y), ("z", z)] {
            if !value.is_finite() {
                return Err(SampleError::NotFinite { axis });
            }
            if !(0.0..=1.0).contains(&value) {
                return Err(SampleError::OutOfRange { axis, value });
            }
        }
        if !label.is_finite() {
            return Err(SampleError::NotFinite { axis: "label" });
        }
        Ok(Self::new(x, y, z, label))
    }

    /// True when the label marks positive membership (any nonzero value).
    pub fn is_positive(&self) -> bool {
        self.label != 0.0
    }

    pub fn to_array(self) -> [f64; 4] {
        [self.x, self.y, self.z, self.label]
    }
}

impl TryFrom<[f64; 4]> for Sample {
    type Error = SampleError;

    fn try_from([x, y, z, label]: [f64; 4]) -> Result<Self, Self::Error> {
        Self::try_new(x, y, z, label)
    }
}

impl From<Sample> for [f64; 4] {
    fn from(sample: Sample) -> Self {
        sample.to_array()
    }
}
