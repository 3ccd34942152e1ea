use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

use super::DensifyError;
use super::filler::synthesize_fillers;
use super::geometry::Triangle;
use super::grid::OccupancyGrid;
use super::sample::Sample;

/// Default bucket count along each chromaticity axis.
pub const DEFAULT_CHROMATICITY_BUCKETS: usize = 6;
/// Default bucket count along the intensity axis.
pub const DEFAULT_INTENSITY_BUCKETS: usize = 6;
/// Fewest user-labeled points worth sending to the trainer.
pub const MIN_TRAINING_SAMPLES: usize = 3;

/// Knobs for grid resolution and filler labeling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DensifyOptions {
    pub chromaticity_buckets: usize,
    pub intensity_buckets: usize,
    /// Label given to every synthesized sample.
    pub filler_value: f64,
    /// Allow a positive sample's own cell to receive a filler.
    pub fill_interior: bool,
}

impl Default for DensifyOptions {
    fn default() -> Self {
        Self {
            chromaticity_buckets: DEFAULT_CHROMATICITY_BUCKETS,
            intensity_buckets: DEFAULT_INTENSITY_BUCKETS,
            filler_value: 0.0,
            fill_interior: false,
        }
    }
}

/// Real samples followed by synthesized fillers.
///
/// Serializes as the flat list of `[x, y, z, label]` tuples sent to the trainer.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    samples: Vec<Sample>,
    real_count: usize,
}

impl TrainingSet {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// The caller's samples, unmodified and in their original order.
    pub fn real(&self) -> &[Sample] {
        &self.samples[..self.real_count]
    }

    pub fn fillers(&self) -> &[Sample] {
        &self.samples[self.real_count..]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Check the set can fit a binary classifier.
    ///
    /// The caller must have labeled more than two points themselves, and the
    /// merged set must hold both a background and a positive label. Fillers
    /// count towards label diversity but never towards the point count.
    pub fn validate(&self) -> Result<(), SkipReason> {
        if self.real_count < MIN_TRAINING_SAMPLES {
            return Err(SkipReason::TooFewSamples {
                count: self.real_count,
            });
        }
        if !self.samples.iter().any(|sample| !sample.is_positive()) {
            return Err(SkipReason::MissingNegative);
        }
        if !self.samples.iter().any(Sample::is_positive) {
            return Err(SkipReason::MissingPositive);
        }
        Ok(())
    }
}

impl Serialize for TrainingSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.samples.serialize(serializer)
    }
}

/// Why a color was not sent to the trainer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    TooFewSamples { count: usize },
    MissingNegative,
    MissingPositive,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewSamples { count } => write!(
                f,
                "only {count} labeled points (need at least {MIN_TRAINING_SAMPLES})"
            ),
            Self::MissingNegative => f.write_str("no background (label 0) points"),
            Self::MissingPositive => f.write_str("no positive (nonzero label) points"),
        }
    }
}

/// Result of preparing a color for training.
#[derive(Debug, Clone, PartialEq)]
pub enum Prepared {
    Ready(TrainingSet),
    Skipped(SkipReason),
}

/// Merge `samples` with fillers synthesized around them.
pub fn assemble_training_set(
    samples: &[Sample],
    options: &DensifyOptions,
    triangle: Option<&Triangle>,
) -> Result<TrainingSet, DensifyError> {
    let grid = OccupancyGrid::build(
        samples,
        options.chromaticity_buckets,
        options.intensity_buckets,
        options.fill_interior,
    )?;
    let fillers = synthesize_fillers(&grid, options.filler_value, triangle);
    tracing::debug!(
        real = samples.len(),
        fillers = fillers.len(),
        clipped = triangle.is_some(),
        "Assembled training set"
    );
    let mut merged = Vec::with_capacity(samples.len() + fillers.len());
    merged.extend_from_slice(samples);
    merged.extend(fillers);
    Ok(TrainingSet {
        samples: merged,
        real_count: samples.len(),
    })
}

/// Assemble and validate; an unusable set resolves to [`Prepared::Skipped`].
pub fn prepare_training_set(
    samples: &[Sample],
    options: &DensifyOptions,
    triangle: Option<&Triangle>,
) -> Result<Prepared, DensifyError> {
    let set = assemble_training_set(samples, options, triangle)?;
    Ok(match set.validate() {
        Ok(()) => Prepared::Ready(set),
        Err(reason) => {
            tracing::info!("Skipping training: {reason}");
            Prepared::Skipped(reason)
        }
    })
}
