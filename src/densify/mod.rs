//! Training-set densification for sparse color labels.
//!
//! Every positive sample stamps a one-bucket halo into a padded occupancy grid
//! over the (x, y, z) space. Halo cells become synthetic filler samples, which
//! are appended after the user's own samples to form the training set.

mod assemble;
mod filler;
mod geometry;
mod grid;
mod sample;

pub use assemble::{
    DEFAULT_CHROMATICITY_BUCKETS, DEFAULT_INTENSITY_BUCKETS, DensifyOptions, MIN_TRAINING_SAMPLES,
    Prepared, SkipReason, TrainingSet, assemble_training_set, prepare_training_set,
};
pub use filler::synthesize_fillers;
pub use geometry::{Point2, Triangle, TriangleParseError, in_triangle, range, range_to};
pub use grid::{NEIGHBOR_RADIUS, OccupancyGrid, VETO_WEIGHT, bucket_index};
pub use sample::{Sample, SampleError};

/// Errors raised while building the occupancy grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DensifyError {
    /// Either axis was configured with no buckets.
    #[error("bucket counts must be positive (chromaticity={chromaticity}, intensity={intensity})")]
    ZeroBuckets {
        chromaticity: usize,
        intensity: usize,
    },
}
