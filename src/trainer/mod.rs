//! Bridge to the out-of-process classifier trainer.
//!
//! A color's samples are densified into a training set, validated, and handed to
//! a [`ModelTrainer`]. The trainer's response is stored opaquely as a
//! [`TrainedModel`]. Colors without enough data resolve to
//! [`TrainOutcome::Skipped`] and never reach the trainer.

use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::densify::{DensifyError, DensifyOptions, Prepared, SkipReason, Triangle, TrainingSet};
use crate::palette::Color;

mod cancel;
mod model;
mod process;

pub use cancel::CancelToken;
pub use model::TrainedModel;
pub use process::ProcessTrainer;

/// Errors surfaced while producing a model.
#[derive(Debug, Error)]
pub enum TrainerError {
    #[error("Failed to assemble training set: {0}")]
    Densify(#[from] DensifyError),
    #[error("Failed to serialize training request: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Failed to launch trainer {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },
    #[error("Trainer i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Trainer exited with {status}: {stderr}")]
    Exited { status: ExitStatus, stderr: String },
    #[error("Trainer did not finish within {0:?}")]
    TimedOut(Duration),
    #[error("Trainer was cancelled")]
    Cancelled,
    #[error("Trainer returned a malformed model: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Something that turns a validated training set into a model.
pub trait ModelTrainer {
    fn train(&self, set: &TrainingSet, cancel: &CancelToken) -> Result<TrainedModel, TrainerError>;
}

/// Result of a training request for one color.
#[derive(Debug, Clone, PartialEq)]
pub enum TrainOutcome {
    Trained(TrainedModel),
    Skipped(SkipReason),
}

/// Densify `color`'s samples and train a model for it.
///
/// The palette is not touched; store a trained model with
/// [`Palette::set_model`](crate::palette::Palette::set_model).
pub fn train_color<T: ModelTrainer + ?Sized>(
    color: &Color,
    trainer: &T,
    options: &DensifyOptions,
    triangle: Option<&Triangle>,
    cancel: &CancelToken,
) -> Result<TrainOutcome, TrainerError> {
    let set = match crate::densify::prepare_training_set(color.samples(), options, triangle)? {
        Prepared::Ready(set) => set,
        Prepared::Skipped(reason) => {
            tracing::info!("{} ({}) not trained: {reason}", color.id(), color.name());
            return Ok(TrainOutcome::Skipped(reason));
        }
    };
    tracing::info!(
        "Training {} ({}) on {} real + {} filler points",
        color.id(),
        color.name(),
        set.real().len(),
        set.fillers().len()
    );
    trainer.train(&set, cancel).map(TrainOutcome::Trained)
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::densify::Sample;
    use crate::palette::{ColorId, Palette};

    #[derive(Default)]
    struct RecordingTrainer {
        calls: Cell<usize>,
        last_len: RefCell<Option<usize>>,
    }

    impl ModelTrainer for RecordingTrainer {
        fn train(
            &self,
            set: &TrainingSet,
            _cancel: &CancelToken,
        ) -> Result<TrainedModel, TrainerError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_len.borrow_mut() = Some(set.len());
            Ok(TrainedModel::from_json(r#"{"classes":[0,1]}"#).unwrap())
        }
    }

    fn palette_with(samples: &[Sample]) -> Palette {
        let mut palette = Palette::new();
        palette.set_active_color(ColorId(1));
        for &sample in samples {
            palette.add_sample(sample);
        }
        palette
    }

    #[test]
    fn sparse_color_never_reaches_trainer() {
        let palette = palette_with(&[Sample::new(0.1, 0.1, 0.1, 1.0)]);
        let trainer = RecordingTrainer::default();
        let outcome = train_color(
            palette.color(ColorId(1)).unwrap(),
            &trainer,
            &DensifyOptions::default(),
            None,
            &CancelToken::new(),
        )
        .unwrap();
        assert_eq!(
            outcome,
            TrainOutcome::Skipped(SkipReason::TooFewSamples { count: 1 })
        );
        assert_eq!(trainer.calls.get(), 0);
    }

    #[test]
    fn trained_model_can_be_stored_on_the_color() {
        let mut palette = palette_with(&[
            Sample::new(0.2, 0.3, 0.4, 1.0),
            Sample::new(0.6, 0.6, 0.6, 0.0),
            Sample::new(0.25, 0.3, 0.5, 1.0),
        ]);
        let trainer = RecordingTrainer::default();
        let outcome = train_color(
            palette.color(ColorId(1)).unwrap(),
            &trainer,
            &DensifyOptions::default(),
            None,
            &CancelToken::new(),
        )
        .unwrap();
        let TrainOutcome::Trained(model) = outcome else {
            panic!("expected a trained model");
        };
        assert_eq!(trainer.calls.get(), 1);
        assert!(trainer.last_len.borrow().unwrap() > 3);
        assert!(palette.color(ColorId(1)).unwrap().model().is_none());
        assert!(palette.set_model(ColorId(1), model.clone()));
        assert_eq!(palette.color(ColorId(1)).unwrap().model(), Some(&model));
    }

    #[test]
    fn zero_buckets_surface_as_densify_error() {
        let palette = palette_with(&[Sample::new(0.2, 0.3, 0.4, 1.0)]);
        let options = DensifyOptions {
            chromaticity_buckets: 0,
            ..DensifyOptions::default()
        };
        let err = train_color(
            palette.color(ColorId(1)).unwrap(),
            &RecordingTrainer::default(),
            &options,
            None,
            &CancelToken::new(),
        )
        .unwrap_err();
        assert!(matches!(err, TrainerError::Densify(_)));
    }
}
