//! Library exports for the huematch color-labeling tools.
/// Application directory resolution.
pub mod app_dirs;
/// TOML settings for densification and the trainer.
pub mod config;
/// Training-set densification around sparse labels.
pub mod densify;
/// Tracing subscriber setup.
pub mod logging;
/// Named colors and their labeled samples.
pub mod palette;
/// External trainer process bridge.
pub mod trainer;
