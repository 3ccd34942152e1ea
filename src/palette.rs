//! In-memory palette of named colors and their labeled samples.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::densify::Sample;
use crate::trainer::TrainedModel;

/// Name given to a color on first selection.
pub const DEFAULT_COLOR_NAME: &str = "unnamed";

/// Identifier chosen by the picker when a color is first selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorId(pub u32);

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "color#{}", self.0)
    }
}

/// A named color category with its samples and last trained model.
#[derive(Debug, Clone, PartialEq)]
pub struct Color {
    id: ColorId,
    name: String,
    samples: Vec<Sample>,
    model: Option<TrainedModel>,
}

impl Color {
    pub fn new(id: ColorId) -> Self {
        Self {
            id,
            name: DEFAULT_COLOR_NAME.to_string(),
            samples: Vec::new(),
            model: None,
        }
    }

    pub fn id(&self) -> ColorId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn model(&self) -> Option<&TrainedModel> {
        self.model.as_ref()
    }

    pub fn add_sample(&mut self, sample: Sample) {
        self.samples.push(sample);
    }

    pub fn clear_samples(&mut self) {
        self.samples.clear();
    }
}

/// Partial update applied to the active color.
#[derive(Debug, Clone, Default)]
pub struct ColorProps {
    pub name: Option<String>,
    pub model: Option<TrainedModel>,
}

/// Colors in creation order plus the current selection.
#[derive(Debug, Clone, Default)]
pub struct Palette {
    active: Option<ColorId>,
    colors: Vec<Color>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn color(&self, id: ColorId) -> Option<&Color> {
        self.colors.iter().find(|color| color.id == id)
    }

    fn color_mut(&mut self, id: ColorId) -> Option<&mut Color> {
        self.colors.iter_mut().find(|color| color.id == id)
    }

    pub fn active_color_id(&self) -> Option<ColorId> {
        self.active
    }

    pub fn active_color(&self) -> Option<&Color> {
        self.active.and_then(|id| self.color(id))
    }

    fn active_color_mut(&mut self) -> Option<&mut Color> {
        let id = self.active?;
        self.color_mut(id)
    }

    /// Select `id`, creating an empty color the first time it is seen.
    pub fn set_active_color(&mut self, id: ColorId) {
        self.active = Some(id);
        if self.color(id).is_none() {
            tracing::debug!("Creating {id}");
            self.colors.push(Color::new(id));
        }
    }

    /// Apply `props` to the active color; no-op without a selection.
    pub fn set_active_props(&mut self, props: ColorProps) {
        let Some(color) = self.active_color_mut() else {
            return;
        };
        if let Some(name) = props.name {
            color.name = name;
        }
        if let Some(model) = props.model {
            color.model = Some(model);
        }
    }

    pub fn rename_active(&mut self, name: impl Into<String>) {
        self.set_active_props(ColorProps {
            name: Some(name.into()),
            model: None,
        });
    }

    /// Append a sample to the active color; no-op without a selection.
    pub fn add_sample(&mut self, sample: Sample) {
        if let Some(color) = self.active_color_mut() {
            color.add_sample(sample);
        }
    }

    /// Store a trained model on `id`. Returns false when the color is gone.
    pub fn set_model(&mut self, id: ColorId, model: TrainedModel) -> bool {
        match self.color_mut(id) {
            Some(color) => {
                color.model = Some(model);
                true
            }
            None => false,
        }
    }

    /// Remove `id` and its samples, clearing the selection if it was active.
    pub fn delete_color(&mut self, id: ColorId) -> Option<Color> {
        if self.active == Some(id) {
            self.active = None;
        }
        let index = self.colors.iter().position(|color| color.id == id)?;
        let mut removed = self.colors.remove(index);
        removed.clear_samples();
        Some(removed)
    }
}
