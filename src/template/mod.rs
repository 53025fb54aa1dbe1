//! Target templates and the store that owns them.

mod plan;
mod store;

pub use plan::{TemplatePlan, TemplateTap};
pub use store::TemplateStore;

use crate::image::{ImageView, OwnedImage};
use std::path::PathBuf;

/// One configured target: a unique label and the image file to load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetSpec {
    pub label: String,
    pub path: PathBuf,
}

impl TargetSpec {
    pub fn new(label: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}

/// A loaded target: its edge map and correlation plan. Immutable once built.
#[derive(Clone, Debug)]
pub struct TargetTemplate {
    name: String,
    edges: OwnedImage,
    plan: TemplatePlan,
}

impl TargetTemplate {
    pub(crate) fn new(name: String, edges: OwnedImage, plan: TemplatePlan) -> Self {
        Self { name, edges, plan }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Edge map width in pixels, equal to the source image width.
    pub fn width(&self) -> usize {
        self.edges.width()
    }

    /// Edge map height in pixels, equal to the source image height.
    pub fn height(&self) -> usize {
        self.edges.height()
    }

    pub fn edges(&self) -> ImageView<'_, u8> {
        self.edges.view()
    }

    pub fn plan(&self) -> &TemplatePlan {
        &self.plan
    }
}
