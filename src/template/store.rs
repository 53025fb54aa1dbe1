//! Loading the fixed target set at startup.

use crate::edges::{edge_map_dynamic, EdgeParams};
use crate::template::{TargetSpec, TargetTemplate, TemplatePlan};
use crate::trace::{trace_event, trace_span};
use crate::util::{EdgeClickError, EdgeClickResult};
use image::DynamicImage;
use std::collections::HashSet;

/// Every known target, in registration order.
///
/// Registration order matters: when two targets score exactly the same the
/// selector keeps the one registered first.
#[derive(Clone, Debug)]
pub struct TemplateStore {
    targets: Vec<TargetTemplate>,
}

impl TemplateStore {
    /// Reads every target image from disk and precomputes its edge map.
    ///
    /// An unreadable image is a `MissingAsset` error naming the target.
    pub fn load(specs: &[TargetSpec], params: EdgeParams) -> EdgeClickResult<Self> {
        let _span = trace_span!("load_templates", targets = specs.len()).entered();
        let images = specs
            .iter()
            .map(|spec| {
                image::open(&spec.path)
                    .map(|img| (spec.label.clone(), img))
                    .map_err(|err| EdgeClickError::MissingAsset {
                        label: spec.label.clone(),
                        path: spec.path.clone(),
                        reason: err.to_string(),
                    })
            })
            .collect::<EdgeClickResult<Vec<_>>>()?;
        Self::from_images(images, params)
    }

    /// Builds a store from already decoded images.
    pub fn from_images<I, S>(images: I, params: EdgeParams) -> EdgeClickResult<Self>
    where
        I: IntoIterator<Item = (S, DynamicImage)>,
        S: Into<String>,
    {
        params.validate()?;
        let mut seen = HashSet::new();
        let mut targets = Vec::new();
        for (label, img) in images {
            let name = label.into();
            if !seen.insert(name.clone()) {
                return Err(EdgeClickError::InvalidConfig(format!(
                    "duplicate target label '{name}'"
                )));
            }
            let edges = edge_map_dynamic(&img, params)?;
            let plan = TemplatePlan::from_view(edges.view()).map_err(|err| match err {
                EdgeClickError::DegenerateTemplate { reason } => EdgeClickError::InvalidConfig(
                    format!("target '{name}' has no usable edges ({reason})"),
                ),
                other => other,
            })?;
            trace_event!(
                "template_loaded",
                width = edges.width(),
                height = edges.height(),
                taps = plan.taps().len()
            );
            targets.push(TargetTemplate::new(name, edges, plan));
        }
        if targets.is_empty() {
            return Err(EdgeClickError::InvalidConfig(
                "at least one target is required".to_string(),
            ));
        }
        Ok(Self { targets })
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&TargetTemplate> {
        self.targets.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TargetTemplate> {
        self.targets.iter()
    }

    /// Target labels in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(TargetTemplate::name)
    }
}
