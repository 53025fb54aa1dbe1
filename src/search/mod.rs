//! Multi-scale matching of targets against a screen edge map.
//!
//! The screen edge map is resized by each factor of a [`ScaleSweep`]; every
//! target template is slid over every resized level that can hold it, and the
//! best placement across the sweep wins. Levels are built one at a time and
//! shared by all targets, so memory stays at one resized screen.

mod select;
mod sweep;

pub use select::{Selection, TargetMatch, TargetSelector};
pub use sweep::ScreenLevel;

use crate::edges::EdgeParams;
use crate::image::ImageView;
use crate::kernel::{Kernel, ScanParams, ZnccSparseScalar};
use crate::template::TemplatePlan;
use crate::trace::{trace_event, trace_span};
use crate::util::math::linspace;
use crate::util::{EdgeClickError, EdgeClickResult};

/// Evenly spaced scale factors applied to the screen edge map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleSweep {
    /// Smallest factor, inclusive.
    pub min: f64,
    /// Largest factor, inclusive.
    pub max: f64,
    /// Number of factors, including both ends.
    pub steps: usize,
}

impl Default for ScaleSweep {
    fn default() -> Self {
        Self {
            min: 0.8,
            max: 1.2,
            steps: 11,
        }
    }
}

impl ScaleSweep {
    pub fn validate(&self) -> EdgeClickResult<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 {
            return Err(EdgeClickError::InvalidConfig(format!(
                "scale range must be positive and finite, got {}..={}",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(EdgeClickError::InvalidConfig(format!(
                "scale min {} exceeds max {}",
                self.min, self.max
            )));
        }
        if self.steps == 0 {
            return Err(EdgeClickError::InvalidConfig(
                "scale steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The factors in sweep order, smallest first.
    pub fn factors(&self) -> Vec<f64> {
        linspace(self.min, self.max, self.steps)
    }
}

/// Parameters for edge extraction and the scale sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchConfig {
    pub edges: EdgeParams,
    pub sweep: ScaleSweep,
    /// Windows whose variance is at or below this score zero.
    pub min_var_i: f32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            edges: EdgeParams::default(),
            sweep: ScaleSweep::default(),
            min_var_i: ScanParams::default().min_var_i,
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> EdgeClickResult<()> {
        self.edges.validate()?;
        self.sweep.validate()?;
        if !(self.min_var_i.is_finite() && self.min_var_i >= 0.0) {
            return Err(EdgeClickError::InvalidConfig(format!(
                "min_var_i must be finite and non-negative, got {}",
                self.min_var_i
            )));
        }
        Ok(())
    }
}

/// Best placement of one template across the sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleMatch {
    /// Normalized correlation at the best placement.
    pub score: f32,
    /// Top-left column in the resized level.
    pub x: usize,
    /// Top-left row in the resized level.
    pub y: usize,
    /// Original screen width divided by the resized width.
    pub ratio: f64,
    /// Scale factor of the level the match came from.
    pub factor: f64,
}

/// Scale-sweep matcher.
#[derive(Clone, Debug, Default)]
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    pub fn new(cfg: MatchConfig) -> Self {
        Self { cfg }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Finds the best placement of a single template.
    ///
    /// Returns `None` when the template is larger than every resized level.
    pub fn match_template(
        &self,
        screen_edges: ImageView<'_, u8>,
        plan: &TemplatePlan,
    ) -> EdgeClickResult<Option<ScaleMatch>> {
        let mut results = self.match_many(screen_edges, &[plan])?;
        Ok(results.pop().flatten())
    }

    /// Finds the best placement of each template, in the order given.
    ///
    /// Across levels a later level only replaces the current best when it
    /// scores strictly higher, so ties keep the smaller factor.
    pub fn match_many(
        &self,
        screen_edges: ImageView<'_, u8>,
        plans: &[&TemplatePlan],
    ) -> EdgeClickResult<Vec<Option<ScaleMatch>>> {
        self.cfg.sweep.validate()?;
        let _span = trace_span!(
            "scale_sweep",
            width = screen_edges.width(),
            height = screen_edges.height(),
            targets = plans.len()
        )
        .entered();

        let params = ScanParams {
            topk: 1,
            min_var_i: self.cfg.min_var_i,
            min_score: f32::NEG_INFINITY,
        };
        let mut best: Vec<Option<ScaleMatch>> = vec![None; plans.len()];

        for (scale_idx, factor) in self.cfg.sweep.factors().into_iter().enumerate() {
            let level = ScreenLevel::build(screen_edges, factor)?;
            for (plan, slot) in plans.iter().zip(best.iter_mut()) {
                if !level.fits(plan.width(), plan.height()) {
                    trace_event!(
                        "scale_skipped",
                        factor = factor,
                        level_width = level.width(),
                        level_height = level.height()
                    );
                    continue;
                }
                let peaks = <ZnccSparseScalar as Kernel>::scan_full(
                    level.search(),
                    plan,
                    scale_idx,
                    params,
                )?;
                let Some(peak) = peaks.first() else {
                    continue;
                };
                let candidate = ScaleMatch {
                    score: peak.score,
                    x: peak.x,
                    y: peak.y,
                    ratio: level.ratio(),
                    factor,
                };
                trace_event!(
                    "scale_scored",
                    factor = factor,
                    score = candidate.score,
                    x = candidate.x,
                    y = candidate.y
                );
                let improves = match slot {
                    Some(current) => candidate.score > current.score,
                    None => true,
                };
                if improves {
                    *slot = Some(candidate);
                }
            }
        }

        Ok(best)
    }
}
