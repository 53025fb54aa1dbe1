//! Picking the single best target on a screen.

use crate::decide::ClickPoint;
use crate::edges::edge_map_dynamic;
use crate::image::ImageView;
use crate::search::{MatchConfig, Matcher};
use crate::template::{TargetTemplate, TemplateStore};
use crate::trace::{trace_event, trace_span};
use crate::util::math::scale_trunc;
use crate::util::EdgeClickResult;
use image::DynamicImage;

/// Best-scoring target for one screen capture.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetMatch {
    /// Label of the winning target.
    pub name: String,
    /// Normalized correlation of the best placement.
    pub confidence: f32,
    /// Top-left `(x, y)` in the resized level's coordinates.
    pub location: (usize, usize),
    /// Original screen width divided by the resized level width.
    pub ratio: f64,
    /// Template `(height, width)` in pixels.
    pub template_size: (usize, usize),
}

impl TargetMatch {
    /// Center of the matched box in original screen pixels.
    ///
    /// Both corners are mapped back with `ratio` and truncated, then the
    /// midpoint is taken with floor division.
    pub fn click_point(&self) -> ClickPoint {
        let (x, y) = self.location;
        let (height, width) = self.template_size;
        let start_x = scale_trunc(x, self.ratio);
        let start_y = scale_trunc(y, self.ratio);
        let end_x = scale_trunc(x + width, self.ratio);
        let end_y = scale_trunc(y + height, self.ratio);
        ClickPoint {
            x: (start_x + (end_x - start_x) / 2) as i32,
            y: (start_y + (end_y - start_y) / 2) as i32,
        }
    }
}

/// Outcome of a selection: either no target scored above zero, or the best.
#[derive(Clone, Debug, PartialEq)]
pub enum Selection {
    NoMatch,
    Match(TargetMatch),
}

impl Selection {
    /// Confidence of the best target, `0.0` when nothing matched.
    pub fn best_confidence(&self) -> f32 {
        match self {
            Selection::NoMatch => 0.0,
            Selection::Match(m) => m.confidence,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            Selection::NoMatch => None,
            Selection::Match(m) => Some(&m.name),
        }
    }

    pub fn as_match(&self) -> Option<&TargetMatch> {
        match self {
            Selection::NoMatch => None,
            Selection::Match(m) => Some(m),
        }
    }
}

/// Runs the matcher for every known target and keeps the global best.
#[derive(Clone, Debug, Default)]
pub struct TargetSelector {
    matcher: Matcher,
}

impl TargetSelector {
    pub fn new(cfg: MatchConfig) -> Self {
        Self {
            matcher: Matcher::new(cfg),
        }
    }

    pub fn config(&self) -> &MatchConfig {
        self.matcher.config()
    }

    /// Computes the screen edge map once and selects the best target.
    pub fn select_best(
        &self,
        screen: &DynamicImage,
        store: &TemplateStore,
    ) -> EdgeClickResult<Selection> {
        let edges = edge_map_dynamic(screen, self.matcher.config().edges)?;
        self.select_best_edges(edges.view(), store)
    }

    /// Selects the best target given a precomputed screen edge map.
    ///
    /// A target replaces the current best only with a strictly higher
    /// confidence, starting from `0.0`: ties keep the earlier-registered
    /// target and non-positive correlations never match.
    pub fn select_best_edges(
        &self,
        screen_edges: ImageView<'_, u8>,
        store: &TemplateStore,
    ) -> EdgeClickResult<Selection> {
        let _span = trace_span!("select_best", targets = store.len()).entered();
        let templates: Vec<&TargetTemplate> = store.iter().collect();
        let plans: Vec<_> = templates.iter().map(|t| t.plan()).collect();
        let results = self.matcher.match_many(screen_edges, &plans)?;

        let mut best_confidence = 0.0f32;
        let mut selection = Selection::NoMatch;
        for (template, result) in templates.iter().zip(results) {
            let Some(found) = result else {
                trace_event!("target_unmatched", target = template.name());
                continue;
            };
            trace_event!(
                "target_scored",
                target = template.name(),
                score = found.score,
                factor = found.factor
            );
            if found.score > best_confidence {
                best_confidence = found.score;
                selection = Selection::Match(TargetMatch {
                    name: template.name().to_string(),
                    confidence: found.score,
                    location: (found.x, found.y),
                    ratio: found.ratio,
                    template_size: (template.height(), template.width()),
                });
            }
        }
        Ok(selection)
    }
}
