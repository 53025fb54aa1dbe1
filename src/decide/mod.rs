//! Click decisions: confidence threshold and per-target cooldown.
//!
//! The decision is a function of the selection, the explicit
//! [`CooldownState`], and the caller's clock reading. Dispatching goes through
//! the [`ClickSink`] collaborator so the policy can be exercised without a
//! pointing device.

mod cooldown;

pub use cooldown::CooldownState;

use crate::search::Selection;
use crate::util::{EdgeClickError, EdgeClickResult};
use std::fmt;
use std::time::{Duration, Instant};

/// Screen pixel to click, in original capture coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ClickPoint {
    pub x: i32,
    pub y: i32,
}

impl fmt::Display for ClickPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Acceptance threshold and cooldown window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClickPolicy {
    /// Minimum confidence to click. Compared against correlation scores,
    /// not probabilities.
    pub threshold: f32,
    /// Minimum time between two clicks on the same target.
    pub cooldown: Duration,
}

impl Default for ClickPolicy {
    fn default() -> Self {
        Self {
            threshold: 0.70,
            cooldown: Duration::from_secs(15),
        }
    }
}

impl ClickPolicy {
    pub fn validate(&self) -> EdgeClickResult<()> {
        if !self.threshold.is_finite() {
            return Err(EdgeClickError::InvalidConfig(format!(
                "click threshold must be finite, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Something that can press the pointing device at a screen pixel.
pub trait ClickSink {
    /// Clicks at `point`. Returning `FailSafe` aborts the caller's loop.
    fn click(&mut self, point: ClickPoint) -> EdgeClickResult<()>;
}

/// What the policy decided for one selection.
#[derive(Clone, Debug, PartialEq)]
pub enum Decision {
    /// Nothing at or above the threshold.
    NoButton { best_confidence: f32 },
    /// The best target was clicked too recently.
    CooldownActive {
        name: String,
        confidence: f32,
        remaining: Duration,
    },
    /// The best target is (or, from [`ClickDecision::evaluate`], would be)
    /// clicked at `point`.
    Click {
        name: String,
        confidence: f32,
        point: ClickPoint,
    },
}

impl Decision {
    pub fn is_click(&self) -> bool {
        matches!(self, Decision::Click { .. })
    }

    pub fn point(&self) -> Option<ClickPoint> {
        match self {
            Decision::Click { point, .. } => Some(*point),
            _ => None,
        }
    }
}

/// Applies a [`ClickPolicy`] to selections.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClickDecision {
    policy: ClickPolicy,
}

impl ClickDecision {
    pub fn new(policy: ClickPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &ClickPolicy {
        &self.policy
    }

    /// Decides without dispatching or touching the cooldown state.
    pub fn evaluate(
        &self,
        selection: &Selection,
        cooldowns: &CooldownState,
        now: Instant,
    ) -> EdgeClickResult<Decision> {
        let found = match selection {
            Selection::Match(m) if m.confidence >= self.policy.threshold => m,
            _ => {
                return Ok(Decision::NoButton {
                    best_confidence: selection.best_confidence(),
                })
            }
        };

        if let Some(remaining) = cooldowns.remaining(&found.name, now, self.policy.cooldown)? {
            return Ok(Decision::CooldownActive {
                name: found.name.clone(),
                confidence: found.confidence,
                remaining,
            });
        }

        Ok(Decision::Click {
            name: found.name.clone(),
            confidence: found.confidence,
            point: found.click_point(),
        })
    }

    /// Decides, dispatches the click through `sink`, and records the cooldown.
    ///
    /// The cooldown is only recorded after the sink succeeds; a sink error is
    /// returned unchanged.
    pub fn decide(
        &self,
        selection: &Selection,
        cooldowns: &mut CooldownState,
        now: Instant,
        sink: &mut dyn ClickSink,
    ) -> EdgeClickResult<Decision> {
        let decision = self.evaluate(selection, cooldowns, now)?;
        if let Decision::Click { name, point, .. } = &decision {
            sink.click(*point)?;
            cooldowns.record(name, now)?;
        }
        Ok(decision)
    }
}
