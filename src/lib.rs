//! EdgeClick finds known UI buttons on a screen capture and decides where to
//! click.
//!
//! Both the screen and every target image are reduced to binary edge maps, so
//! matching is insensitive to colour themes. The screen edge map is swept over
//! a small range of scale factors to absorb unknown DPI or zoom, and each
//! target is scored with zero-mean normalized cross-correlation. The best
//! target above a confidence threshold is clicked at most once per cooldown
//! window.

pub mod candidate;
pub mod decide;
pub mod edges;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use decide::{ClickDecision, ClickPoint, ClickPolicy, ClickSink, CooldownState, Decision};
pub use edges::{edge_map, edge_map_dynamic, EdgeParams};
pub use image::{resize_bilinear, ImageView, IntegralImage, OwnedImage};
pub use search::{
    MatchConfig, Matcher, ScaleMatch, ScaleSweep, ScreenLevel, Selection, TargetMatch,
    TargetSelector,
};
pub use template::{TargetSpec, TargetTemplate, TemplatePlan, TemplateStore};
pub use util::{EdgeClickError, EdgeClickResult};
