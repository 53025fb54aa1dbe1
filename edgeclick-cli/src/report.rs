//! One-shot detection against an image file.

use crate::config::Config;
use edgeclick::image::io::load_dynamic_image;
use edgeclick::{
    ClickDecision, CooldownState, Decision, Selection, TargetSelector, TemplateStore,
};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, Serialize)]
pub struct MatchRecord {
    pub name: String,
    pub confidence: f32,
    pub x: usize,
    pub y: usize,
    pub ratio: f64,
    pub click_x: i32,
    pub click_y: i32,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub image: String,
    pub threshold: f32,
    pub best: Option<MatchRecord>,
    pub would_click: bool,
}

impl Report {
    pub fn new(image: &Path, selection: &Selection, decision: &Decision, threshold: f32) -> Self {
        let best = selection.as_match().map(|m| {
            let click = m.click_point();
            MatchRecord {
                name: m.name.clone(),
                confidence: m.confidence,
                x: m.location.0,
                y: m.location.1,
                ratio: m.ratio,
                click_x: click.x,
                click_y: click.y,
            }
        });
        Self {
            image: image.display().to_string(),
            threshold,
            best,
            would_click: decision.is_click(),
        }
    }
}

/// Detects once against `image` and returns the report; never clicks.
pub fn detect_once(
    config: &Config,
    store: &TemplateStore,
    image: &Path,
) -> Result<Report, Box<dyn Error>> {
    let screen = load_dynamic_image(image)?;
    let selector = TargetSelector::new(config.match_config());
    let selection = selector.select_best(&screen, store)?;
    let decision = ClickDecision::new(config.click_policy()).evaluate(
        &selection,
        &CooldownState::new(store.names()),
        Instant::now(),
    )?;
    Ok(Report::new(image, &selection, &decision, config.threshold))
}
