//! Error types for edgeclick.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for edgeclick operations.
pub type EdgeClickResult<T> = std::result::Result<T, EdgeClickError>;

/// Errors that can occur while loading targets, matching, or clicking.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EdgeClickError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is shorter than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the view requires.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// Template does not fit inside the image being scanned.
    #[error("template {tpl_width}x{tpl_height} larger than image {img_width}x{img_height}")]
    TemplateTooLarge {
        tpl_width: usize,
        tpl_height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Template edge map has no variance and can never correlate.
    #[error("degenerate template: {reason}")]
    DegenerateTemplate { reason: &'static str },
    /// A configuration value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    /// A target image could not be read at startup.
    #[error("missing asset for target '{label}' at {}: {reason}", path.display())]
    MissingAsset {
        label: String,
        path: PathBuf,
        reason: String,
    },
    /// A captured screenshot could not be decoded.
    #[error("failed to read capture: {reason}")]
    CaptureRead { reason: String },
    /// The screen could not be captured at all.
    #[error("screen capture failed: {reason}")]
    Capture { reason: String },
    /// The pointing device refused a click.
    #[error("click dispatch failed: {reason}")]
    Dispatch { reason: String },
    /// A target name outside the loaded template set.
    #[error("unknown target '{0}'")]
    UnknownTarget(String),
    /// The pointer was parked in a screen corner; the loop must stop.
    #[error("fail-safe triggered: pointer at ({x}, {y})")]
    FailSafe { x: i32, y: i32 },
}

impl EdgeClickError {
    /// Returns true for the abort condition that ends the polling loop.
    pub fn is_abort(&self) -> bool {
        matches!(self, EdgeClickError::FailSafe { .. })
    }
}
