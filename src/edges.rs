//! Binary edge maps.
//!
//! Both targets and screens are matched as Canny edge maps so that colour,
//! theme and anti-aliasing differences between the reference image and the
//! live screen do not dominate the correlation score.

use crate::image::io::owned_from_gray_image;
use crate::image::OwnedImage;
use crate::util::{EdgeClickError, EdgeClickResult};
use image::{DynamicImage, GrayImage};

/// Hysteresis thresholds for the edge detector, in gradient magnitude units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeParams {
    /// Gradients below this are never edges.
    pub low_threshold: f32,
    /// Gradients above this always seed an edge.
    pub high_threshold: f32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
        }
    }
}

impl EdgeParams {
    pub fn validate(&self) -> EdgeClickResult<()> {
        let finite = self.low_threshold.is_finite() && self.high_threshold.is_finite();
        if !finite || self.low_threshold < 0.0 {
            return Err(EdgeClickError::InvalidConfig(format!(
                "edge thresholds must be finite and non-negative, got {} / {}",
                self.low_threshold, self.high_threshold
            )));
        }
        if self.low_threshold > self.high_threshold {
            return Err(EdgeClickError::InvalidConfig(format!(
                "low edge threshold {} exceeds high threshold {}",
                self.low_threshold, self.high_threshold
            )));
        }
        Ok(())
    }
}

/// Runs Canny edge detection; edge pixels are 255, everything else 0.
pub fn edge_map(gray: &GrayImage, params: EdgeParams) -> GrayImage {
    imageproc::edges::canny(gray, params.low_threshold, params.high_threshold)
}

/// Converts any decoded image to grayscale and returns its edge map.
pub fn edge_map_dynamic(img: &DynamicImage, params: EdgeParams) -> EdgeClickResult<OwnedImage> {
    let gray = img.to_luma8();
    owned_from_gray_image(&edge_map(&gray, params))
}
