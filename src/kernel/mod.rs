//! Normalized cross-correlation kernels.
//!
//! Scores are zero-mean normalized cross-correlation between the template and
//! each image window: `sum((t - t_mean) * (i - i_mean)) / sqrt(var_t * var_i)`.
//! A window with no variance scores `0.0`.

use crate::candidate::Peak;
use crate::image::{ImageView, IntegralImage};
use crate::util::{EdgeClickError, EdgeClickResult};

pub mod scalar;

pub use scalar::{ZnccDenseScalar, ZnccSparseScalar};

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug)]
pub struct ScanParams {
    /// Maximum number of peaks to retain.
    pub topk: usize,
    /// Window variance (sum of squared deviations) at or below which the
    /// window counts as flat and scores zero.
    pub min_var_i: f32,
    /// Peaks scoring below this are discarded.
    pub min_score: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            topk: 1,
            min_var_i: 1e-6,
            min_score: f32::NEG_INFINITY,
        }
    }
}

/// An image to scan together with its summed-area tables.
#[derive(Clone, Copy)]
pub struct SearchImage<'a> {
    pub view: ImageView<'a, u8>,
    pub integral: &'a IntegralImage,
}

impl<'a> SearchImage<'a> {
    pub fn new(view: ImageView<'a, u8>, integral: &'a IntegralImage) -> Self {
        Self { view, integral }
    }

    pub fn width(&self) -> usize {
        self.view.width()
    }

    pub fn height(&self) -> usize {
        self.view.height()
    }
}

/// Kernel trait for scoring and scan operations.
pub trait Kernel {
    type Plan;

    /// Score at a single placement (top-left coordinates), or `None` when the
    /// template does not fit there.
    fn score_at(
        image: SearchImage<'_>,
        plan: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> Option<f32>;

    /// Scans every valid placement and returns the top-K peaks, best first.
    fn scan_full(
        image: SearchImage<'_>,
        plan: &Self::Plan,
        scale_idx: usize,
        params: ScanParams,
    ) -> EdgeClickResult<Vec<Peak>>;
}

/// Last valid top-left placement, or an error when the template is larger.
pub(crate) fn placement_range(
    img_width: usize,
    img_height: usize,
    tpl_width: usize,
    tpl_height: usize,
) -> EdgeClickResult<(usize, usize)> {
    if img_width < tpl_width || img_height < tpl_height {
        return Err(EdgeClickError::TemplateTooLarge {
            tpl_width,
            tpl_height,
            img_width,
            img_height,
        });
    }
    Ok((img_width - tpl_width, img_height - tpl_height))
}
