//! Template statistics precomputed once per target.

use crate::image::ImageView;
use crate::util::{EdgeClickError, EdgeClickResult};

/// Non-zero template pixel, stored as an offset from the template origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateTap {
    pub dx: usize,
    pub dy: usize,
    pub value: u32,
}

/// Precomputed sums, zero-mean buffer and sparse taps for correlation.
///
/// Edge maps are mostly zero, so the sparse kernel only visits `taps` and
/// recovers the zero-mean correlation from window sums. `var_t` is the
/// unnormalized variance `sum((t - mean)^2)`.
#[derive(Clone, Debug)]
pub struct TemplatePlan {
    width: usize,
    height: usize,
    sum_t: u64,
    sum_t2: u64,
    mean: f32,
    var_t: f64,
    zero_mean: Vec<f32>,
    taps: Vec<TemplateTap>,
}

impl TemplatePlan {
    /// Builds a plan from a template view.
    pub fn from_view(tpl: ImageView<'_, u8>) -> EdgeClickResult<Self> {
        let width = tpl.width();
        let height = tpl.height();
        let count = width
            .checked_mul(height)
            .ok_or(EdgeClickError::InvalidDimensions { width, height })?;

        let mut sum_t = 0u64;
        let mut sum_t2 = 0u64;
        let mut taps = Vec::new();
        for dy in 0..height {
            let row = tpl.row(dy).ok_or(EdgeClickError::BufferTooSmall {
                needed: (dy + 1) * tpl.stride(),
                got: tpl.as_slice().len(),
            })?;
            for (dx, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                sum_t += v;
                sum_t2 += v * v;
                if value != 0 {
                    taps.push(TemplateTap {
                        dx,
                        dy,
                        value: u32::from(value),
                    });
                }
            }
        }

        let n = count as f64;
        let mean_f64 = sum_t as f64 / n;
        let var_t = sum_t2 as f64 - (sum_t as f64 * sum_t as f64) / n;
        if var_t <= 1e-8 {
            return Err(EdgeClickError::DegenerateTemplate {
                reason: "zero variance",
            });
        }

        let mean = mean_f64 as f32;
        let mut zero_mean = Vec::with_capacity(count);
        for dy in 0..height {
            if let Some(row) = tpl.row(dy) {
                zero_mean.extend(row.iter().map(|&value| f32::from(value) - mean));
            }
        }

        Ok(Self {
            width,
            height,
            sum_t,
            sum_t2,
            mean,
            var_t,
            zero_mean,
            taps,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of template pixels.
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sum(&self) -> u64 {
        self.sum_t
    }

    pub fn sum_sq(&self) -> u64 {
        self.sum_t2
    }

    pub fn mean(&self) -> f32 {
        self.mean
    }

    /// Unnormalized variance `sum((t - mean)^2)`.
    pub fn var_t(&self) -> f64 {
        self.var_t
    }

    /// Zero-mean template values in row-major order.
    pub fn zero_mean(&self) -> &[f32] {
        &self.zero_mean
    }

    /// Non-zero template pixels in row-major order.
    pub fn taps(&self) -> &[TemplateTap] {
        &self.taps
    }
}
