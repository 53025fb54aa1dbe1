//! Scalar correlation kernels.
//!
//! `ZnccDenseScalar` is the direct reference: it visits every template pixel
//! at every placement. `ZnccSparseScalar` exploits the sparsity of edge maps:
//! window sums come from integral images and the cross term only touches the
//! template's non-zero taps, using
//! `sum((t - t_mean)(i - i_mean)) = sum(t * i) - sum(t) * sum(i) / n`.
//! All sparse arithmetic before the final division is exact integer math, so
//! results are bit-for-bit reproducible.

use crate::candidate::{Peak, TopK};
use crate::kernel::{placement_range, Kernel, ScanParams, SearchImage};
use crate::template::TemplatePlan;
use crate::util::EdgeClickResult;

/// Dense reference kernel.
pub struct ZnccDenseScalar;

/// Sparse-tap kernel used by the matcher.
pub struct ZnccSparseScalar;

impl ZnccDenseScalar {
    fn score_unchecked(
        image: SearchImage<'_>,
        tpl: &TemplatePlan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> f32 {
        let tpl_width = tpl.width();
        let zero_mean = tpl.zero_mean();
        let n = tpl.len() as f64;

        let mut dot = 0.0f64;
        let mut sum_i = 0.0f64;
        let mut sum_i2 = 0.0f64;
        for ty in 0..tpl.height() {
            let Some(img_row) = image.view.row(y + ty) else {
                return 0.0;
            };
            let base = ty * tpl_width;
            for tx in 0..tpl_width {
                let value = f64::from(img_row[x + tx]);
                dot += f64::from(zero_mean[base + tx]) * value;
                sum_i += value;
                sum_i2 += value * value;
            }
        }

        let var_i = sum_i2 - (sum_i * sum_i) / n;
        if var_i <= f64::from(min_var_i) {
            return 0.0;
        }
        let score = dot / (tpl.var_t() * var_i).sqrt();
        if score.is_finite() {
            score as f32
        } else {
            0.0
        }
    }
}

impl Kernel for ZnccDenseScalar {
    type Plan = TemplatePlan;

    fn score_at(
        image: SearchImage<'_>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> Option<f32> {
        let (max_x, max_y) =
            placement_range(image.width(), image.height(), tpl.width(), tpl.height()).ok()?;
        if x > max_x || y > max_y {
            return None;
        }
        Some(Self::score_unchecked(image, tpl, x, y, min_var_i))
    }

    fn scan_full(
        image: SearchImage<'_>,
        tpl: &Self::Plan,
        scale_idx: usize,
        params: ScanParams,
    ) -> EdgeClickResult<Vec<Peak>> {
        let (max_x, max_y) =
            placement_range(image.width(), image.height(), tpl.width(), tpl.height())?;
        let mut topk = TopK::new(params.topk);
        for y in 0..=max_y {
            for x in 0..=max_x {
                let score = Self::score_unchecked(image, tpl, x, y, params.min_var_i);
                if score >= params.min_score {
                    topk.push(Peak {
                        x,
                        y,
                        score,
                        scale_idx,
                    });
                }
            }
        }
        Ok(topk.into_sorted_desc())
    }
}

/// Per-scan constants for the sparse kernel.
struct SparseScan<'a> {
    data: &'a [u8],
    /// Tap offsets relative to the window origin in the image buffer.
    offsets: Vec<(usize, u64)>,
    n: i128,
    sum_t: i128,
    /// `n * var_t`, exact.
    var_t_n: f64,
    tpl_width: usize,
    tpl_height: usize,
    min_var_i: f64,
}

impl<'a> SparseScan<'a> {
    fn new(image: SearchImage<'a>, tpl: &TemplatePlan, min_var_i: f32) -> Self {
        let stride = image.view.stride();
        let offsets = tpl
            .taps()
            .iter()
            .map(|tap| (tap.dy * stride + tap.dx, u64::from(tap.value)))
            .collect();
        let n = tpl.len() as i128;
        let sum_t = i128::from(tpl.sum());
        let var_t_n = n * i128::from(tpl.sum_sq()) - sum_t * sum_t;
        Self {
            data: image.view.as_slice(),
            offsets,
            n,
            sum_t,
            var_t_n: var_t_n as f64,
            tpl_width: tpl.width(),
            tpl_height: tpl.height(),
            min_var_i: f64::from(min_var_i),
        }
    }

    #[inline]
    fn score(&self, image: SearchImage<'_>, x: usize, y: usize) -> f32 {
        let (sum_i, sum_i2) = image
            .integral
            .window_sums(x, y, self.tpl_width, self.tpl_height);
        if sum_i == 0 {
            return 0.0;
        }
        let sum_i = i128::from(sum_i);
        let var_i_n = self.n * i128::from(sum_i2) - sum_i * sum_i;
        if var_i_n as f64 / self.n as f64 <= self.min_var_i {
            return 0.0;
        }

        let base = y * image.view.stride() + x;
        let mut dot = 0u64;
        for &(offset, value) in &self.offsets {
            dot += value * u64::from(self.data[base + offset]);
        }

        let num_n = self.n * i128::from(dot) - self.sum_t * sum_i;
        let score = num_n as f64 / (self.var_t_n * var_i_n as f64).sqrt();
        if score.is_finite() {
            score as f32
        } else {
            0.0
        }
    }
}

impl Kernel for ZnccSparseScalar {
    type Plan = TemplatePlan;

    fn score_at(
        image: SearchImage<'_>,
        tpl: &Self::Plan,
        x: usize,
        y: usize,
        min_var_i: f32,
    ) -> Option<f32> {
        let (max_x, max_y) =
            placement_range(image.width(), image.height(), tpl.width(), tpl.height()).ok()?;
        if x > max_x || y > max_y {
            return None;
        }
        Some(SparseScan::new(image, tpl, min_var_i).score(image, x, y))
    }

    fn scan_full(
        image: SearchImage<'_>,
        tpl: &Self::Plan,
        scale_idx: usize,
        params: ScanParams,
    ) -> EdgeClickResult<Vec<Peak>> {
        let (max_x, max_y) =
            placement_range(image.width(), image.height(), tpl.width(), tpl.height())?;
        let scan = SparseScan::new(image, tpl, params.min_var_i);
        let mut topk = TopK::new(params.topk);
        for y in 0..=max_y {
            for x in 0..=max_x {
                let score = scan.score(image, x, y);
                if score >= params.min_score {
                    topk.push(Peak {
                        x,
                        y,
                        score,
                        scale_idx,
                    });
                }
            }
        }
        Ok(topk.into_sorted_desc())
    }
}

#[cfg(test)]
mod tests {
    use super::{ZnccDenseScalar, ZnccSparseScalar};
    use crate::kernel::{Kernel, ScanParams, SearchImage};
    use crate::template::TemplatePlan;
    use crate::{ImageView, IntegralImage};

    fn sparse_pattern(width: usize, height: usize, seed: usize) -> Vec<u8> {
        (0..width * height)
            .map(|i| {
                let (x, y) = (i % width, i / width);
                if (x * 7 + y * 13 + seed) % 5 == 0 {
                    255
                } else {
                    0
                }
            })
            .collect()
    }

    #[test]
    fn sparse_matches_dense_reference() {
        let (img_width, img_height) = (23, 17);
        let image = sparse_pattern(img_width, img_height, 3);
        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let integral = IntegralImage::build(view);
        let search = SearchImage::new(view, &integral);

        let tpl = sparse_pattern(6, 4, 1);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 6, 4).unwrap()).unwrap();

        for y in 0..=(img_height - 4) {
            for x in 0..=(img_width - 6) {
                let dense = ZnccDenseScalar::score_at(search, &plan, x, y, 1e-6).unwrap();
                let sparse = ZnccSparseScalar::score_at(search, &plan, x, y, 1e-6).unwrap();
                assert!(
                    (dense - sparse).abs() < 1e-4,
                    "({x}, {y}): dense {dense} sparse {sparse}"
                );
            }
        }

        // The pattern repeats, so several placements are exact copies; both
        // kernels must report the first one in scan order.
        let dense = ZnccDenseScalar::scan_full(search, &plan, 0, ScanParams::default()).unwrap();
        let sparse = ZnccSparseScalar::scan_full(search, &plan, 0, ScanParams::default()).unwrap();
        assert_eq!((dense[0].x, dense[0].y), (sparse[0].x, sparse[0].y));
        assert!((dense[0].score - sparse[0].score).abs() < 1e-4);
        assert!(sparse[0].score > 0.999);
    }

    #[test]
    fn exact_copy_scores_one() {
        let (img_width, img_height) = (30, 20);
        let mut image = vec![0u8; img_width * img_height];
        let tpl = sparse_pattern(8, 5, 2);
        for ty in 0..5 {
            for tx in 0..8 {
                image[(9 + ty) * img_width + 11 + tx] = tpl[ty * 8 + tx];
            }
        }
        let view = ImageView::from_slice(&image, img_width, img_height).unwrap();
        let integral = IntegralImage::build(view);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 8, 5).unwrap()).unwrap();

        let peaks = ZnccSparseScalar::scan_full(
            SearchImage::new(view, &integral),
            &plan,
            0,
            ScanParams::default(),
        )
        .unwrap();
        assert_eq!((peaks[0].x, peaks[0].y), (11, 9));
        assert!((peaks[0].score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn flat_windows_score_zero() {
        let image = vec![0u8; 100];
        let view = ImageView::from_slice(&image, 10, 10).unwrap();
        let integral = IntegralImage::build(view);
        let tpl = sparse_pattern(3, 3, 0);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 3, 3).unwrap()).unwrap();
        let search = SearchImage::new(view, &integral);

        assert_eq!(ZnccSparseScalar::score_at(search, &plan, 2, 2, 1e-6), Some(0.0));
        assert_eq!(ZnccDenseScalar::score_at(search, &plan, 2, 2, 1e-6), Some(0.0));
        assert_eq!(ZnccSparseScalar::score_at(search, &plan, 8, 0, 1e-6), None);
    }

    #[test]
    fn oversized_template_is_an_error() {
        let image = vec![255u8; 16];
        let view = ImageView::from_slice(&image, 4, 4).unwrap();
        let integral = IntegralImage::build(view);
        let tpl = sparse_pattern(5, 2, 0);
        let plan = TemplatePlan::from_view(ImageView::from_slice(&tpl, 5, 2).unwrap()).unwrap();
        let result = ZnccSparseScalar::scan_full(
            SearchImage::new(view, &integral),
            &plan,
            0,
            ScanParams::default(),
        );
        assert!(result.is_err());
    }
}
