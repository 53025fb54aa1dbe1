//! Summed-area tables for constant-time window statistics.

use crate::image::ImageView;

/// Integral images of pixel values and squared pixel values.
///
/// Tables are `(width + 1) x (height + 1)` with a zero first row and column,
/// so `sum[y * (width + 1) + x]` covers the rectangle `[0, x) x [0, y)`.
/// Accumulation is exact in `u64` for any realistic screen size.
#[derive(Clone, Debug)]
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sum_sq: Vec<u64>,
}

impl IntegralImage {
    /// Builds both tables in a single pass over the view.
    pub fn build(view: ImageView<'_, u8>) -> Self {
        let width = view.width();
        let height = view.height();
        let cols = width + 1;
        let len = cols * (height + 1);
        let mut sum = vec![0u64; len];
        let mut sum_sq = vec![0u64; len];

        for y in 0..height {
            let row = match view.row(y) {
                Some(row) => row,
                None => break,
            };
            let mut row_sum = 0u64;
            let mut row_sum_sq = 0u64;
            for (x, &value) in row.iter().enumerate() {
                let v = u64::from(value);
                row_sum += v;
                row_sum_sq += v * v;
                let idx = (y + 1) * cols + x + 1;
                sum[idx] = sum[idx - cols] + row_sum;
                sum_sq[idx] = sum_sq[idx - cols] + row_sum_sq;
            }
        }

        Self {
            width,
            height,
            sum,
            sum_sq,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(sum, sum_of_squares)` over the `w x h` window at `(x, y)`.
    ///
    /// The window must lie inside the image.
    #[inline]
    pub fn window_sums(&self, x: usize, y: usize, w: usize, h: usize) -> (u64, u64) {
        debug_assert!(x + w <= self.width && y + h <= self.height);
        let cols = self.width + 1;
        let a = y * cols + x;
        let b = y * cols + x + w;
        let c = (y + h) * cols + x;
        let d = (y + h) * cols + x + w;
        let s = self.sum[d] + self.sum[a] - self.sum[b] - self.sum[c];
        let s2 = self.sum_sq[d] + self.sum_sq[a] - self.sum_sq[b] - self.sum_sq[c];
        (s, s2)
    }
}
