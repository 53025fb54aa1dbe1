//! One resized level of the screen edge map.

use crate::image::{resize_bilinear, ImageView, IntegralImage, OwnedImage};
use crate::kernel::SearchImage;
use crate::util::EdgeClickResult;

/// Screen edge map resized by one sweep factor, with its integral images.
pub struct ScreenLevel {
    factor: f64,
    ratio: f64,
    image: OwnedImage,
    integral: IntegralImage,
}

impl ScreenLevel {
    /// Resizes `screen_edges` by `factor` and precomputes window sums.
    pub fn build(screen_edges: ImageView<'_, u8>, factor: f64) -> EdgeClickResult<Self> {
        let image = resize_bilinear(screen_edges, factor)?;
        let ratio = screen_edges.width() as f64 / image.width() as f64;
        let integral = IntegralImage::build(image.view());
        Ok(Self {
            factor,
            ratio,
            image,
            integral,
        })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Multiplier from level coordinates back to original screen pixels.
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn width(&self) -> usize {
        self.image.width()
    }

    pub fn height(&self) -> usize {
        self.image.height()
    }

    /// True when a `width x height` template has at least one placement.
    pub fn fits(&self, width: usize, height: usize) -> bool {
        self.width() >= width && self.height() >= height
    }

    pub fn view(&self) -> ImageView<'_, u8> {
        self.image.view()
    }

    pub(crate) fn search(&self) -> SearchImage<'_> {
        SearchImage::new(self.image.view(), &self.integral)
    }
}
