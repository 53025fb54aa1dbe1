//! Bridges between the `image` crate and the matcher's buffers.

use crate::image::{ImageView, OwnedImage};
use crate::util::{EdgeClickError, EdgeClickResult};
use image::{DynamicImage, GrayImage};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &GrayImage) -> EdgeClickResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Copies a grayscale image buffer into an owned image.
pub fn owned_from_gray_image(img: &GrayImage) -> EdgeClickResult<OwnedImage> {
    OwnedImage::new(
        img.as_raw().clone(),
        img.width() as usize,
        img.height() as usize,
    )
}

/// Converts an owned image back into an `image` buffer, e.g. for saving.
pub fn gray_image_from_owned(img: &OwnedImage) -> Option<GrayImage> {
    GrayImage::from_raw(
        img.width() as u32,
        img.height() as u32,
        img.data().to_vec(),
    )
}

/// Opens an image file in any supported codec.
///
/// Failures surface as `CaptureRead`; callers loading target assets remap
/// them to `MissingAsset`.
pub fn load_dynamic_image<P: AsRef<Path>>(path: P) -> EdgeClickResult<DynamicImage> {
    let path = path.as_ref();
    image::open(path).map_err(|err| EdgeClickError::CaptureRead {
        reason: format!("{}: {err}", path.display()),
    })
}

/// Decodes an in-memory encoded image, guessing the codec from its header.
pub fn decode_image(bytes: &[u8]) -> EdgeClickResult<DynamicImage> {
    image::load_from_memory(bytes).map_err(|err| EdgeClickError::CaptureRead {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_image, gray_image_from_owned, owned_from_gray_image};
    use crate::EdgeClickError;
    use image::{GrayImage, Luma};

    #[test]
    fn gray_round_trip_keeps_dimensions() {
        let img = GrayImage::from_fn(5, 3, |x, y| Luma([(x * 10 + y) as u8]));
        let owned = owned_from_gray_image(&img).unwrap();
        assert_eq!((owned.width(), owned.height()), (5, 3));
        let back = gray_image_from_owned(&owned).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn garbage_bytes_are_capture_read_errors() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err, EdgeClickError::CaptureRead { .. }));
    }
}
