//! Uniform bilinear resizing for the scale sweep.
//!
//! Sampling follows the usual half-pixel-center convention for a resize by
//! explicit factors: destination pixel `d` reads source coordinate
//! `(d + 0.5) / factor - 0.5`, clamped to the image. Output dimensions are
//! `round(src * factor)`, never smaller than one pixel.

use crate::image::{ImageView, OwnedImage};
use crate::util::{EdgeClickError, EdgeClickResult};

/// Returns the `(width, height)` produced by resizing with `factor`.
pub fn scaled_size(width: usize, height: usize, factor: f64) -> (usize, usize) {
    let scale = |len: usize| ((len as f64 * factor).round() as usize).max(1);
    (scale(width), scale(height))
}

#[derive(Clone, Copy)]
struct Tap {
    lo: usize,
    hi: usize,
    frac: f32,
}

fn axis_taps(src_len: usize, dst_len: usize, factor: f64) -> Vec<Tap> {
    let max = src_len - 1;
    (0..dst_len)
        .map(|d| {
            let pos = (d as f64 + 0.5) / factor - 0.5;
            if pos <= 0.0 {
                return Tap {
                    lo: 0,
                    hi: 0,
                    frac: 0.0,
                };
            }
            let lo = pos.floor() as usize;
            if lo >= max {
                return Tap {
                    lo: max,
                    hi: max,
                    frac: 0.0,
                };
            }
            Tap {
                lo,
                hi: lo + 1,
                frac: (pos - lo as f64) as f32,
            }
        })
        .collect()
}

/// Resizes a grayscale view by the same `factor` along both axes.
pub fn resize_bilinear(src: ImageView<'_, u8>, factor: f64) -> EdgeClickResult<OwnedImage> {
    if !(factor.is_finite() && factor > 0.0) {
        return Err(EdgeClickError::InvalidConfig(format!(
            "resize factor must be positive and finite, got {factor}"
        )));
    }
    let (dst_width, dst_height) = scaled_size(src.width(), src.height(), factor);
    let xs = axis_taps(src.width(), dst_width, factor);
    let ys = axis_taps(src.height(), dst_height, factor);

    let mut dst = Vec::with_capacity(dst_width * dst_height);
    for ty in &ys {
        let row0 = src.row(ty.lo).ok_or(EdgeClickError::BufferTooSmall {
            needed: (ty.lo + 1) * src.stride(),
            got: src.as_slice().len(),
        })?;
        let row1 = src.row(ty.hi).ok_or(EdgeClickError::BufferTooSmall {
            needed: (ty.hi + 1) * src.stride(),
            got: src.as_slice().len(),
        })?;
        for tx in &xs {
            let top = f32::from(row0[tx.lo]) * (1.0 - tx.frac) + f32::from(row0[tx.hi]) * tx.frac;
            let bottom =
                f32::from(row1[tx.lo]) * (1.0 - tx.frac) + f32::from(row1[tx.hi]) * tx.frac;
            let value = top * (1.0 - ty.frac) + bottom * ty.frac;
            dst.push(value.round().clamp(0.0, 255.0) as u8);
        }
    }

    OwnedImage::new(dst, dst_width, dst_height)
}
