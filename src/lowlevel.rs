//! Building blocks beneath the high-level selector.
//!
//! Kernels, plans, and per-level search images for callers assembling their
//! own matching pipelines or validating the kernels against each other. Most
//! users only need [`TargetSelector`](crate::TargetSelector) and
//! [`ClickDecision`](crate::ClickDecision).

pub use crate::candidate::{Peak, TopK};
pub use crate::image::io::{
    decode_image, gray_image_from_owned, load_dynamic_image, owned_from_gray_image,
    view_from_gray_image,
};
pub use crate::image::scaled_size;
pub use crate::kernel::{Kernel, ScanParams, SearchImage, ZnccDenseScalar, ZnccSparseScalar};
pub use crate::search::ScreenLevel;
pub use crate::template::TemplateTap;
