//! Peak bookkeeping for correlation scans.

pub mod topk;

pub use topk::{Peak, TopK};
