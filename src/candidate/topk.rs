//! Top-K peak tracking with deterministic ordering.
//!
//! Peaks are ranked by descending score; equal scores fall back to scan order
//! (smaller `y`, then smaller `x`, then smaller scale index), so the first
//! maximum met by a row-major scan is the one reported.

use std::cmp::Ordering;

/// Correlation peak at a template placement in one scaled screen level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Peak {
    /// Column of the template's top-left corner.
    pub x: usize,
    /// Row of the template's top-left corner.
    pub y: usize,
    /// Normalized correlation score, roughly in `[-1, 1]`.
    pub score: f32,
    /// Index of the scale level the peak was found in.
    pub scale_idx: usize,
}

fn peak_cmp_desc(a: &Peak, b: &Peak) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.y.cmp(&b.y))
        .then_with(|| a.x.cmp(&b.x))
        .then_with(|| a.scale_idx.cmp(&b.scale_idx))
}

/// The `k` best peaks seen so far, kept sorted best first.
///
/// The matcher asks for a single peak per level; larger `k` is used when
/// comparing kernels against each other.
pub struct TopK {
    k: usize,
    ranked: Vec<Peak>,
}

impl TopK {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            ranked: Vec::with_capacity(k.min(64)),
        }
    }

    /// Inserts `peak` at its rank and drops whatever falls past `k`.
    pub fn push(&mut self, peak: Peak) {
        let rank = self
            .ranked
            .partition_point(|kept| peak_cmp_desc(kept, &peak) == Ordering::Less);
        if rank >= self.k {
            return;
        }
        if self.ranked.len() == self.k {
            self.ranked.pop();
        }
        self.ranked.insert(rank, peak);
    }

    /// Returns the retained peaks, best first.
    pub fn into_sorted_desc(self) -> Vec<Peak> {
        self.ranked
    }
}

#[cfg(test)]
mod tests {
    use super::{Peak, TopK};

    fn peak(x: usize, y: usize, score: f32) -> Peak {
        Peak {
            x,
            y,
            score,
            scale_idx: 0,
        }
    }

    #[test]
    fn keeps_best_scores() {
        let mut topk = TopK::new(2);
        topk.push(peak(0, 0, 0.1));
        topk.push(peak(1, 0, 0.9));
        topk.push(peak(2, 0, 0.5));
        topk.push(peak(3, 0, 0.2));
        let peaks = topk.into_sorted_desc();
        assert_eq!(peaks.len(), 2);
        assert_eq!(peaks[0].x, 1);
        assert_eq!(peaks[1].x, 2);
    }

    #[test]
    fn ties_prefer_first_in_scan_order() {
        let mut topk = TopK::new(1);
        topk.push(peak(5, 2, 0.7));
        topk.push(peak(1, 3, 0.7));
        topk.push(peak(0, 2, 0.7));
        let best = topk.into_sorted_desc();
        assert_eq!((best[0].x, best[0].y), (0, 2));
    }

    #[test]
    fn late_better_peaks_evict_from_the_tail() {
        let mut topk = TopK::new(3);
        for (x, score) in [(0, 0.2), (1, 0.4), (2, 0.3), (3, 0.9), (4, 0.1), (5, 0.35)] {
            topk.push(peak(x, 0, score));
        }
        let ranked: Vec<usize> = topk.into_sorted_desc().iter().map(|p| p.x).collect();
        assert_eq!(ranked, [3, 1, 5]);
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut topk = TopK::new(0);
        topk.push(peak(0, 0, 1.0));
        assert!(topk.into_sorted_desc().is_empty());
    }
}
