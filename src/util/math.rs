//! Numeric helpers for the scale sweep and click geometry.

/// Returns `count` evenly spaced values from `start` to `end`, inclusive.
///
/// A single step yields `[start]`; zero steps yield an empty vector.
pub(crate) fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    if i == count - 1 {
                        end
                    } else {
                        start + step * i as f64
                    }
                })
                .collect()
        }
    }
}

/// Scales a pixel coordinate and truncates toward zero.
pub(crate) fn scale_trunc(value: usize, ratio: f64) -> i64 {
    (value as f64 * ratio) as i64
}
