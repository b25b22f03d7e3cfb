//! Masked arithmetic: division and logarithms that never yield NaN or ±∞
//!
//! Every division and logarithm in the divergence terms goes through these
//! two functions. Both are total over f64, NaN included.

use ndarray::{Array1, Zip};

/// `num / den` if `den > 0`, else 0
///
/// A non-finite quotient (e.g. an infinite numerator) also collapses to 0.
#[inline]
pub fn masked_ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        let q = num / den;
        if q.is_finite() {
            q
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// `log₂(x)` if `x > 0`, else 0
///
/// Covers x = 0, negative x, NaN and +∞.
#[inline]
pub fn masked_log2(x: f64) -> f64 {
    if x > 0.0 {
        let l = x.log2();
        if l.is_finite() {
            l
        } else {
            0.0
        }
    } else {
        0.0
    }
}

/// Element-wise [`masked_ratio`]
pub fn ratio(num: &Array1<f64>, den: &Array1<f64>) -> Array1<f64> {
    Zip::from(num).and(den).map_collect(|&n, &d| masked_ratio(n, d))
}

/// Element-wise [`masked_log2`]
pub fn log2(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(masked_log2)
}
