//! Numerical stability utilities.
//!
//! Guarded maps from the unconstrained optimizer space to natural
//! detection-function parameters, plus the shared tolerances the fitting
//! and inference layers agree on.
use ndarray::{Array1, ArrayView1};

/// Average log-likelihood reported for an infeasible parameter vector.
///
/// Finite so that simplex and line-search bookkeeping stay well defined;
/// far below any attainable average log-likelihood for real data.
pub const INFEASIBLE_LOGLIK: f64 = -1e10;

/// Eigenvalues at or below this are treated as zero in pseudoinverses.
pub const EIGEN_EPS: f64 = 1e-10;

/// Slack allowed between consecutive grid values when checking that a
/// detection curve is non-increasing.
pub const MONOTONE_TOL: f64 = 1e-12;

/// Slack allowed above one for a detection probability computed by
/// quadrature.
pub const PROBABILITY_TOL: f64 = 1e-9;

/// Softmax over `logits` with an implicit trailing reference logit of 0.
///
/// `m - 1` free logits map to `m` non-negative weights that
/// sum to one. The max shift keeps large logits from overflowing.
///
/// # Examples
/// ```rust
/// # use ndarray::array;
/// # use rust_distance::optimization::numerical_stability::softmax_with_reference;
/// let w = softmax_with_reference(array![0.0].view());
/// assert!((w[0] - 0.5).abs() < 1e-15 && (w[1] - 0.5).abs() < 1e-15);
/// ```
pub fn softmax_with_reference(logits: ArrayView1<f64>) -> Array1<f64> {
    let m = logits.len() + 1;
    let mut full = Array1::<f64>::zeros(m);
    full.slice_mut(ndarray::s![..m - 1]).assign(&logits);
    let max = full.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    full.mapv_inplace(|z| (z - max).exp());
    let total = full.sum();
    full / total
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Mass conservation and overflow safety of the reference softmax.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Weights sum to one and stay finite for extreme logits.
    //
    // Given
    // -----
    // - Logits [800, -800] with the implicit reference 0.
    //
    // Expect
    // ------
    // - Weights ≈ [1, 0, 0], all finite, sum exactly to one within 1e-15.
    fn softmax_with_reference_is_overflow_safe() {
        // Act
        let w = softmax_with_reference(array![800.0, -800.0].view());

        // Assert
        assert_eq!(w.len(), 3);
        assert!(w.iter().all(|v| v.is_finite() && *v >= 0.0));
        assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(w[0], 1.0, epsilon = 1e-15);
    }
}
