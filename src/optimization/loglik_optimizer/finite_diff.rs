//! loglik_optimizer::finite_diff — finite-difference gradient and Hessian helpers.
//!
//! Purpose
//! -------
//! Wrap the `finitediff` crate with validation so the optimizer and the
//! covariance code can request derivatives of a scalar objective without
//! touching the FD API directly.
//!
//! Key behaviors
//! -------------
//! - [`run_fd_diff`]: forward-difference gradient with error capture.
//! - [`scalar_hessian`]: Hessian of a scalar function from a central
//!   second-difference stencil.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned gradients and Hessians pass [`validate_grad`] /
//!   [`validate_hessian`]: right shape, finite entries.
//! - A scalar function signals an invalid point by returning `NaN`; the NaN
//!   propagates into the Hessian and surfaces as `InvalidHessian`.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, Theta,
        types::Hessian,
        validation::{validate_grad, validate_hessian},
    },
};
use argmin::core::Error;
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Forward-difference gradient of `func` at `theta`, with error capture.
///
/// `func` cannot return `Result`, so callers park the first evaluation
/// error in `closure_err` and return `NaN`. This helper clears the cell,
/// differentiates, and turns a captured error back into an `Err`.
///
/// # Errors
/// - The captured error, converted through `From<argmin::core::Error>`.
/// - `GradientDimMismatch` / `InvalidGradient` from [`validate_grad`].
pub fn run_fd_diff<G: Fn(&Theta) -> f64>(
    theta: &Theta, func: &G, closure_err: &RefCell<Option<Error>>,
) -> OptResult<Grad> {
    closure_err.replace(None);
    let fd_grad = theta.forward_diff(func);
    if let Some(err) = closure_err.take() {
        return Err(err.into());
    }
    validate_grad(&fd_grad, theta.len())?;
    Ok(fd_grad)
}

/// Relative step for [`scalar_hessian`]: `ε^{1/4} = 2⁻¹³`.
pub const HESSIAN_STEP: f64 = 1.220_703_125e-4;

/// Hessian of a scalar function `f` at `theta` from a central
/// second-difference stencil with steps `hᵢ = HESSIAN_STEP · max(|θᵢ|, 1)`.
///
/// Diagonal: `(f(θ + hᵢeᵢ) - 2f(θ) + f(θ - hᵢeᵢ)) / hᵢ²`.
/// Off-diagonal: the four-point cross difference over `4hᵢhⱼ`. The result
/// is symmetric by construction.
///
/// # Errors
/// - `InvalidHessian` if `f` returns a non-finite value anywhere the
///   stencil reaches.
pub fn scalar_hessian<F: Fn(&Theta) -> f64>(f: &F, theta: &Theta) -> OptResult<Hessian> {
    let dim = theta.len();
    let steps: Vec<f64> = theta.iter().map(|t| HESSIAN_STEP * t.abs().max(1.0)).collect();
    let f0 = f(theta);
    let mut x = theta.clone();
    let mut hess = Hessian::zeros((dim, dim));
    for i in 0..dim {
        let hi = steps[i];
        let plus = eval_shifted(f, &mut x, theta, &[(i, hi)]);
        let minus = eval_shifted(f, &mut x, theta, &[(i, -hi)]);
        hess[[i, i]] = (plus - 2.0 * f0 + minus) / (hi * hi);
        for j in 0..i {
            let hj = steps[j];
            let pp = eval_shifted(f, &mut x, theta, &[(i, hi), (j, hj)]);
            let pm = eval_shifted(f, &mut x, theta, &[(i, hi), (j, -hj)]);
            let mp = eval_shifted(f, &mut x, theta, &[(i, -hi), (j, hj)]);
            let mm = eval_shifted(f, &mut x, theta, &[(i, -hi), (j, -hj)]);
            let value = (pp - pm - mp + mm) / (4.0 * hi * hj);
            hess[[i, j]] = value;
            hess[[j, i]] = value;
        }
    }
    validate_hessian(&hess, dim)?;
    Ok(hess)
}

// ---- Helper methods ----

/// Evaluate `f` with the listed coordinates shifted, then restore them.
fn eval_shifted<F: Fn(&Theta) -> f64>(
    f: &F, x: &mut Theta, theta: &Theta, shifts: &[(usize, f64)],
) -> f64 {
    for &(i, h) in shifts {
        x[i] = theta[i] + h;
    }
    let value = f(x);
    for &(i, _) in shifts {
        x[i] = theta[i];
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptError;
    use approx::assert_abs_diff_eq;
    use argmin::core::ArgminError;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Forward-difference gradients with and without captured errors.
    // - Hessians of scalar functions.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A captured closure error wins over the numeric result.
    //
    // Given
    // -----
    // - A closure that parks an `ArgminError::NotImplemented` and returns NaN.
    //
    // Expect
    // ------
    // - `run_fd_diff` returns `OptError::NotImplemented`.
    fn run_fd_diff_closure_error_is_propagated() {
        // Arrange
        let theta: Theta = Array1::from(vec![1.0_f64]);
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_: &Theta| {
            let argmin_err = ArgminError::NotImplemented { text: "fd test".to_string() };
            closure_err.replace(Some(argmin_err.into()));
            f64::NAN
        };

        // Act
        let result = run_fd_diff(&theta, &f, &closure_err);

        // Assert
        assert!(matches!(result, Err(OptError::NotImplemented { .. })));
    }

    #[test]
    // Purpose
    // -------
    // A NaN objective without a captured error is still rejected.
    //
    // Given
    // -----
    // - An objective that always returns NaN.
    //
    // Expect
    // ------
    // - `OptError::InvalidGradient`.
    fn run_fd_diff_non_finite_gradient_is_rejected() {
        // Arrange
        let theta: Theta = array![0.0, 1.0];
        let closure_err: RefCell<Option<Error>> = RefCell::new(None);
        let f = |_x: &Theta| f64::NAN;

        // Act
        let result = run_fd_diff(&theta, &f, &closure_err);

        // Assert
        assert!(matches!(result, Err(OptError::InvalidGradient { .. })));
    }

    #[test]
    // Purpose
    // -------
    // The scalar Hessian recovers a known quadratic form.
    //
    // Given
    // -----
    // - f(θ) = 2θ₀² + θ₀θ₁ + 0.5θ₁², Hessian [[4, 1], [1, 1]].
    //
    // Expect
    // ------
    // - Entries match to 1e-4 and the matrix is exactly symmetric.
    fn scalar_hessian_matches_quadratic_form() {
        // Arrange
        let f = |t: &Theta| 2.0 * t[0] * t[0] + t[0] * t[1] + 0.5 * t[1] * t[1];
        let theta = array![0.3, -1.2];

        // Act
        let hess = scalar_hessian(&f, &theta).expect("Hessian should be computed");

        // Assert
        assert_abs_diff_eq!(hess[[0, 0]], 4.0, epsilon = 1e-4);
        assert_abs_diff_eq!(hess[[0, 1]], 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(hess[[1, 1]], 1.0, epsilon = 1e-4);
        assert_eq!(hess[[0, 1]], hess[[1, 0]]);
    }
}
