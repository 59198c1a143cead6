//! inference::covariance — observed-information covariance of θ̂.
//!
//! Purpose
//! -------
//! Turn a finite-difference Hessian of the negative average log-likelihood
//! into a covariance matrix for the unconstrained parameters, robust to
//! weakly identified directions.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`]: `Σ = J̄⁺ / n`, where `J̄` is the observed
//!   information per observation and `⁺` the eigenvalue-truncated
//!   Moore–Penrose pseudoinverse.
//! - [`standard_errors`]: `√diag Σ`.
//!
//! Invariants & assumptions
//! ------------------------
//! - The objective passed in is `-ℓ̄(θ)`, so its Hessian at a maximum is
//!   positive semi-definite.
//! - Eigenvalues `λ ≤ EIGEN_EPS` are dropped, never inverted; the matching
//!   directions contribute zero variance rather than infinity.
//!
//! Conventions
//! -----------
//! - `ndarray` at the boundary, `nalgebra` for the eigendecomposition.
//! - No explicit inverse is formed.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Theta, finite_diff::scalar_hessian, types::Hessian},
    numerical_stability::EIGEN_EPS,
};
use nalgebra::DMatrix;
use ndarray::{Array1, Array2};
use tracing::warn;

/// Covariance of θ̂ from the observed information.
///
/// Parameters
/// ----------
/// - `f`: `&F`
///   Negative average log-likelihood `θ ↦ -ℓ̄(θ)`. Should return `NaN` at
///   infeasible points so a stencil that leaves the feasible region is
///   reported as an error.
/// - `theta_hat`: `&Theta`
///   The maximizer.
/// - `n_obs`: `usize`
///   Number of observations averaged in `ℓ̄`.
///
/// Errors
/// ------
/// - `OptError::InvalidHessian` when the stencil produces a non-finite
///   entry.
pub fn calc_covariance<F: Fn(&Theta) -> f64>(
    f: &F, theta_hat: &Theta, n_obs: usize,
) -> OptResult<Array2<f64>> {
    let info = scalar_hessian(f, theta_hat)?;
    let mut info_nalg = DMatrix::<f64>::zeros(info.nrows(), info.ncols());
    fill_dmatrix(&info, &mut info_nalg);
    let pinv = pseudo_inverse(info_nalg);
    Ok(pinv / n_obs.max(1) as f64)
}

/// `√diag Σ`; negative rounding residue on the diagonal maps to 0.
pub fn standard_errors(covariance: &Array2<f64>) -> Array1<f64> {
    covariance.diag().mapv(|v| v.max(0.0).sqrt())
}

// ---- Helper methods ----

fn fill_dmatrix(info: &Hessian, info_nalg: &mut DMatrix<f64>) {
    for ((i, j), &value) in info.indexed_iter() {
        info_nalg[(i, j)] = value;
    }
}

/// `Σ_{k: λₖ > EIGEN_EPS} qₖ qₖᵀ / λₖ` from `J = Q Λ Qᵀ`.
fn pseudo_inverse(info_nalg: DMatrix<f64>) -> Array2<f64> {
    let n = info_nalg.nrows();
    let eigen = info_nalg.symmetric_eigen();
    let q = eigen.eigenvectors;
    let mut pinv = Array2::<f64>::zeros((n, n));
    let mut dropped = 0usize;
    for (k, &lambda) in eigen.eigenvalues.iter().enumerate() {
        if lambda <= EIGEN_EPS {
            dropped += 1;
            continue;
        }
        for i in 0..n {
            for j in 0..n {
                pinv[[i, j]] += q[(i, k)] * q[(j, k)] / lambda;
            }
        }
    }
    if dropped > 0 {
        warn!(dropped, dim = n, "information matrix is singular; flat directions get zero variance");
    }
    pinv
}
