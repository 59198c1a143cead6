//! loglik_optimizer — Argmin-powered log-likelihood maximization.
//!
//! Purpose
//! -------
//! Let a model implement one trait, [`LogLikelihood`], and be fitted with
//! [`maximize`] by Nelder–Mead or L-BFGS, with finite-difference
//! derivatives when no analytic gradient exists.
//!
//! Key behaviors
//! -------------
//! - [`adapter::ArgMinAdapter`] turns `ℓ(θ)` into the Argmin cost `-ℓ(θ)`.
//! - [`maximize`] validates `θ₀` with [`LogLikelihood::check`], builds the
//!   solver named by [`OptimizerChoice`] via [`builders`], runs it via
//!   [`run`], and normalizes the result into an [`OptimOutcome`].
//! - [`finite_diff`] provides validated FD gradients and Hessians; the
//!   covariance code in `crate::inference` reuses [`finite_diff::scalar_hessian`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `OptimOutcome::converged` is true only for solver convergence or a
//!   reached target cost; an exhausted iteration budget is not convergence.
//! - Objectives return a finite penalty rather than an error for infeasible
//!   points, so the simplex can contract away from them.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; `api` runs every solver on a
//!   shifted quadratic bowl.

pub mod adapter;
pub mod api;
pub mod builders;
pub mod finite_diff;
pub mod run;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::maximize;
pub use self::traits::{LogLikelihood, MLEOptions, OptimOutcome, OptimizerChoice, Tolerances};
pub use self::types::{Cost, DEFAULT_LBFGS_MEM, DEFAULT_SIMPLEX_STEP, FnEvalMap, Grad, Theta};
