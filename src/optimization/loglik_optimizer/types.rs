//! loglik_optimizer::types — numeric aliases and solver wiring.
//!
//! Purpose
//! -------
//! Keep `ndarray` and Argmin generics in one place so the rest of the
//! optimizer refers to `Theta`, `Grad`, `Cost` and a handful of concrete
//! solver aliases.
//!
//! Conventions
//! -----------
//! - `Theta` and `Grad` have one entry per free parameter of the
//!   detection-function layout (log scales, covariate coefficients,
//!   adjustment coefficients, mixture logits).
//! - `Cost` is the negated average log-likelihood handed to Argmin.
//! - `Hessian` is `theta.len() × theta.len()` when used.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    neldermead::NelderMead,
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

/// Unconstrained parameter vector `θ`.
pub type Theta = Array1<f64>;

/// Gradient vector, same length as [`Theta`].
pub type Grad = Array1<f64>;

/// Dense Hessian / observed-information matrix.
pub type Hessian = Array2<f64>;

/// Scalar objective value seen by Argmin, `c(θ) = -ℓ̄(θ)`.
pub type Cost = f64;

/// Function-evaluation counters reported by Argmin (e.g. `"cost_count"`).
pub type FnEvalMap = HashMap<String, u64>;

/// Default history size (`m`) for L-BFGS runs.
pub const DEFAULT_LBFGS_MEM: usize = 7;

/// Default edge length of the initial Nelder–Mead simplex, in θ units.
///
/// Scale and shape parameters are log-transformed, so a quarter step moves
/// σ by roughly 28%.
pub const DEFAULT_SIMPLEX_STEP: f64 = 0.25;

/// Hager–Zhang line search over the crate's numeric types.
pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;

/// More–Thuente line search over the crate's numeric types.
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

/// L-BFGS wired to the Hager–Zhang line search.
pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;

/// L-BFGS wired to the More–Thuente line search.
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;

/// Derivative-free Nelder–Mead simplex.
pub type NelderMeadSimplex = NelderMead<Theta, Cost>;
