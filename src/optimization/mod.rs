//! optimization — MLE stack, numerical guards, and optimizer error surface.
//!
//! Purpose
//! -------
//! Provide the estimation machinery the fitting engine drives: an
//! Argmin-backed maximizer for log-likelihoods (`loglik_optimizer`), shared
//! numerical constants and the mixture-weight transform (`numerical_stability`), and
//! the optimizer error enum (`errors::OptError`).
//!
//! Conventions
//! -----------
//! - Solvers maximize `ℓ(θ)` by minimizing `c(θ) = -ℓ(θ)`; user-facing
//!   outcomes are in terms of `ℓ`.
//! - Parameters are unconstrained `ndarray` vectors; mapping to natural
//!   scale (exp for scales, softmax for mixture weights) lives in
//!   `crate::detection`.
//! - This layer returns `OptResult<T>`; `crate::errors::DsError` absorbs
//!   `OptError` at the public boundary.

pub mod errors;
pub mod loglik_optimizer;
pub mod numerical_stability;

