//! numerical_stability — shared tolerances and stable transforms.
//!
//! Purpose
//! -------
//! Centralize the small constants and guarded transforms used across the
//! likelihood, the covariance code and the model library, so every layer
//! agrees on what "infeasible", "singular" and "numerically zero" mean.
//!
//! Key behaviors
//! -------------
//! - `INFEASIBLE_LOGLIK`: finite penalty returned for infeasible θ.
//! - `EIGEN_EPS`: eigenvalue cutoff for pseudoinverses.
//! - `MONOTONE_TOL`: slack allowed when checking that a curve does not rise.
//! - `PROBABILITY_TOL`: slack allowed above one for a fitted detection
//!   probability.
//! - `softmax_with_reference`: overflow-guarded map from free logits to
//!   mixture weights.
//!
//! Conventions
//! -----------
//! - Pure functions over `f64` / `ndarray`; no I/O or logging.

pub mod transformations;

pub use self::transformations::{
    EIGEN_EPS, INFEASIBLE_LOGLIK, MONOTONE_TOL, PROBABILITY_TOL, softmax_with_reference,
};
