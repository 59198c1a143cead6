//! inference — post-fit uncertainty for detection-function models.
//!
//! Purpose
//! -------
//! Quantify uncertainty around a maximum-likelihood fit: the covariance of
//! the unconstrained parameters θ̂ from the observed information, and
//! delta-method standard errors for derived quantities such as the average
//! detection probability.
//!
//! Key behaviors
//! -------------
//! - [`calc_covariance`]: eigenvalue-truncated pseudoinverse of the
//!   observed information, divided by the sample size.
//! - [`standard_errors`]: square roots of the covariance diagonal.
//! - [`delta_method_se`]: `√(∇hᵀ Σ ∇h)` for a scalar map `h(θ)`.
//!
//! Conventions
//! -----------
//! - Everything lives in the unconstrained optimizer space θ; natural-scale
//!   quantities are reached through the delta method.
//! - Failures are reported as [`OptError`](crate::optimization::errors::OptError);
//!   the fitting layer decides whether they are fatal.
pub mod covariance;
pub mod delta;

pub use self::covariance::{calc_covariance, standard_errors};
pub use self::delta::delta_method_se;
