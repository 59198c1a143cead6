//! fitting — maximum-likelihood estimation of detection functions.
//!
//! Purpose
//! -------
//! Fit a [`ModelSpec`](crate::detection::ModelSpec) to observed distances
//! under the truncated line- or point-transect likelihood and return an
//! immutable [`FittedModel`].
//!
//! Key behaviors
//! -------------
//! - [`fit`] validates, truncates, optimizes and computes the covariance.
//! - [`FitControl`] carries every tuning knob; there is no global state.
//! - Adjusted models are held non-increasing on `[0, w]` by
//!   [`MonotonicityCheck`] unless the caller turns it off.
//!
//! Downstream usage
//! ----------------
//! - Rank fits with [`crate::selection::compare`].
//! - Check absolute fit with [`crate::goodness_of_fit::goodness_of_fit`].
pub mod control;
pub mod fit;
pub mod fitted;
pub mod likelihood;
pub mod monotonicity;
pub mod start;

pub use self::control::FitControl;
pub use self::fit::fit;
pub use self::fitted::{FittedModel, OptimizerReport, average_detection_probability, evaluate};
pub use self::likelihood::{CovariateGroup, DistanceLikelihood, FitData};
pub use self::monotonicity::MonotonicityCheck;
