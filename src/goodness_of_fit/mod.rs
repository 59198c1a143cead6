//! goodness_of_fit — absolute fit of detection functions.
//!
//! Purpose
//! -------
//! Compare the model CDF of retained distances with their empirical CDF
//! using the Kolmogorov–Smirnov and Cramér–von Mises statistics.
//!
//! Key behaviors
//! -------------
//! - [`goodness_of_fit`] runs both tests on a fitted model.
//! - [`ks_test`] and [`cvm_test`] accept raw CDF values for callers that
//!   build their own.
//! - [`validate_cdf_values`] is the shared input guard.
//!
//! Conventions
//! -----------
//! - Samples smaller than two are a `DegenerateDataError`; malformed CDF
//!   values are a `DomainError`.
pub mod statistics;
pub mod validation;

pub use self::statistics::{GoodnessOfFit, TestOutcome, cvm_test, goodness_of_fit, ks_test};
pub use self::validation::validate_cdf_values;
