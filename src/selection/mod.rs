//! selection — AIC model selection across candidate detection functions.
//!
//! - [`compare`] / [`compare_with_policy`] rank fits of the same data.
//! - [`TieBreakPolicy`] controls the advisory "not justified" flag.
//! - Only fits sharing truncation, transect type and retained sample size
//!   are comparable.
pub mod ranking;

pub use self::ranking::{RankedModel, TieBreakPolicy, compare, compare_with_policy};
