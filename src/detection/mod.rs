//! detection — the detection-function model library.
//!
//! Purpose
//! -------
//! Describe and evaluate parametric detection functions `g(x; θ)`, the
//! probability of detecting an object at distance `x` from the observer,
//! on a truncated interval `[0, w]`.
//!
//! Key behaviors
//! -------------
//! - [`key`]: half-normal, hazard-rate and uniform key functions.
//! - [`adjustment`]: cosine, Hermite and polynomial series adjustments.
//! - [`mixture`]: 2–5 component mixtures of a key.
//! - [`covariates`]: log-linear covariate links on scale and shape.
//! - [`spec`]: [`ModelSpec`] and [`TransectType`].
//! - [`layout`] and [`params`]: the unconstrained parameter vector θ.
//! - [`curve`]: a fully parameterized [`DetectionCurve`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `g(0) = 1` exactly for every model this module can build.
//! - Every public constructor validates its inputs; evaluation is pure and
//!   bit-reproducible.
pub mod adjustment;
pub mod covariates;
pub mod curve;
pub mod key;
pub mod layout;
pub mod mixture;
pub mod params;
pub mod spec;

pub use self::adjustment::{AdjustmentKind, AdjustmentSpec};
pub use self::covariates::{CovariateDesign, CovariateFormula, CovariateValue, Covariates};
pub use self::curve::DetectionCurve;
pub use self::key::KeyKind;
pub use self::layout::ParamLayout;
pub use self::mixture::MixtureSpec;
pub use self::params::DetectionParams;
pub use self::spec::{ModelSpec, TransectType};
