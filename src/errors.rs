//! errors — crate-wide error taxonomy for detection-function estimation.
//!
//! Purpose
//! -------
//! Provide one error surface, [`DsError`], that every public entry point
//! returns. The four families mirror the ways a distance-sampling analysis
//! can fail: a malformed request, data that cannot support the request,
//! an optimizer that did not settle, and models that cannot be ranked
//! against each other.
//!
//! Key behaviors
//! -------------
//! - [`DomainError`]: invalid model specifications, distances, covariates,
//!   parameter vectors, and fit-control settings.
//! - [`DegenerateDataError`]: empty or undersized samples after truncation.
//! - [`ConvergenceError`]: optimizer non-convergence and runtime failures.
//! - [`IncomparableModelsError`]: AIC comparisons across differently
//!   truncated (or otherwise mismatched) fits.
//! - `From<OptError>` routes optimizer configuration problems to
//!   [`DomainError`] and runtime failures to [`ConvergenceError`].
//!
//! Conventions
//! -----------
//! - Variants carry the offending value(s) so messages are actionable.
//! - Static reasons are `&'static str`; dynamic context is owned `String`.
use crate::optimization::errors::OptError;

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyRuntimeError, PyValueError},
};

/// Crate-wide result alias.
pub type DsResult<T> = Result<T, DsError>;

/// Top-level error returned by fitting, evaluation, selection and
/// goodness-of-fit routines.
#[derive(Debug, Clone, PartialEq)]
pub enum DsError {
    Domain(DomainError),
    DegenerateData(DegenerateDataError),
    Convergence(ConvergenceError),
    IncomparableModels(IncomparableModelsError),
}

impl std::error::Error for DsError {}

impl std::fmt::Display for DsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DsError::Domain(e) => write!(f, "Domain error: {e}"),
            DsError::DegenerateData(e) => write!(f, "Degenerate data: {e}"),
            DsError::Convergence(e) => write!(f, "Convergence error: {e}"),
            DsError::IncomparableModels(e) => write!(f, "Incomparable models: {e}"),
        }
    }
}

impl From<DomainError> for DsError {
    fn from(err: DomainError) -> Self {
        DsError::Domain(err)
    }
}

impl From<DegenerateDataError> for DsError {
    fn from(err: DegenerateDataError) -> Self {
        DsError::DegenerateData(err)
    }
}

impl From<ConvergenceError> for DsError {
    fn from(err: ConvergenceError) -> Self {
        DsError::Convergence(err)
    }
}

impl From<IncomparableModelsError> for DsError {
    fn from(err: IncomparableModelsError) -> Self {
        DsError::IncomparableModels(err)
    }
}

impl From<OptError> for DsError {
    fn from(err: OptError) -> Self {
        match err {
            OptError::InvalidTolGrad { .. }
            | OptError::InvalidTolCost { .. }
            | OptError::InvalidMaxIter { .. }
            | OptError::NoTolerancesProvided
            | OptError::InvalidOptimizer { .. }
            | OptError::InvalidLBFGSMem { .. }
            | OptError::InvalidSimplexStep { .. }
            | OptError::ThetaLengthMismatch { .. }
            | OptError::InvalidThetaInput { .. } => DsError::Domain(DomainError::OptimizerConfig(err)),
            other => DsError::Convergence(ConvergenceError::Optimizer(other)),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<DsError> for PyErr {
    fn from(err: DsError) -> PyErr {
        match err {
            DsError::Convergence(_) => PyRuntimeError::new_err(err.to_string()),
            _ => PyValueError::new_err(err.to_string()),
        }
    }
}

/// Invalid inputs: specifications, distances, covariates, parameters and
/// control settings.
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    // ---- Distances ----
    /// Observed distance below zero.
    NegativeDistance { index: usize, value: f64 },
    /// Observed distance is NaN or infinite.
    NonFiniteDistance { index: usize, value: f64 },
    /// Curve evaluated at a negative or non-finite distance.
    InvalidEvaluationPoint { value: f64 },
    /// Radial distance of exactly zero contributes `ln 0` to a point-transect
    /// likelihood.
    ZeroPointDistance { index: usize },
    /// Truncation must be finite and strictly positive.
    InvalidTruncation { value: f64 },

    // ---- Key parameters ----
    /// Scale must be finite and strictly positive.
    InvalidScale { value: f64 },
    /// Shape must be finite and strictly positive.
    InvalidShape { value: f64 },
    /// Unrecognized key name.
    UnknownKey { name: String },

    // ---- Adjustments ----
    /// An adjustment series needs at least one order.
    EmptyAdjustmentOrders,
    /// The smallest order is not the minimum the key requires.
    AdjustmentOrderTooLow { order: usize, minimum: usize },
    /// Orders must start at the minimum and be contiguous and increasing.
    AdjustmentOrdersNotContiguous { orders: Vec<usize>, minimum: usize },
    /// Adjustment series is not defined for this key.
    AdjustmentKeyMismatch { adjustment: &'static str, key: &'static str },
    /// Adjustment factor at zero distance is not positive.
    InvalidAdjustmentNormalization { value: f64 },
    /// Coefficient count does not match the adjustment orders.
    AdjustmentLengthMismatch { expected: usize, actual: usize },
    /// Unrecognized adjustment name.
    UnknownAdjustment { name: String },

    // ---- Mixtures ----
    /// Mixtures and adjustment series are mutually exclusive.
    MixtureWithAdjustment,
    /// Component count outside the supported range.
    InvalidMixtureComponents { components: usize, reason: &'static str },
    /// Mixtures are only defined over half-normal or hazard-rate keys.
    MixtureKeyUnsupported { key: &'static str },
    /// Mixture weights must be non-negative, finite and sum to one.
    InvalidMixtureWeights { reason: &'static str },

    // ---- Covariates ----
    /// A covariate named in the formula is missing from an observation.
    MissingCovariate { name: String, index: usize },
    /// A covariate is numeric in one observation and a factor in another.
    CovariateKindMismatch { name: String },
    /// Numeric covariate value is NaN or infinite.
    NonFiniteCovariate { name: String, value: f64 },
    /// Factor level not seen in the fitting data.
    UnknownFactorLevel { name: String, level: String },
    /// The same covariate appears twice in one formula target.
    DuplicateCovariate { name: String },
    /// Covariates on a sub-parameter the key does not have.
    CovariateTargetUnsupported { target: &'static str, key: &'static str },

    // ---- Parameter vectors ----
    /// Parameter vector has the wrong length for the model layout.
    ParameterLength { expected: usize, actual: usize },
    /// Parameter vector contains NaN or infinite values.
    NonFiniteParameter { index: usize, value: f64 },

    // ---- Fit control ----
    /// Monotonicity grid needs at least two points.
    InvalidGridResolution { value: usize },
    /// Iteration budget must be positive.
    InvalidMaxIterations { value: usize },
    /// Tolerance must be finite and strictly positive.
    InvalidTolerance { value: f64 },
    /// Parameter scaling entries must be finite and strictly positive.
    InvalidParameterScaling { index: usize, value: f64 },
    /// Caller-supplied starting values do not give a valid likelihood.
    InfeasibleStartingValues { reason: &'static str },
    /// Optimizer configuration rejected by the optimization layer.
    OptimizerConfig(OptError),
    /// Configuration document could not be parsed.
    Config { text: String },

    // ---- Goodness of fit ----
    /// Model CDF values must be finite and lie in `[0, 1]`.
    InvalidCdfValue { index: usize, value: f64 },
}

impl std::error::Error for DomainError {}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Distances ----
            DomainError::NegativeDistance { index, value } => {
                write!(f, "Distance at index {index} is negative: {value}")
            }
            DomainError::NonFiniteDistance { index, value } => {
                write!(f, "Distance at index {index} is not finite: {value}")
            }
            DomainError::InvalidEvaluationPoint { value } => {
                write!(f, "Detection function evaluated at invalid distance {value}")
            }
            DomainError::ZeroPointDistance { index } => {
                write!(f, "Radial distance at index {index} is zero; point transects need r > 0")
            }
            DomainError::InvalidTruncation { value } => {
                write!(f, "Invalid truncation distance {value}: must be finite and > 0")
            }

            // ---- Key parameters ----
            DomainError::InvalidScale { value } => {
                write!(f, "Invalid scale parameter {value}: must be finite and > 0")
            }
            DomainError::InvalidShape { value } => {
                write!(f, "Invalid shape parameter {value}: must be finite and > 0")
            }
            DomainError::UnknownKey { name } => {
                write!(f, "Unknown key function '{name}': expected hn, hr or unif")
            }

            // ---- Adjustments ----
            DomainError::EmptyAdjustmentOrders => {
                write!(f, "Adjustment series needs at least one order")
            }
            DomainError::AdjustmentOrderTooLow { order, minimum } => {
                write!(f, "Adjustment order {order} is below the minimum order {minimum}")
            }
            DomainError::AdjustmentOrdersNotContiguous { orders, minimum } => {
                write!(
                    f,
                    "Adjustment orders {orders:?} must be increasing, contiguous and start at {minimum}"
                )
            }
            DomainError::AdjustmentKeyMismatch { adjustment, key } => {
                write!(f, "Adjustment '{adjustment}' cannot be combined with key '{key}'")
            }
            DomainError::InvalidAdjustmentNormalization { value } => {
                write!(f, "Adjustment factor at zero distance is {value}; it must be > 0")
            }
            DomainError::AdjustmentLengthMismatch { expected, actual } => {
                write!(f, "Adjustment coefficient count mismatch: expected {expected}, got {actual}")
            }
            DomainError::UnknownAdjustment { name } => {
                write!(f, "Unknown adjustment series '{name}': expected cos, herm or poly")
            }

            // ---- Mixtures ----
            DomainError::MixtureWithAdjustment => {
                write!(f, "Mixture models cannot carry adjustment terms")
            }
            DomainError::InvalidMixtureComponents { components, reason } => {
                write!(f, "Invalid mixture with {components} components: {reason}")
            }
            DomainError::MixtureKeyUnsupported { key } => {
                write!(f, "Mixtures are not defined for key '{key}'")
            }
            DomainError::InvalidMixtureWeights { reason } => {
                write!(f, "Invalid mixture weights: {reason}")
            }

            // ---- Covariates ----
            DomainError::MissingCovariate { name, index } => {
                write!(f, "Observation {index} has no value for covariate '{name}'")
            }
            DomainError::CovariateKindMismatch { name } => {
                write!(f, "Covariate '{name}' mixes numeric and factor values")
            }
            DomainError::NonFiniteCovariate { name, value } => {
                write!(f, "Covariate '{name}' has non-finite value {value}")
            }
            DomainError::UnknownFactorLevel { name, level } => {
                write!(f, "Covariate '{name}' has level '{level}' not present in the fitted data")
            }
            DomainError::DuplicateCovariate { name } => {
                write!(f, "Covariate '{name}' is listed more than once")
            }
            DomainError::CovariateTargetUnsupported { target, key } => {
                write!(f, "Key '{key}' has no {target} parameter to attach covariates to")
            }

            // ---- Parameter vectors ----
            DomainError::ParameterLength { expected, actual } => {
                write!(f, "Parameter vector length mismatch: expected {expected}, got {actual}")
            }
            DomainError::NonFiniteParameter { index, value } => {
                write!(f, "Parameter at index {index} is not finite: {value}")
            }

            // ---- Fit control ----
            DomainError::InvalidGridResolution { value } => {
                write!(f, "Invalid monotonicity grid resolution {value}: need at least 2 points")
            }
            DomainError::InvalidMaxIterations { value } => {
                write!(f, "Invalid iteration budget {value}: must be > 0")
            }
            DomainError::InvalidTolerance { value } => {
                write!(f, "Invalid tolerance {value}: must be finite and > 0")
            }
            DomainError::InvalidParameterScaling { index, value } => {
                write!(f, "Invalid parameter scaling at index {index}: {value}")
            }
            DomainError::InfeasibleStartingValues { reason } => {
                write!(f, "Starting values are infeasible: {reason}")
            }
            DomainError::OptimizerConfig(err) => {
                write!(f, "Optimizer configuration: {err}")
            }
            DomainError::Config { text } => {
                write!(f, "Invalid configuration: {text}")
            }

            // ---- Goodness of fit ----
            DomainError::InvalidCdfValue { index, value } => {
                write!(f, "CDF value at index {index} is {value}; must lie in [0, 1]")
            }
        }
    }
}

/// The data cannot support the requested analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum DegenerateDataError {
    /// No observations were supplied.
    NoObservations,
    /// Truncation discarded every observation.
    AllTruncated { truncation: f64, n_total: usize },
    /// Fewer retained observations than free parameters.
    TooFewObservations { n: usize, k: usize },
    /// Goodness-of-fit statistics need a minimum sample.
    TooFewForGof { n: usize, minimum: usize },
    /// Acceptance sampling hit its draw budget.
    SimulationExhausted { accepted: usize, requested: usize, draws: usize },
}

impl std::error::Error for DegenerateDataError {}

impl std::fmt::Display for DegenerateDataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DegenerateDataError::NoObservations => write!(f, "No observations supplied"),
            DegenerateDataError::AllTruncated { truncation, n_total } => {
                write!(f, "Truncation at {truncation} discards all {n_total} observations")
            }
            DegenerateDataError::TooFewObservations { n, k } => {
                write!(f, "{n} observations cannot identify {k} free parameters")
            }
            DegenerateDataError::TooFewForGof { n, minimum } => {
                write!(f, "Goodness of fit needs at least {minimum} observations, got {n}")
            }
            DegenerateDataError::SimulationExhausted { accepted, requested, draws } => {
                write!(
                    f,
                    "Simulation accepted {accepted} of {requested} distances within {draws} draws"
                )
            }
        }
    }
}

/// The optimizer did not produce a usable optimum.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvergenceError {
    /// Solver stopped without reporting convergence.
    NotConverged { status: String, iterations: usize },
    /// Solver failed at runtime.
    Optimizer(OptError),
    /// Best point found sits on the infeasibility penalty.
    PenalizedOptimum { loglik: f64 },
    /// The fitted curve gives a detection probability outside `(0, 1]`.
    DetectionProbabilityOutOfRange { value: f64 },
    /// Moving one coordinate of the optimum improves the log-likelihood.
    NotAtOptimum { parameter: usize, loglik: f64, improved: f64 },
}

impl std::error::Error for ConvergenceError {}

impl std::fmt::Display for ConvergenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConvergenceError::NotConverged { status, iterations } => {
                write!(f, "Optimizer did not converge after {iterations} iterations ({status})")
            }
            ConvergenceError::Optimizer(err) => write!(f, "Optimizer failure: {err}"),
            ConvergenceError::PenalizedOptimum { loglik } => {
                write!(f, "Optimizer ended on an infeasible point (log-likelihood {loglik})")
            }
            ConvergenceError::DetectionProbabilityOutOfRange { value } => {
                write!(f, "Fitted detection probability {value} lies outside (0, 1]")
            }
            ConvergenceError::NotAtOptimum { parameter, loglik, improved } => write!(
                f,
                "Optimizer stopped short of the optimum: moving parameter {parameter} raises the \
                 log-likelihood from {loglik} to {improved}"
            ),
        }
    }
}

/// AIC is only meaningful across fits of the same data.
#[derive(Debug, Clone, PartialEq)]
pub enum IncomparableModelsError {
    /// Truncation distances differ.
    TruncationMismatch { first: f64, second: f64 },
    /// One model is a line-transect fit and another a point-transect fit.
    TransectMismatch,
    /// Retained sample sizes differ.
    SampleSizeMismatch { first: usize, second: usize },
}

impl std::error::Error for IncomparableModelsError {}

impl std::fmt::Display for IncomparableModelsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IncomparableModelsError::TruncationMismatch { first, second } => {
                write!(f, "Models were fitted with different truncations ({first} vs {second})")
            }
            IncomparableModelsError::TransectMismatch => {
                write!(f, "Models were fitted to different transect types")
            }
            IncomparableModelsError::SampleSizeMismatch { first, second } => {
                write!(f, "Models were fitted to different sample sizes ({first} vs {second})")
            }
        }
    }
}
