//! rust_distance — detection-function estimation for distance sampling.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes detection-function fitting to Python through the `_rust_distance`
//! extension module. When the `python-bindings` feature is enabled, this
//! module defines the Python-facing classes and submodules used by the
//! `rust_distance` package.
//!
//! Key behaviors
//! -------------
//! - Fit half-normal, hazard-rate and uniform keys by maximum likelihood,
//!   optionally with series adjustments, mixtures or scale covariates
//!   ([`fitting`]).
//! - Rank competing fits by AIC ([`selection`]) and check absolute fit with
//!   Kolmogorov–Smirnov and Cramér–von Mises statistics
//!   ([`goodness_of_fit`]).
//! - Simulate detection distances from a curve ([`simulation`]) and load
//!   reproducible fit descriptions from TOML ([`config`]).
//!
//! Invariants & assumptions
//! ------------------------
//! - Distances are non-negative and finite; observations beyond the
//!   truncation distance are excluded before any likelihood work.
//! - All heavy numerical work lives in the inner modules; the Python glue
//!   performs only conversion, validation and error mapping.
//!
//! Conventions
//! -----------
//! - Errors are propagated as [`DsError`] and converted to `PyErr` at the
//!   PyO3 boundary.
//! - Python-exposed classes live under `rust_distance.<submodule>` and are
//!   wrapped by thin pure-Python facades in the top-level package.
//!
//! Testing notes
//! -------------
//! - Unit tests sit next to each module; `tests/` exercises the full
//!   simulate, fit, select and check pipeline.

pub mod config;
pub mod data;
pub mod detection;
pub mod errors;
pub mod fitting;
pub mod goodness_of_fit;
pub mod inference;
pub mod numerics;
pub mod optimization;
pub mod selection;
pub mod simulation;
#[cfg(feature = "python-bindings")]
pub mod utils;

pub use crate::config::FitConfig;
pub use crate::data::{Observation, ObservationSet};
pub use crate::detection::{DetectionCurve, ModelSpec, TransectType};
pub use crate::errors::{DsError, DsResult};
pub use crate::fitting::{FitControl, FittedModel, average_detection_probability, evaluate, fit};
pub use crate::goodness_of_fit::{GoodnessOfFit, goodness_of_fit};
pub use crate::selection::{RankedModel, TieBreakPolicy, compare, compare_with_policy};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::utils::{build_fit_control, build_model_spec, extract_observations};

/// DetectionFunction — Python-facing wrapper for a fitted detection function.
///
/// Purpose
/// -------
/// Fit a detection function from Python arguments and expose the estimates,
/// information criteria and detection probability of the resulting
/// [`FittedModel`].
///
/// Parameters
/// ----------
/// Constructed from Python via `DetectionFunction(distances, key="hn", ...)`:
/// - `distances`: array-like of non-negative `float64` distances.
/// - `key`: `"hn"`, `"hr"` or `"unif"` (long names accepted).
/// - `adjustment`, `n_adjustments`: optional series name (`"cos"`,
///   `"herm"`, `"poly"`) and number of terms.
/// - `mixture`: optional number of key components.
/// - `transect`: `"line"` or `"point"`.
/// - `truncation`: right truncation; defaults to the largest distance.
/// - `optimizer`, `monotonicity`, `grid_resolution`, `max_iterations`,
///   `tolerance`, `starting_values`: fit control overrides.
///
/// Invariants
/// ----------
/// - `inner` is always a converged fit; failures raise at construction.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_distance.detection_functions", frozen)]
pub struct DetectionFunction {
    pub inner: FittedModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl DetectionFunction {
    #[new]
    #[pyo3(
        signature = (
            distances,
            key = "hn",
            adjustment = None,
            n_adjustments = None,
            mixture = None,
            transect = "line",
            truncation = None,
            optimizer = None,
            monotonicity = None,
            grid_resolution = None,
            max_iterations = None,
            tolerance = None,
            starting_values = None,
        ),
        text_signature = "(distances, /, key='hn', adjustment=None, n_adjustments=None, \
                          mixture=None, transect='line', truncation=None, optimizer=None, \
                          monotonicity=None, grid_resolution=None, max_iterations=None, \
                          tolerance=None, starting_values=None)"
    )]
    #[allow(clippy::too_many_arguments)]
    pub fn fit<'py>(
        py: Python<'py>, distances: &Bound<'py, PyAny>, key: &str, adjustment: Option<&str>,
        n_adjustments: Option<usize>, mixture: Option<usize>, transect: &str,
        truncation: Option<f64>, optimizer: Option<&str>, monotonicity: Option<bool>,
        grid_resolution: Option<usize>, max_iterations: Option<usize>, tolerance: Option<f64>,
        starting_values: Option<Vec<f64>>,
    ) -> PyResult<Self> {
        let data = extract_observations(py, distances)?;
        let spec = build_model_spec(key, adjustment, n_adjustments, mixture)?;
        let control = build_fit_control(
            optimizer,
            monotonicity,
            grid_resolution,
            max_iterations,
            tolerance,
            starting_values,
        )?;
        let transect: TransectType = transect.parse().map_err(DsError::from)?;
        let inner = py.allow_threads(|| fit(&data, &spec, transect, truncation, &control))?;
        Ok(DetectionFunction { inner })
    }

    /// Detection probability `g(x)`, averaged over covariate groups when the
    /// model has covariates.
    pub fn evaluate(&self, x: f64) -> PyResult<f64> {
        Ok(self.inner.evaluate(x)?)
    }

    pub fn goodness_of_fit(&self) -> PyResult<GoodnessOfFitResult> {
        Ok(GoodnessOfFitResult { inner: goodness_of_fit(&self.inner)? })
    }

    #[getter]
    pub fn label(&self) -> String {
        self.inner.label().to_string()
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n()
    }

    #[getter]
    pub fn truncation(&self) -> f64 {
        self.inner.truncation()
    }

    #[getter]
    pub fn loglik(&self) -> f64 {
        self.inner.loglik()
    }

    #[getter]
    pub fn aic(&self) -> f64 {
        self.inner.aic()
    }

    #[getter]
    pub fn aicc(&self) -> f64 {
        self.inner.aicc()
    }

    #[getter]
    pub fn bic(&self) -> f64 {
        self.inner.bic()
    }

    #[getter]
    pub fn detection_probability(&self) -> f64 {
        self.inner.detection_probability()
    }

    #[getter]
    pub fn detection_probability_se(&self) -> f64 {
        self.inner.detection_probability_se()
    }

    #[getter]
    pub fn effective_width(&self) -> f64 {
        self.inner.effective_width()
    }

    #[getter]
    pub fn scales(&self) -> Vec<f64> {
        self.inner.scales()
    }

    #[getter]
    pub fn shape(&self) -> Option<f64> {
        self.inner.shape()
    }

    #[getter]
    pub fn parameter_names(&self) -> Vec<String> {
        self.inner.parameter_names().to_vec()
    }

    #[getter]
    pub fn theta_hat(&self) -> Vec<f64> {
        self.inner.theta_hat().to_vec()
    }

    #[getter]
    pub fn standard_errors(&self) -> Vec<f64> {
        self.inner.standard_errors().to_vec()
    }

    #[getter]
    pub fn covariance(&self) -> Vec<Vec<f64>> {
        self.inner.covariance().rows().into_iter().map(|row| row.to_vec()).collect()
    }

    #[getter]
    pub fn converged(&self) -> bool {
        self.inner.converged()
    }

    #[getter]
    pub fn status(&self) -> String {
        self.inner.report().status.clone()
    }

    #[getter]
    pub fn iterations(&self) -> usize {
        self.inner.report().iterations
    }
}

/// GoodnessOfFitResult — KS and CvM outcome for a fitted detection function.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_distance.goodness_of_fit", frozen)]
pub struct GoodnessOfFitResult {
    pub inner: GoodnessOfFit,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl GoodnessOfFitResult {
    #[getter]
    pub fn ks_statistic(&self) -> f64 {
        self.inner.ks_statistic
    }

    #[getter]
    pub fn ks_p_value(&self) -> f64 {
        self.inner.ks_p_value
    }

    #[getter]
    pub fn cvm_statistic(&self) -> f64 {
        self.inner.cvm_statistic
    }

    #[getter]
    pub fn cvm_p_value(&self) -> f64 {
        self.inner.cvm_p_value
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n
    }

    /// `(i/n, model CDF)` pairs for a P–P plot.
    #[getter]
    pub fn pairs(&self) -> Vec<(f64, f64)> {
        self.inner.pairs.clone()
    }
}

/// Rank fitted detection functions by AIC.
///
/// Returns `(index, label, n_params, aic, delta_aic, weight, not_justified)`
/// rows, best first. `threshold=None` uses the default ΔAIC threshold;
/// a negative threshold disables the not-justified flag.
#[cfg(feature = "python-bindings")]
#[pyfunction]
#[pyo3(signature = (models, threshold = None), text_signature = "(models, /, threshold=None)")]
pub fn compare_models<'py>(
    models: Vec<PyRef<'py, DetectionFunction>>, threshold: Option<f64>,
) -> PyResult<Vec<(usize, String, usize, f64, f64, f64, bool)>> {
    let policy = match threshold {
        None => TieBreakPolicy::default(),
        Some(t) if t.is_nan() => return Err(PyValueError::new_err("threshold must not be NaN")),
        Some(t) if t < 0.0 => TieBreakPolicy::Off,
        Some(t) => TieBreakPolicy::FlagNotJustified { threshold: t },
    };
    let fits: Vec<&FittedModel> = models.iter().map(|m| &m.inner).collect();
    let ranked = compare_with_policy(&fits, policy)?;
    Ok(ranked
        .into_iter()
        .map(|r| (r.index, r.label, r.n_params, r.aic, r.delta_aic, r.weight, r.not_justified))
        .collect())
}

/// _rust_distance — PyO3 module initializer for the Python extension.
///
/// Creates the `detection_functions` and `goodness_of_fit` submodules,
/// attaches them to `_rust_distance` and registers them in `sys.modules` so
/// dotted imports resolve.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_distance<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let detection_functions_mod = PyModule::new(_py, "detection_functions")?;
    let goodness_of_fit_mod = PyModule::new(_py, "goodness_of_fit")?;
    detection_functions(_py, m, &detection_functions_mod)?;
    goodness_of_fit_module(_py, m, &goodness_of_fit_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_distance.detection_functions", detection_functions_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_distance.goodness_of_fit", goodness_of_fit_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn detection_functions<'py>(
    _py: Python, rust_distance: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<DetectionFunction>()?;
    m.add_function(wrap_pyfunction!(compare_models, m)?)?;
    rust_distance.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn goodness_of_fit_module<'py>(
    _py: Python, rust_distance: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<GoodnessOfFitResult>()?;
    rust_distance.add_submodule(m)?;
    Ok(())
}
