//! utils — conversion helpers for the Python bindings.
//!
//! Turn loosely typed Python arguments (array-likes, short names, optional
//! knobs) into the validated Rust types the core modules expect. Every
//! failure surfaces as a `PyErr` through `From<DsError> for PyErr`.
use numpy::{IntoPyArray, PyArrayMethods, PyReadonlyArray1};
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};
use std::str::FromStr;

use crate::{
    data::ObservationSet,
    detection::{adjustment::AdjustmentKind, key::KeyKind, spec::ModelSpec, AdjustmentSpec},
    errors::DsError,
    fitting::FitControl,
    optimization::loglik_optimizer::OptimizerChoice,
};

/// Borrow a contiguous `float64` view of a NumPy array, pandas Series or
/// Python sequence, copying only when needed.
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64 distances",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Distances from Python as a validated [`ObservationSet`].
pub fn extract_observations<'py>(
    py: Python<'py>, distances: &Bound<'py, PyAny>,
) -> PyResult<ObservationSet> {
    let arr = extract_f64_array(py, distances)?;
    let slice = arr
        .as_slice()
        .map_err(|_| PyValueError::new_err("distances must be a 1-D contiguous float64 array"))?;
    Ok(ObservationSet::from_distances(slice.iter().copied())?)
}

/// Model specification from short names, e.g. `key="hn"`,
/// `adjustment="cos"`, `n_adjustments=2`.
pub fn build_model_spec(
    key: &str, adjustment: Option<&str>, n_adjustments: Option<usize>, mixture: Option<usize>,
) -> PyResult<ModelSpec> {
    let key = KeyKind::from_str(key).map_err(DsError::from)?;
    let mut spec = ModelSpec::new(key);
    match (adjustment, n_adjustments) {
        (Some(name), n) => {
            let kind = AdjustmentKind::from_str(name).map_err(DsError::from)?;
            spec = spec.with_adjustment(AdjustmentSpec::with_terms(kind, key, n.unwrap_or(1)));
        }
        (None, Some(_)) => {
            return Err(PyValueError::new_err("n_adjustments requires an adjustment series"));
        }
        (None, None) => {}
    }
    if let Some(components) = mixture {
        spec = spec.with_mixture(components);
    }
    spec.validate().map_err(DsError::from)?;
    Ok(spec)
}

/// Fit control from optional Python keyword arguments; unset values keep
/// their defaults.
pub fn build_fit_control(
    optimizer: Option<&str>, monotonicity: Option<bool>, grid_resolution: Option<usize>,
    max_iterations: Option<usize>, tolerance: Option<f64>, starting_values: Option<Vec<f64>>,
) -> PyResult<FitControl> {
    let mut control = FitControl::default();
    if let Some(name) = optimizer {
        control = control.with_optimizer(OptimizerChoice::from_str(name).map_err(DsError::from)?);
    }
    if let Some(enabled) = monotonicity {
        control = control.with_monotonicity(enabled);
    }
    if let Some(points) = grid_resolution {
        control = control.with_grid_resolution(points);
    }
    if let Some(budget) = max_iterations {
        control = control.with_max_iterations(budget);
    }
    if let Some(tol) = tolerance {
        control = control.with_tolerance(tol);
    }
    if let Some(theta0) = starting_values {
        control = control.with_starting_values(theta0);
    }
    control.validate().map_err(DsError::from)?;
    Ok(control)
}
