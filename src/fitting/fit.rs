//! fitting::fit — maximum-likelihood fit of one detection-function model.
//!
//! Purpose
//! -------
//! Drive a full fit: validate inputs, truncate, resolve covariates and the
//! parameter layout, pick starting values, optimize the average
//! log-likelihood, and compute the post-fit covariance.
//!
//! Key behaviors
//! -------------
//! - Observations with `x > w` are dropped; `w` defaults to the largest
//!   observed distance.
//! - Models with no free parameters skip the optimizer and are reported as
//!   converged.
//! - A solver that stops without meeting its own criterion is an error, not
//!   a warning attached to a result.
//! - A reported optimum is re-checked by single-coordinate steps of the
//!   simplex edge; an improving step restarts the optimizer from there, and
//!   one that survives every restart is an error.
//! - A fit whose detection probability leaves `(0, 1]` for any covariate
//!   group is an error.
//! - A covariance stencil that leaves the feasible region yields a NaN
//!   covariance and a `warn!`, never a failed fit.
use crate::data::ObservationSet;
use crate::detection::{
    covariates::{CovariateDesign, Covariates},
    layout::ParamLayout,
    params::DetectionParams,
    spec::{ModelSpec, TransectType},
};
use crate::errors::{ConvergenceError, DegenerateDataError, DomainError, DsResult};
use crate::fitting::{
    control::FitControl,
    fitted::{FittedModel, OptimizerReport},
    likelihood::{CovariateGroup, DistanceLikelihood, FitData, group_observations},
    monotonicity::MonotonicityCheck,
    start::default_start,
};
use crate::inference::calc_covariance;
use crate::optimization::{
    loglik_optimizer::{LogLikelihood, Theta, maximize},
    numerical_stability::{INFEASIBLE_LOGLIK, PROBABILITY_TOL},
};
use ndarray::{Array1, Array2};
use tracing::{debug, warn};

/// Fit `spec` to `data` by maximum likelihood.
///
/// Parameters
/// ----------
/// - `data`: `&ObservationSet`
///   Validated observations.
/// - `spec`: `&ModelSpec`
///   Key, optional adjustment series or mixture, covariate formula.
/// - `transect`: `TransectType`
///   Line (perpendicular distances) or point (radial distances).
/// - `truncation`: `Option<f64>`
///   Right truncation `w`; `None` uses the largest observed distance.
/// - `control`: `&FitControl`
///   Optimizer and constraint settings.
///
/// Errors
/// ------
/// - `DomainError` for an invalid spec, control, truncation, starting
///   values or parameter scaling, covariate problems, an infeasible start,
///   or a zero radial distance.
/// - `DegenerateDataError::AllTruncated` when nothing survives truncation.
/// - `DegenerateDataError::TooFewObservations` when `n < k`.
/// - `ConvergenceError` when the optimizer fails, does not converge, ends
///   on the infeasibility penalty or short of the optimum, or gives a
///   detection probability outside `(0, 1]`.
///
/// # Examples
/// ```rust
/// # use rust_distance::data::ObservationSet;
/// # use rust_distance::detection::{ModelSpec, TransectType};
/// # use rust_distance::fitting::{FitControl, fit};
/// let data = ObservationSet::from_distances([12.0, 45.0, 78.0, 130.0, 210.0]).unwrap();
/// let model = fit(&data, &ModelSpec::half_normal(), TransectType::Line, Some(200.0), &FitControl::default()).unwrap();
/// assert_eq!(model.n(), 4);
/// assert!(model.detection_probability() > 0.0 && model.detection_probability() < 1.0);
/// ```
pub fn fit(
    data: &ObservationSet, spec: &ModelSpec, transect: TransectType, truncation: Option<f64>,
    control: &FitControl,
) -> DsResult<FittedModel> {
    spec.validate()?;
    control.validate()?;

    let w = truncation.unwrap_or_else(|| data.max_distance());
    if !w.is_finite() || w <= 0.0 {
        return Err(DomainError::InvalidTruncation { value: w }.into());
    }
    let retained = data.within(w);
    if retained.is_empty() {
        return Err(DegenerateDataError::AllTruncated { truncation: w, n_total: data.len() }.into());
    }
    if transect == TransectType::Point {
        if let Some(index) = data.iter().position(|o| o.distance == 0.0) {
            return Err(DomainError::ZeroPointDistance { index }.into());
        }
    }
    let distances: Vec<f64> = retained.iter().map(|o| o.distance).collect();
    let covariates: Vec<Covariates> = retained.iter().map(|o| o.covariates.clone()).collect();

    let design = CovariateDesign::from_rows(&spec.covariates, &covariates)?;
    let layout = ParamLayout::new(spec, &design);
    let (n, k) = (distances.len(), layout.len());
    if n < k {
        return Err(DegenerateDataError::TooFewObservations { n, k }.into());
    }

    let groups = group_observations(&design, distances.iter().copied().zip(&covariates))?;
    let probes = probe_groups(&design, &control.monotonicity_probes)?;
    let scaling = match &control.parameter_scaling {
        Some(s) if s.len() != k => {
            return Err(DomainError::ParameterLength { expected: k, actual: s.len() }.into());
        }
        Some(s) => Array1::from(s.clone()),
        None => Array1::ones(k),
    };
    let theta0 = match &control.starting_values {
        Some(t) if t.len() != k => {
            return Err(DomainError::ParameterLength { expected: k, actual: t.len() }.into());
        }
        Some(t) => t.clone(),
        None => default_start(&layout, &distances, transect, w),
    };

    let label = spec.label();
    debug!(model = %label, n, truncation = w, k, "fitting detection function");

    let fit_data = FitData {
        spec: spec.clone(),
        transect,
        truncation: w,
        layout,
        groups,
        probes,
        n,
        scaling,
        monotonicity: MonotonicityCheck::new(spec, control.monotonicity, control.grid_resolution),
    };
    fit_data
        .average_loglik(&theta0, fit_data.monotonicity)
        .map_err(|reason| DomainError::InfeasibleStartingValues { reason })?;

    let (theta_hat, report) = if k == 0 {
        (Theta::zeros(0), OptimizerReport::closed_form())
    } else {
        let opts = control.mle_options()?;
        let mut phi = fit_data.scale(&Array1::from(theta0));
        let mut restarts = 0;
        let outcome = loop {
            let outcome = maximize(&DistanceLikelihood, phi, &fit_data, &opts)?;
            if !outcome.converged {
                warn!(
                    model = %label,
                    status = %outcome.status,
                    iterations = outcome.iterations,
                    "optimizer did not converge"
                );
                return Err(ConvergenceError::NotConverged {
                    status: outcome.status,
                    iterations: outcome.iterations,
                }
                .into());
            }
            let Some(step) = improving_step(&fit_data, &outcome.theta_hat, opts.simplex_step) else {
                break outcome;
            };
            if restarts == MAX_RESTARTS {
                warn!(model = %label, parameter = step.parameter, "optimizer stopped short of the optimum");
                return Err(ConvergenceError::NotAtOptimum {
                    parameter: step.parameter,
                    loglik: step.base * n as f64,
                    improved: step.value * n as f64,
                }
                .into());
            }
            debug!(model = %label, parameter = step.parameter, "restarting optimizer from an improving step");
            restarts += 1;
            phi = step.phi;
        };
        (fit_data.unscale(&outcome.theta_hat), OptimizerReport::from(outcome))
    };

    let average = fit_data
        .average_loglik(&theta_hat.to_vec(), fit_data.monotonicity)
        .map_err(|_| ConvergenceError::PenalizedOptimum { loglik: INFEASIBLE_LOGLIK * n as f64 })?;
    let loglik = average * n as f64;
    check_detection_probabilities(&fit_data, &theta_hat)?;
    let covariance = observed_covariance(&fit_data, &theta_hat, &label);

    let model =
        FittedModel::new(fit_data, design, distances, covariates, theta_hat, loglik, covariance, report)?;
    debug!(
        model = %label,
        loglik = model.loglik(),
        aic = model.aic(),
        iterations = model.report().iterations,
        "detection function fitted"
    );
    Ok(model)
}

/// Optimizer restarts allowed when a coordinate step beats the reported
/// optimum.
const MAX_RESTARTS: usize = 2;

/// Total log-likelihood gain a coordinate step needs before the optimum is
/// considered unfinished.
const OPTIMUM_TOL: f64 = 1e-3;

struct CoordinateStep {
    parameter: usize,
    phi: Theta,
    base: f64,
    value: f64,
}

/// Best of `φ̂ ± h eᵢ` when it raises `ℓ` by more than [`OPTIMUM_TOL`].
fn improving_step(data: &FitData, phi_hat: &Theta, step: f64) -> Option<CoordinateStep> {
    let value_at = |phi: &Theta| DistanceLikelihood.value(phi, data).unwrap_or(INFEASIBLE_LOGLIK);
    let base = value_at(phi_hat);
    let threshold = base + OPTIMUM_TOL / data.n as f64;
    let mut best: Option<CoordinateStep> = None;
    for parameter in 0..phi_hat.len() {
        for sign in [1.0, -1.0] {
            let mut phi = phi_hat.clone();
            phi[parameter] += sign * step;
            let value = value_at(&phi);
            if value > best.as_ref().map_or(threshold, |b| b.value) {
                best = Some(CoordinateStep { parameter, phi, base, value });
            }
        }
    }
    best
}

/// Every covariate group's detection probability must lie in `(0, 1]`.
fn check_detection_probabilities(data: &FitData, theta_hat: &Theta) -> DsResult<()> {
    let params = DetectionParams::from_theta(&data.layout, &theta_hat.to_vec())?;
    for group in &data.groups {
        let value = group.curve(&params, &data.spec, data.truncation)?.detection_probability(data.transect);
        if !(value > 0.0 && value <= 1.0 + PROBABILITY_TOL) {
            return Err(ConvergenceError::DetectionProbabilityOutOfRange { value }.into());
        }
    }
    Ok(())
}

fn probe_groups(design: &CovariateDesign, probes: &[Covariates]) -> Result<Vec<CovariateGroup>, DomainError> {
    probes
        .iter()
        .enumerate()
        .map(|(index, probe)| {
            Ok(CovariateGroup {
                scale_row: design.scale_row(probe, index)?,
                shape_row: design.shape_row(probe, index)?,
                distances: Vec::new(),
                members: Vec::new(),
            })
        })
        .collect()
}

/// `J̄⁺/n` at θ̂ with the shape constraint lifted; NaN on failure.
fn observed_covariance(data: &FitData, theta_hat: &Theta, label: &str) -> Array2<f64> {
    let k = theta_hat.len();
    if k == 0 {
        return Array2::zeros((0, 0));
    }
    let neg_loglik = |t: &Theta| {
        data.average_loglik(&t.to_vec(), MonotonicityCheck::disabled()).map_or(f64::NAN, |v| -v)
    };
    match calc_covariance(&neg_loglik, theta_hat, data.n) {
        Ok(covariance) => covariance,
        Err(err) => {
            warn!(model = %label, error = %err, "covariance unavailable; standard errors are NaN");
            Array2::from_elem((k, k), f64::NAN)
        }
    }
}
