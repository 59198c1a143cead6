//! fitting::fitted — immutable snapshot of a maximum-likelihood fit.
//!
//! Purpose
//! -------
//! Hold everything downstream consumers need after a fit: parameter
//! estimates on both scales, their covariance, information criteria, the
//! average detection probability with its delta-method SE, the optimizer
//! report, and the retained data that goodness of fit re-uses.
//!
//! Key behaviors
//! -------------
//! - `P̂a` uses the Horvitz–Thompson form `n / Σᵢ 1/pᵢ`. Without covariates
//!   every `pᵢ` is the same and this reduces to `μ/w` (line) or
//!   `2∫t g/w²` (point).
//! - [`FittedModel::evaluate`] averages the per-observation curves over the
//!   retained sample; [`FittedModel::evaluate_with`] evaluates the curve for
//!   one covariate tuple.
//! - Natural-scale accessors report the baseline curve (all covariate
//!   columns zero).
//!
//! Conventions
//! -----------
//! - `loglik` is the total log-likelihood `ℓ = n ℓ̄`.
//! - Standard errors and covariance are in the unconstrained θ space.
use crate::detection::{
    covariates::{CovariateDesign, Covariates},
    curve::DetectionCurve,
    layout::ParamLayout,
    params::DetectionParams,
    spec::{ModelSpec, TransectType},
};
use crate::errors::{DomainError, DsResult};
use crate::fitting::likelihood::{CovariateGroup, FitData};
use crate::inference::{delta_method_se, standard_errors};
use crate::optimization::loglik_optimizer::{FnEvalMap, OptimOutcome, Theta};
use ndarray::{Array1, Array2};

/// How the optimizer finished.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerReport {
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
}

impl OptimizerReport {
    /// Report for a model with no free parameters.
    pub fn closed_form() -> Self {
        Self {
            converged: true,
            status: "No free parameters".to_string(),
            iterations: 0,
            fn_evals: FnEvalMap::new(),
        }
    }
}

impl From<OptimOutcome> for OptimizerReport {
    fn from(outcome: OptimOutcome) -> Self {
        Self {
            converged: outcome.converged,
            status: outcome.status,
            iterations: outcome.iterations,
            fn_evals: outcome.fn_evals,
        }
    }
}

/// Result of [`fit`](crate::fitting::fit).
#[derive(Debug, Clone, PartialEq)]
pub struct FittedModel {
    spec: ModelSpec,
    label: String,
    transect: TransectType,
    truncation: f64,
    layout: ParamLayout,
    design: CovariateDesign,
    groups: Vec<CovariateGroup>,
    distances: Vec<f64>,
    covariates: Vec<Covariates>,
    params: DetectionParams,
    theta_hat: Theta,
    covariance: Array2<f64>,
    standard_errors: Array1<f64>,
    loglik: f64,
    detection_probability: f64,
    detection_probability_se: f64,
    report: OptimizerReport,
}

impl FittedModel {
    /// Assemble the snapshot and compute the derived quantities.
    ///
    /// # Errors
    /// - `DomainError` when θ̂ does not give a valid curve for some group.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        data: FitData, design: CovariateDesign, distances: Vec<f64>, covariates: Vec<Covariates>,
        theta_hat: Theta, loglik: f64, covariance: Array2<f64>, report: OptimizerReport,
    ) -> Result<Self, DomainError> {
        let FitData { spec, transect, truncation, layout, groups, n, .. } = data;
        let params = DetectionParams::from_theta(&layout, &theta_hat.to_vec())?;
        let detection_probability =
            horvitz_thompson_pa(&params, &spec, transect, truncation, &groups, n)?;
        let pa_of_theta = |t: &Theta| {
            DetectionParams::from_theta(&layout, &t.to_vec())
                .and_then(|p| horvitz_thompson_pa(&p, &spec, transect, truncation, &groups, n))
                .unwrap_or(f64::NAN)
        };
        let detection_probability_se = delta_method_se(&pa_of_theta, &theta_hat, &covariance);
        let standard_errors = standard_errors(&covariance);
        Ok(Self {
            label: spec.label(),
            spec,
            transect,
            truncation,
            layout,
            design,
            groups,
            distances,
            covariates,
            params,
            theta_hat,
            covariance,
            standard_errors,
            loglik,
            detection_probability,
            detection_probability_se,
            report,
        })
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    /// Compact model label, e.g. `hn+cos(2,3)`.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transect(&self) -> TransectType {
        self.transect
    }

    pub fn truncation(&self) -> f64 {
        self.truncation
    }

    /// Retained sample size.
    pub fn n(&self) -> usize {
        self.distances.len()
    }

    /// Number of free parameters.
    pub fn k(&self) -> usize {
        self.layout.len()
    }

    pub fn theta_hat(&self) -> &Theta {
        &self.theta_hat
    }

    pub fn parameter_names(&self) -> &[String] {
        self.layout.names()
    }

    pub fn standard_errors(&self) -> &Array1<f64> {
        &self.standard_errors
    }

    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    pub fn loglik(&self) -> f64 {
        self.loglik
    }

    /// `−2ℓ + 2k`.
    pub fn aic(&self) -> f64 {
        -2.0 * self.loglik + 2.0 * self.k() as f64
    }

    /// Small-sample AIC; infinite when `n ≤ k + 1`.
    pub fn aicc(&self) -> f64 {
        let (n, k) = (self.n() as f64, self.k() as f64);
        if n - k - 1.0 <= 0.0 {
            return f64::INFINITY;
        }
        self.aic() + 2.0 * k * (k + 1.0) / (n - k - 1.0)
    }

    /// `−2ℓ + k ln n`.
    pub fn bic(&self) -> f64 {
        -2.0 * self.loglik + self.k() as f64 * (self.n() as f64).ln()
    }

    /// Average detection probability within the truncation.
    pub fn detection_probability(&self) -> f64 {
        self.detection_probability
    }

    pub fn detection_probability_se(&self) -> f64 {
        self.detection_probability_se
    }

    /// Coefficient of variation of `P̂a`.
    pub fn cv(&self) -> f64 {
        self.detection_probability_se / self.detection_probability
    }

    /// Effective strip half-width `w P̂a` (line) or effective detection
    /// radius `w √P̂a` (point).
    pub fn effective_width(&self) -> f64 {
        match self.transect {
            TransectType::Line => self.truncation * self.detection_probability,
            TransectType::Point => self.truncation * self.detection_probability.sqrt(),
        }
    }

    /// Baseline scales `σⱼ = exp(log σⱼ)`, one per component.
    pub fn scales(&self) -> Vec<f64> {
        self.params.log_scales.iter().map(|v| v.exp()).collect()
    }

    /// Baseline hazard-rate shape.
    pub fn shape(&self) -> Option<f64> {
        self.params.log_shape.map(f64::exp)
    }

    pub fn adjustment_coefficients(&self) -> &[f64] {
        &self.params.adjustment
    }

    pub fn mixture_weights(&self) -> Vec<f64> {
        self.params.weights()
    }

    pub fn report(&self) -> &OptimizerReport {
        &self.report
    }

    pub fn converged(&self) -> bool {
        self.report.converged
    }

    /// Retained distances, in input order.
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Covariates of the retained observations, aligned with
    /// [`FittedModel::distances`].
    pub fn covariates(&self) -> &[Covariates] {
        &self.covariates
    }

    /// Fitted curve for one covariate tuple.
    ///
    /// # Errors
    /// - Covariate errors (missing covariate, unknown factor level).
    pub fn curve_with(&self, covariates: &Covariates) -> DsResult<DetectionCurve> {
        let scale_row = self.design.scale_row(covariates, 0)?;
        let shape_row = self.design.shape_row(covariates, 0)?;
        Ok(self.params.curve(&self.spec, self.truncation, &scale_row, &shape_row)?)
    }

    /// `g(x)` for one covariate tuple.
    pub fn evaluate_with(&self, x: f64, covariates: &Covariates) -> DsResult<f64> {
        Ok(self.curve_with(covariates)?.evaluate(x)?)
    }

    /// `g(x)` averaged over the retained observations' curves.
    ///
    /// # Errors
    /// - `InvalidEvaluationPoint` for negative or non-finite `x`.
    pub fn evaluate(&self, x: f64) -> DsResult<f64> {
        if let [group] = self.groups.as_slice() {
            return Ok(self.group_curve(group)?.evaluate(x)?);
        }
        let mut total = 0.0;
        for group in &self.groups {
            total += group.distances.len() as f64 * self.group_curve(group)?.evaluate(x)?;
        }
        Ok(total / self.n() as f64)
    }

    /// Model CDF `F(xᵢ)` for each retained observation under its own
    /// covariate curve, aligned with [`FittedModel::distances`].
    pub fn cdf_values(&self) -> DsResult<Vec<f64>> {
        let mut values = vec![0.0; self.n()];
        for group in &self.groups {
            let curve = self.group_curve(group)?;
            for (&x, &member) in group.distances.iter().zip(&group.members) {
                values[member] = curve.cdf(x, self.transect);
            }
        }
        Ok(values)
    }

    fn group_curve(&self, group: &CovariateGroup) -> Result<DetectionCurve, DomainError> {
        group.curve(&self.params, &self.spec, self.truncation)
    }
}

/// `g(x)` of a fitted model; see [`FittedModel::evaluate`].
pub fn evaluate(model: &FittedModel, x: f64) -> DsResult<f64> {
    model.evaluate(x)
}

/// `(P̂a, SE)` of a fitted model.
pub fn average_detection_probability(model: &FittedModel) -> (f64, f64) {
    (model.detection_probability(), model.detection_probability_se())
}

/// `n / Σ_g n_g / p_g`.
fn horvitz_thompson_pa(
    params: &DetectionParams, spec: &ModelSpec, transect: TransectType, truncation: f64,
    groups: &[CovariateGroup], n: usize,
) -> Result<f64, DomainError> {
    let mut inverse_sum = 0.0;
    for group in groups {
        let p = group.curve(params, spec, truncation)?.detection_probability(transect);
        inverse_sum += group.distances.len() as f64 / p;
    }
    Ok(n as f64 / inverse_sum)
}

#[cfg(test)]
mod tests {
    use crate::data::ObservationSet;
    use crate::detection::spec::{ModelSpec, TransectType};
    use crate::fitting::{FitControl, average_detection_probability, evaluate, fit};
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Derived quantities on the parameter-free uniform model, where every
    //   value has a closed form.
    // - Natural-scale accessors on a half-normal fit.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The uniform model's snapshot matches its closed forms.
    //
    // Given
    // -----
    // - Five line distances, w = 100, uniform key.
    //
    // Expect
    // ------
    // - ℓ = -5 ln 100, AIC = -2ℓ, BIC = AIC, P̂a = 1 with SE 0,
    //   g ≡ 1, CDF(x) = x/w, converged without iterations.
    fn uniform_snapshot_matches_closed_forms() {
        // Arrange
        let data = ObservationSet::from_distances([10.0, 20.0, 30.0, 40.0, 50.0])
            .expect("valid distances");

        // Act
        let model = fit(&data, &ModelSpec::uniform(), TransectType::Line, Some(100.0), &FitControl::default())
            .expect("uniform fit should succeed");

        // Assert
        let loglik = -5.0 * 100.0_f64.ln();
        assert_relative_eq!(model.loglik(), loglik, max_relative = 1e-12);
        assert_relative_eq!(model.aic(), -2.0 * loglik, max_relative = 1e-12);
        assert_relative_eq!(model.bic(), model.aic(), max_relative = 1e-12);
        assert_eq!(model.k(), 0);
        assert_eq!(average_detection_probability(&model), (1.0, 0.0));
        assert_relative_eq!(model.effective_width(), 100.0);
        assert_eq!(evaluate(&model, 73.0).expect("valid distance"), 1.0);
        let cdf = model.cdf_values().expect("cdf values");
        assert_relative_eq!(cdf[2], 0.3, max_relative = 1e-12);
        assert!(model.converged());
        assert_eq!(model.report().iterations, 0);
        assert!(evaluate(&model, -1.0).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Natural-scale accessors and criteria on a one-parameter fit.
    //
    // Given
    // -----
    // - Half-normal fit to [1, 2, 3, 4, 5] with w = 1000.
    //
    // Expect
    // ------
    // - σ̂ ≈ √11, no shape, weights [1], AICc = AIC + 4/3,
    //   effective width w P̂a ≈ σ̂ √(π/2), positive finite SE.
    fn half_normal_accessors() {
        // Arrange
        let data = ObservationSet::from_distances([1.0, 2.0, 3.0, 4.0, 5.0]).expect("valid distances");

        // Act
        let model = fit(&data, &ModelSpec::half_normal(), TransectType::Line, Some(1000.0), &FitControl::default())
            .expect("half-normal fit should succeed");

        // Assert
        let sigma = model.scales()[0];
        assert_relative_eq!(sigma, 11.0_f64.sqrt(), max_relative = 1e-3);
        assert_eq!(model.shape(), None);
        assert_eq!(model.mixture_weights(), vec![1.0]);
        assert_relative_eq!(model.aicc(), model.aic() + 4.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(
            model.effective_width(),
            sigma * (std::f64::consts::PI / 2.0).sqrt(),
            max_relative = 1e-6
        );
        assert_eq!(model.parameter_names(), ["log_sigma".to_string()]);
        let se = model.standard_errors()[0];
        assert!(se.is_finite() && se > 0.0);
        assert!(model.cv() > 0.0);
    }
}
