//! fitting::likelihood — truncated distance-sampling likelihood.
//!
//! Purpose
//! -------
//! Evaluate the average log-likelihood of retained distances under a
//! detection-function model, and wire it to the optimizer through the
//! [`LogLikelihood`] trait.
//!
//! Key behaviors
//! -------------
//! - Line transects: `f(x) = g(x) / ∫₀ʷ g`.
//! - Point transects: `f(r) = r g(r) / ∫₀ʷ t g(t) dt`.
//! - Observations sharing a covariate tuple form one [`CovariateGroup`]; each
//!   group builds one curve and one normalizing integral per evaluation.
//! - An infeasible θ (invalid curve, shape violation, non-positive integral
//!   or density) yields [`INFEASIBLE_LOGLIK`] to the optimizer, never an
//!   error.
//!
//! Invariants & assumptions
//! ------------------------
//! - Distances in the groups are already truncated to `[0, w]`; for point
//!   transects they are strictly positive.
//! - The optimizer works in `φ = θ / s`; [`FitData::scaling`] holds `s`.
use crate::detection::{
    covariates::{CovariateDesign, Covariates},
    curve::DetectionCurve,
    layout::ParamLayout,
    params::DetectionParams,
    spec::{ModelSpec, TransectType},
};
use crate::errors::DomainError;
use crate::fitting::monotonicity::MonotonicityCheck;
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{Cost, LogLikelihood, Theta, validation::validate_theta_input},
    numerical_stability::INFEASIBLE_LOGLIK,
};
use std::collections::BTreeMap;

/// Observations that share one covariate tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct CovariateGroup {
    pub scale_row: Vec<f64>,
    pub shape_row: Vec<f64>,
    /// Retained distances in this group.
    pub distances: Vec<f64>,
    /// Positions of those distances in the retained sample.
    pub members: Vec<usize>,
}

impl CovariateGroup {
    pub fn curve(
        &self, params: &DetectionParams, spec: &ModelSpec, truncation: f64,
    ) -> Result<DetectionCurve, DomainError> {
        params.curve(spec, truncation, &self.scale_row, &self.shape_row)
    }
}

/// Group retained observations by their encoded covariate rows.
///
/// Groups come out in a deterministic order (by the bit patterns of the
/// rows), so repeated fits evaluate in the same order.
///
/// # Errors
/// - Covariate encoding errors from [`CovariateDesign`].
pub fn group_observations<'a, I>(
    design: &CovariateDesign, observations: I,
) -> Result<Vec<CovariateGroup>, DomainError>
where
    I: IntoIterator<Item = (f64, &'a Covariates)>,
{
    let mut groups: BTreeMap<Vec<u64>, CovariateGroup> = BTreeMap::new();
    for (index, (distance, covariates)) in observations.into_iter().enumerate() {
        let scale_row = design.scale_row(covariates, index)?;
        let shape_row = design.shape_row(covariates, index)?;
        let key: Vec<u64> = scale_row.iter().chain(&shape_row).map(|v| v.to_bits()).collect();
        let group = groups.entry(key).or_insert_with(|| CovariateGroup {
            scale_row,
            shape_row,
            distances: Vec::new(),
            members: Vec::new(),
        });
        group.distances.push(distance);
        group.members.push(index);
    }
    Ok(groups.into_values().collect())
}

/// Everything the likelihood needs besides θ.
#[derive(Debug, Clone, PartialEq)]
pub struct FitData {
    pub spec: ModelSpec,
    pub transect: TransectType,
    pub truncation: f64,
    pub layout: ParamLayout,
    pub groups: Vec<CovariateGroup>,
    /// Design rows of monotonicity probe tuples.
    pub probes: Vec<CovariateGroup>,
    pub n: usize,
    pub scaling: Theta,
    pub monotonicity: MonotonicityCheck,
}

impl FitData {
    /// Average log-likelihood `ℓ̄(θ)`, or the reason θ is infeasible.
    ///
    /// `monotonicity` overrides the stored check so covariance stencils can
    /// run without the shape constraint.
    pub fn average_loglik(
        &self, theta: &[f64], monotonicity: MonotonicityCheck,
    ) -> Result<f64, &'static str> {
        let params = DetectionParams::from_theta(&self.layout, theta)
            .map_err(|_| "parameter vector is malformed")?;
        let mut total = 0.0;
        for group in &self.groups {
            let curve = group
                .curve(&params, &self.spec, self.truncation)
                .map_err(|_| "detection function parameters are invalid")?;
            if !monotonicity.accepts(&curve) {
                return Err("detection function violates its shape constraints");
            }
            total += group_loglik(&curve, group, self.transect, self.truncation)?;
        }
        if monotonicity.is_active() {
            for probe in &self.probes {
                let curve = probe
                    .curve(&params, &self.spec, self.truncation)
                    .map_err(|_| "detection function parameters are invalid")?;
                if !monotonicity.accepts(&curve) {
                    return Err("detection function violates its shape constraints");
                }
            }
        }
        Ok(total / self.n as f64)
    }

    /// θ from the optimizer's scaled coordinates.
    pub fn unscale(&self, phi: &Theta) -> Theta {
        phi * &self.scaling
    }

    /// Optimizer coordinates from θ.
    pub fn scale(&self, theta: &Theta) -> Theta {
        theta / &self.scaling
    }
}

/// `Σᵢ log f(xᵢ)` over one group.
fn group_loglik(
    curve: &DetectionCurve, group: &CovariateGroup, transect: TransectType, truncation: f64,
) -> Result<f64, &'static str> {
    let mu = curve.integral(truncation, transect);
    if !mu.is_finite() || mu <= 0.0 {
        return Err("normalizing integral is not positive");
    }
    let ln_mu = mu.ln();
    let mut total = 0.0;
    for &x in &group.distances {
        let g = curve.raw(x);
        if !g.is_finite() || g <= 0.0 {
            return Err("density is not positive at an observed distance");
        }
        total += g.ln() - ln_mu;
        if transect == TransectType::Point {
            total += x.ln();
        }
    }
    Ok(total)
}

/// The distance-sampling likelihood as seen by the optimizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistanceLikelihood;

impl LogLikelihood for DistanceLikelihood {
    type Data = FitData;

    /// `ℓ̄(φ · s)`, or [`INFEASIBLE_LOGLIK`] off the feasible region.
    fn value(&self, phi: &Theta, data: &FitData) -> OptResult<Cost> {
        let theta = data.unscale(phi);
        let slice = theta.as_slice().unwrap_or(&[]);
        Ok(data.average_loglik(slice, data.monotonicity).unwrap_or(INFEASIBLE_LOGLIK))
    }

    fn check(&self, phi: &Theta, data: &FitData) -> OptResult<()> {
        validate_theta_input(phi, data.layout.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::covariates::{CovariateFormula, CovariateValue};
    use crate::detection::key::half_normal_line_integral;
    use approx::assert_relative_eq;
    use ndarray::{Array1, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Covariate grouping.
    // - The line-transect half-normal likelihood against its closed form.
    // - Infeasible points mapping to the penalty.
    // -------------------------------------------------------------------------

    fn half_normal_data(distances: Vec<f64>, truncation: f64) -> FitData {
        let spec = ModelSpec::half_normal();
        let design = CovariateDesign::default();
        let layout = ParamLayout::new(&spec, &design);
        let n = distances.len();
        let members = (0..n).collect();
        FitData {
            monotonicity: MonotonicityCheck::new(&spec, true, 20),
            spec,
            transect: TransectType::Line,
            truncation,
            layout,
            groups: vec![CovariateGroup { scale_row: vec![], shape_row: vec![], distances, members }],
            probes: vec![],
            n,
            scaling: Array1::ones(1),
        }
    }

    #[test]
    // Purpose
    // -------
    // Observations with equal covariate rows share a group.
    //
    // Given
    // -----
    // - Four observations with sizes 1, 2, 1, 3.
    //
    // Expect
    // ------
    // - Three groups; the size-1 group holds members 0 and 2.
    fn observations_group_by_covariate_row() {
        // Arrange
        let rows: Vec<Covariates> = [1.0, 2.0, 1.0, 3.0]
            .iter()
            .map(|s| [("size".to_string(), CovariateValue::Numeric(*s))].into_iter().collect())
            .collect();
        let design = CovariateDesign::from_rows(&CovariateFormula::scale(["size"]), &rows)
            .expect("design should build");
        let distances = [5.0, 6.0, 7.0, 8.0];

        // Act
        let groups = group_observations(&design, distances.iter().copied().zip(&rows))
            .expect("grouping should succeed");

        // Assert
        assert_eq!(groups.len(), 3);
        let size_one = groups.iter().find(|g| g.scale_row == vec![1.0]).expect("group exists");
        assert_eq!(size_one.members, vec![0, 2]);
        assert_eq!(size_one.distances, vec![5.0, 7.0]);
    }

    #[test]
    // Purpose
    // -------
    // The half-normal line likelihood matches its closed form.
    //
    // Given
    // -----
    // - Distances [10, 20, 30], w = 50, σ = 25.
    //
    // Expect
    // ------
    // - ℓ̄ = mean(-x²/(2σ²)) - ln ∫₀ʷ g.
    fn half_normal_line_loglik_matches_closed_form() {
        // Arrange
        let data = half_normal_data(vec![10.0, 20.0, 30.0], 50.0);
        let sigma = 25.0_f64;
        let expected = [10.0_f64, 20.0, 30.0].iter().map(|x| -x * x / (2.0 * sigma * sigma)).sum::<f64>()
            / 3.0
            - half_normal_line_integral(sigma, 50.0).ln();

        // Act
        let value = DistanceLikelihood
            .value(&array![sigma.ln()], &data)
            .expect("value should evaluate");

        // Assert
        assert_relative_eq!(value, expected, max_relative = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Infeasible θ maps to the penalty rather than an error.
    //
    // Given
    // -----
    // - log σ = 800, which overflows σ to infinity.
    //
    // Expect
    // ------
    // - `INFEASIBLE_LOGLIK`; `average_loglik` names the reason.
    fn infeasible_theta_returns_penalty() {
        // Arrange
        let data = half_normal_data(vec![10.0, 20.0], 50.0);

        // Act
        let value = DistanceLikelihood.value(&array![800.0], &data).expect("value should evaluate");
        let reason = data.average_loglik(&[800.0], data.monotonicity);

        // Assert
        assert_eq!(value, INFEASIBLE_LOGLIK);
        assert_eq!(reason, Err("detection function parameters are invalid"));
    }
}
