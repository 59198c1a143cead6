//! detection::curve — a fully parameterized detection function.
//!
//! Purpose
//! -------
//! Hold one concrete curve `g(x)` on `[0, w]`, natural-scale parameters
//! already resolved, and answer the questions fitting, goodness of fit and
//! simulation ask of it: pointwise values, integrals, detection probability
//! and monotonicity.
//!
//! Key behaviors
//! -------------
//! - Plain key: `g(x) = k(x)`.
//! - Adjusted key: `g(x) = k(x) A(x) / A(0)` with `A = 1 + Σ αⱼ aⱼ`.
//! - Mixture: `g(x) = Σ φⱼ kⱼ(x) / Σ φⱼ`.
//! - [`DetectionCurve::evaluate`] clamps to `[0, 1]`; [`DetectionCurve::raw`]
//!   does not, so likelihood and shape checks see the unclamped series.
//!
//! Invariants & assumptions
//! ------------------------
//! - `g(0) = 1` exactly for every construction: the numerator and
//!   denominator at zero are computed by the same arithmetic.
//! - Scales, shape, weights, truncation and adjustment normalization are
//!   validated at construction; evaluation never re-checks them.
use crate::detection::{
    adjustment::{AdjustmentSpec, series},
    key::{KeyKind, half_normal, half_normal_line_integral, half_normal_point_integral, hazard_rate},
    mixture::{MixtureSpec, validate_weights},
    spec::TransectType,
};
use crate::errors::DomainError;
use crate::numerics::integrate;
use crate::optimization::numerical_stability::MONOTONE_TOL;

#[derive(Debug, Clone, PartialEq)]
struct Adjustment {
    spec: AdjustmentSpec,
    coefs: Vec<f64>,
    at_zero: f64,
}

/// A detection function with fixed parameters and truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCurve {
    key: KeyKind,
    scales: Vec<f64>,
    shape: Option<f64>,
    weights: Vec<f64>,
    adjustment: Option<Adjustment>,
    truncation: f64,
}

impl DetectionCurve {
    /// General constructor. `scales` holds one σ per component (ignored for
    /// the uniform key); `weights` one φ per component.
    ///
    /// # Errors
    /// - `InvalidTruncation`, `InvalidScale`, `InvalidShape` for
    ///   non-finite or non-positive values.
    /// - `InvalidMixtureComponents`, `InvalidMixtureWeights` for a malformed
    ///   mixture.
    pub fn new(
        key: KeyKind, scales: Vec<f64>, shape: Option<f64>, weights: Vec<f64>, truncation: f64,
    ) -> Result<Self, DomainError> {
        if !truncation.is_finite() || truncation <= 0.0 {
            return Err(DomainError::InvalidTruncation { value: truncation });
        }
        let scales = if key.has_scale() { scales } else { Vec::new() };
        if key.has_scale() && scales.is_empty() {
            return Err(DomainError::InvalidScale { value: f64::NAN });
        }
        if let Some(&bad) = scales.iter().find(|s| !s.is_finite() || **s <= 0.0) {
            return Err(DomainError::InvalidScale { value: bad });
        }
        let shape = if key.has_shape() {
            match shape {
                Some(b) if b.is_finite() && b > 0.0 => Some(b),
                other => return Err(DomainError::InvalidShape { value: other.unwrap_or(f64::NAN) }),
            }
        } else {
            None
        };
        let components = scales.len().max(1);
        if weights.len() != components {
            return Err(DomainError::InvalidMixtureWeights { reason: "need one weight per component" });
        }
        if components > 1 {
            MixtureSpec::new(components).validate(key)?;
        }
        validate_weights(&weights)?;
        Ok(Self { key, scales, shape, weights, adjustment: None, truncation })
    }

    pub fn half_normal(sigma: f64, truncation: f64) -> Result<Self, DomainError> {
        Self::new(KeyKind::HalfNormal, vec![sigma], None, vec![1.0], truncation)
    }

    pub fn hazard_rate(sigma: f64, shape: f64, truncation: f64) -> Result<Self, DomainError> {
        Self::new(KeyKind::HazardRate, vec![sigma], Some(shape), vec![1.0], truncation)
    }

    pub fn uniform(truncation: f64) -> Result<Self, DomainError> {
        Self::new(KeyKind::Uniform, Vec::new(), None, vec![1.0], truncation)
    }

    pub fn mixture(
        key: KeyKind, scales: Vec<f64>, shape: Option<f64>, weights: Vec<f64>, truncation: f64,
    ) -> Result<Self, DomainError> {
        Self::new(key, scales, shape, weights, truncation)
    }

    /// Attach an adjustment series.
    ///
    /// # Errors
    /// - `MixtureWithAdjustment` on a mixture curve.
    /// - Order-set errors from [`AdjustmentSpec::validate`].
    /// - `AdjustmentLengthMismatch`, `NonFiniteParameter` for bad
    ///   coefficients.
    /// - `InvalidAdjustmentNormalization` when `A(0) ≤ 0`.
    pub fn with_adjustment(mut self, spec: AdjustmentSpec, coefs: Vec<f64>) -> Result<Self, DomainError> {
        if self.is_mixture() {
            return Err(DomainError::MixtureWithAdjustment);
        }
        spec.validate(self.key)?;
        if coefs.len() != spec.len() {
            return Err(DomainError::AdjustmentLengthMismatch {
                expected: spec.len(),
                actual: coefs.len(),
            });
        }
        if let Some((index, &value)) = coefs.iter().enumerate().find(|(_, c)| !c.is_finite()) {
            return Err(DomainError::NonFiniteParameter { index, value });
        }
        let at_zero = series(spec.kind, &spec.orders, &coefs, 0.0, self.truncation, self.hermite_scale());
        if !at_zero.is_finite() || at_zero <= 0.0 {
            return Err(DomainError::InvalidAdjustmentNormalization { value: at_zero });
        }
        self.adjustment = Some(Adjustment { spec, coefs, at_zero });
        Ok(self)
    }

    pub fn key(&self) -> KeyKind {
        self.key
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    pub fn shape(&self) -> Option<f64> {
        self.shape
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn truncation(&self) -> f64 {
        self.truncation
    }

    pub fn is_mixture(&self) -> bool {
        self.weights.len() > 1
    }

    pub fn has_adjustment(&self) -> bool {
        self.adjustment.is_some()
    }

    /// `g(x)` clamped to `[0, 1]`.
    ///
    /// # Errors
    /// - `InvalidEvaluationPoint` for negative or non-finite `x`.
    pub fn evaluate(&self, x: f64) -> Result<f64, DomainError> {
        if !x.is_finite() || x < 0.0 {
            return Err(DomainError::InvalidEvaluationPoint { value: x });
        }
        Ok(self.raw(x).clamp(0.0, 1.0))
    }

    /// Unclamped `g(x)`; adjusted curves may leave `[0, 1]`.
    pub fn raw(&self, x: f64) -> f64 {
        let key = self.key_value(x);
        match &self.adjustment {
            None => key,
            Some(adj) => {
                let a = series(adj.spec.kind, &adj.spec.orders, &adj.coefs, x, self.truncation, self.hermite_scale());
                key * a / adj.at_zero
            }
        }
    }

    fn key_value(&self, x: f64) -> f64 {
        match self.key {
            KeyKind::Uniform => 1.0,
            KeyKind::HalfNormal => self.blend(|sigma| half_normal(x, sigma)),
            KeyKind::HazardRate => {
                let b = self.shape.unwrap_or(1.0);
                self.blend(|sigma| hazard_rate(x, sigma, b))
            }
        }
    }

    /// `Σ φⱼ f(σⱼ) / Σ φⱼ`, or `f(σ)` for a single component.
    fn blend<F: Fn(f64) -> f64>(&self, f: F) -> f64 {
        if let [sigma] = self.scales.as_slice() {
            return f(*sigma);
        }
        let (num, den) = self
            .scales
            .iter()
            .zip(&self.weights)
            .fold((0.0, 0.0), |(num, den), (&sigma, &w)| (num + w * f(sigma), den + w));
        num / den
    }

    fn hermite_scale(&self) -> f64 {
        self.scales.first().copied().unwrap_or(1.0)
    }

    /// `∫₀ᵘ tᵖ g(t) dt` with `p = 0` for line and `p = 1` for point
    /// transects, using the unclamped curve.
    ///
    /// Half-normal keys and mixtures without adjustments, and the bare
    /// uniform key, use closed forms; everything else uses adaptive
    /// quadrature.
    pub fn integral(&self, upper: f64, transect: TransectType) -> f64 {
        if self.adjustment.is_none() {
            match (self.key, transect) {
                (KeyKind::Uniform, TransectType::Line) => return upper,
                (KeyKind::Uniform, TransectType::Point) => return 0.5 * upper * upper,
                (KeyKind::HalfNormal, TransectType::Line) => {
                    return self.blend(|sigma| half_normal_line_integral(sigma, upper));
                }
                (KeyKind::HalfNormal, TransectType::Point) => {
                    return self.blend(|sigma| half_normal_point_integral(sigma, upper));
                }
                _ => {}
            }
        }
        match transect {
            TransectType::Line => integrate(|t| self.raw(t), 0.0, upper),
            TransectType::Point => integrate(|t| t * self.raw(t), 0.0, upper),
        }
    }

    /// Average detection probability within the truncation,
    /// `μ/w` (line) or `2∫t g/w²` (point).
    pub fn detection_probability(&self, transect: TransectType) -> f64 {
        let w = self.truncation;
        match transect {
            TransectType::Line => self.integral(w, transect) / w,
            TransectType::Point => 2.0 * self.integral(w, transect) / (w * w),
        }
    }

    /// Effective strip half-width `μ` (line) or effective detection radius
    /// `w √Pa` (point).
    pub fn effective_width(&self, transect: TransectType) -> f64 {
        match transect {
            TransectType::Line => self.integral(self.truncation, transect),
            TransectType::Point => self.truncation * self.detection_probability(transect).sqrt(),
        }
    }

    /// Model CDF of observed distances, `F(x) = ∫₀ˣ tᵖ g / ∫₀ʷ tᵖ g`,
    /// with `x` clamped to `[0, w]`.
    pub fn cdf(&self, x: f64, transect: TransectType) -> f64 {
        let x = x.clamp(0.0, self.truncation);
        let total = self.integral(self.truncation, transect);
        (self.integral(x, transect) / total).clamp(0.0, 1.0)
    }

    /// Whether `g` is non-negative and non-increasing on a grid of
    /// `grid_resolution` equally spaced points over `[0, w]`.
    pub fn is_non_increasing(&self, grid_resolution: usize) -> bool {
        let m = grid_resolution.max(2);
        let step = self.truncation / (m - 1) as f64;
        let mut previous = f64::INFINITY;
        for k in 0..m {
            let g = self.raw(step * k as f64);
            if !g.is_finite() || g < 0.0 || g > previous + MONOTONE_TOL {
                return false;
            }
            previous = g;
        }
        true
    }

    /// Whether `g` stays within `[0, 1]` on a grid of `grid_resolution`
    /// equally spaced points over `[0, w]`.
    pub fn is_within_unit_interval(&self, grid_resolution: usize) -> bool {
        let m = grid_resolution.max(2);
        let step = self.truncation / (m - 1) as f64;
        (0..m).all(|k| {
            let g = self.raw(step * k as f64);
            g.is_finite() && g >= 0.0 && g <= 1.0 + MONOTONE_TOL
        })
    }
}
