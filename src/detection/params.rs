//! detection::params — θ split into its blocks, and curve construction.
use crate::detection::{
    curve::DetectionCurve, layout::ParamLayout, spec::ModelSpec,
};
use crate::errors::DomainError;
use crate::optimization::numerical_stability::softmax_with_reference;
use ndarray::ArrayView1;

/// Unconstrained parameters grouped by role.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionParams {
    pub log_scales: Vec<f64>,
    pub scale_coefs: Vec<f64>,
    pub log_shape: Option<f64>,
    pub shape_coefs: Vec<f64>,
    pub adjustment: Vec<f64>,
    pub logits: Vec<f64>,
}

impl DetectionParams {
    /// Split `theta` according to `layout`.
    ///
    /// # Errors
    /// - `ParameterLength` when `theta.len() != layout.len()`.
    /// - `NonFiniteParameter` for NaN or infinite entries.
    pub fn from_theta(layout: &ParamLayout, theta: &[f64]) -> Result<Self, DomainError> {
        if theta.len() != layout.len() {
            return Err(DomainError::ParameterLength { expected: layout.len(), actual: theta.len() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(DomainError::NonFiniteParameter { index, value });
        }
        Ok(Self {
            log_scales: theta[layout.scale_intercepts.clone()].to_vec(),
            scale_coefs: theta[layout.scale_coefs.clone()].to_vec(),
            log_shape: layout.shape_intercept.map(|i| theta[i]),
            shape_coefs: theta[layout.shape_coefs.clone()].to_vec(),
            adjustment: theta[layout.adjustment.clone()].to_vec(),
            logits: theta[layout.logits.clone()].to_vec(),
        })
    }

    /// Mixture weights from the logits; `[1.0]` without a mixture.
    pub fn weights(&self) -> Vec<f64> {
        softmax_with_reference(ArrayView1::from(self.logits.as_slice())).to_vec()
    }

    /// Build the curve for one covariate row.
    ///
    /// `σⱼ = exp(log σⱼ + β·z)` and `b = exp(log b + γ·z)`; the design rows
    /// must match the coefficient blocks in length.
    ///
    /// # Errors
    /// - Any construction error from [`DetectionCurve`], which for a
    ///   fitting run marks the point infeasible.
    pub fn curve(
        &self, spec: &ModelSpec, truncation: f64, scale_row: &[f64], shape_row: &[f64],
    ) -> Result<DetectionCurve, DomainError> {
        let scale_shift = dot(&self.scale_coefs, scale_row);
        let scales: Vec<f64> = self.log_scales.iter().map(|ls| (ls + scale_shift).exp()).collect();
        let shape = self.log_shape.map(|lb| (lb + dot(&self.shape_coefs, shape_row)).exp());
        let curve = DetectionCurve::new(spec.key, scales, shape, self.weights(), truncation)?;
        match &spec.adjustment {
            Some(adjustment) => curve.with_adjustment(adjustment.clone(), self.adjustment.clone()),
            None => Ok(curve),
        }
    }
}

fn dot(coefs: &[f64], row: &[f64]) -> f64 {
    coefs.iter().zip(row).map(|(c, z)| c * z).sum()
}
