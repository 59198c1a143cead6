//! detection::layout — positions of each parameter block in θ.
//!
//! θ is laid out as
//!
//! ```text
//! [ log σ intercepts | σ coefs | log b | b coefs | α | logits ]
//! ```
//!
//! with one log-σ intercept per mixture component (none for uniform), a
//! log-shape intercept only for hazard-rate, and `components - 1` logits.
use crate::detection::{covariates::CovariateDesign, spec::ModelSpec};
use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamLayout {
    pub scale_intercepts: Range<usize>,
    pub scale_coefs: Range<usize>,
    pub shape_intercept: Option<usize>,
    pub shape_coefs: Range<usize>,
    pub adjustment: Range<usize>,
    pub logits: Range<usize>,
    names: Vec<String>,
}

impl ParamLayout {
    /// Layout for `spec` with covariate columns from `design`.
    ///
    /// Assumes `spec` has been validated.
    pub fn new(spec: &ModelSpec, design: &CovariateDesign) -> Self {
        let components = spec.n_components();
        let n_intercepts = if spec.key.has_scale() { components } else { 0 };
        let n_scale_coefs = if spec.key.has_scale() { design.n_scale() } else { 0 };
        let has_shape = spec.key.has_shape();
        let n_shape_coefs = if has_shape { design.n_shape() } else { 0 };

        let mut cursor = 0;
        let mut take = |len: usize| {
            let range = cursor..cursor + len;
            cursor += len;
            range
        };
        let scale_intercepts = take(n_intercepts);
        let scale_coefs = take(n_scale_coefs);
        let shape_block = take(usize::from(has_shape));
        let shape_coefs = take(n_shape_coefs);
        let adjustment = take(spec.n_adjustments());
        let logits = take(components - 1);
        let shape_intercept = has_shape.then_some(shape_block.start);

        let mut names = Vec::with_capacity(logits.end);
        if components == 1 {
            names.extend(scale_intercepts.clone().map(|_| "log_sigma".to_string()));
        } else {
            names.extend((1..=n_intercepts).map(|j| format!("log_sigma[{j}]")));
        }
        names.extend(design.scale_names().into_iter().take(n_scale_coefs).map(|c| format!("sigma:{c}")));
        if has_shape {
            names.push("log_shape".to_string());
        }
        names.extend(design.shape_names().into_iter().take(n_shape_coefs).map(|c| format!("shape:{c}")));
        if let Some(adj) = &spec.adjustment {
            names.extend(adj.orders.iter().map(|order| format!("{}[{order}]", adj.kind.label())));
        }
        names.extend((1..components).map(|j| format!("logit[{j}]")));

        Self { scale_intercepts, scale_coefs, shape_intercept, shape_coefs, adjustment, logits, names }
    }

    /// Total number of free parameters `k`.
    pub fn len(&self) -> usize {
        self.logits.end
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::{
        adjustment::{AdjustmentKind, AdjustmentSpec},
        covariates::{CovariateFormula, CovariateValue, Covariates},
    };

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Block positions and names for each model family.
    // - The zero-parameter uniform model.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Blocks appear in the documented order.
    //
    // Given
    // -----
    // - Hazard-rate with a numeric scale covariate and cos(2,3).
    //
    // Expect
    // ------
    // - [log_sigma, sigma:size, log_shape, cos[2], cos[3]].
    fn hazard_rate_with_covariate_and_adjustment() {
        // Arrange
        let formula = CovariateFormula::scale(["size"]);
        let rows: Vec<Covariates> =
            vec![[("size".to_string(), CovariateValue::Numeric(2.0))].into_iter().collect()];
        let design = CovariateDesign::from_rows(&formula, &rows).expect("design should build");
        let spec = ModelSpec::hazard_rate()
            .with_covariates(formula)
            .with_adjustment(AdjustmentSpec::new(AdjustmentKind::Cosine, vec![2, 3]));

        // Act
        let layout = ParamLayout::new(&spec, &design);

        // Assert
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.scale_intercepts, 0..1);
        assert_eq!(layout.scale_coefs, 1..2);
        assert_eq!(layout.shape_intercept, Some(2));
        assert_eq!(layout.adjustment, 3..5);
        assert_eq!(layout.names(), &["log_sigma", "sigma:size", "log_shape", "cos[2]", "cos[3]"]);
    }

    #[test]
    // Purpose
    // -------
    // Mixtures carry one intercept per component and m - 1 logits.
    //
    // Given
    // -----
    // - Half-normal with three components; bare uniform.
    //
    // Expect
    // ------
    // - Five parameters for the mixture, zero for uniform.
    fn mixture_and_uniform_layouts() {
        // Arrange
        let design = CovariateDesign::default();

        // Act
        let mixture = ParamLayout::new(&ModelSpec::half_normal().with_mixture(3), &design);
        let uniform = ParamLayout::new(&ModelSpec::uniform(), &design);

        // Assert
        assert_eq!(mixture.len(), 5);
        assert_eq!(mixture.logits, 3..5);
        assert_eq!(mixture.names()[1], "log_sigma[2]");
        assert!(uniform.is_empty());
    }
}
