//! detection::spec — model specification and transect geometry.
use crate::detection::{
    adjustment::AdjustmentSpec, covariates::CovariateFormula, key::KeyKind, mixture::MixtureSpec,
};
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Survey geometry. Line transects record perpendicular distances, point
/// transects radial distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransectType {
    #[default]
    Line,
    Point,
}

impl std::fmt::Display for TransectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransectType::Line => f.write_str("line"),
            TransectType::Point => f.write_str("point"),
        }
    }
}

impl FromStr for TransectType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(TransectType::Line),
            "point" => Ok(TransectType::Point),
            _ => Err(DomainError::Config { text: format!("unknown transect type '{s}'") }),
        }
    }
}

/// Full description of a detection-function model: a key, optionally an
/// adjustment series or a mixture (never both), and covariate links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSpec {
    pub key: KeyKind,
    #[serde(default)]
    pub adjustment: Option<AdjustmentSpec>,
    #[serde(default)]
    pub mixture: Option<MixtureSpec>,
    #[serde(default)]
    pub covariates: CovariateFormula,
}

impl ModelSpec {
    pub fn new(key: KeyKind) -> Self {
        Self { key, adjustment: None, mixture: None, covariates: CovariateFormula::default() }
    }

    pub fn half_normal() -> Self {
        Self::new(KeyKind::HalfNormal)
    }

    pub fn hazard_rate() -> Self {
        Self::new(KeyKind::HazardRate)
    }

    pub fn uniform() -> Self {
        Self::new(KeyKind::Uniform)
    }

    pub fn with_adjustment(mut self, adjustment: AdjustmentSpec) -> Self {
        self.adjustment = Some(adjustment);
        self
    }

    pub fn with_mixture(mut self, components: usize) -> Self {
        self.mixture = Some(MixtureSpec::new(components));
        self
    }

    pub fn with_covariates(mut self, covariates: CovariateFormula) -> Self {
        self.covariates = covariates;
        self
    }

    /// Mixture component count, 1 for a plain key.
    pub fn n_components(&self) -> usize {
        self.mixture.map_or(1, |m| m.components)
    }

    pub fn n_adjustments(&self) -> usize {
        self.adjustment.as_ref().map_or(0, AdjustmentSpec::len)
    }

    /// Check every part against the key and against each other.
    ///
    /// # Errors
    /// Returns the first `DomainError` found by the adjustment, mixture and
    /// covariate checks, or `MixtureWithAdjustment`.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.adjustment.is_some() && self.mixture.is_some() {
            return Err(DomainError::MixtureWithAdjustment);
        }
        if let Some(adjustment) = &self.adjustment {
            adjustment.validate(self.key)?;
        }
        if let Some(mixture) = &self.mixture {
            mixture.validate(self.key)?;
        }
        self.covariates.validate(self.key)
    }

    /// Human-readable label such as `hn+cos(2,3)`, `hr mix(2)` or
    /// `hn ~ size+obs`.
    pub fn label(&self) -> String {
        let mut label = self.key.label().to_string();
        if let Some(adjustment) = &self.adjustment {
            label.push('+');
            label.push_str(&adjustment.label());
        }
        if let Some(mixture) = &self.mixture {
            label.push_str(&format!(" mix({})", mixture.components));
        }
        if !self.covariates.scale.is_empty() {
            label.push_str(&format!(" ~ {}", self.covariates.scale.join("+")));
        }
        if !self.covariates.shape.is_empty() {
            label.push_str(&format!(" | shape ~ {}", self.covariates.shape.join("+")));
        }
        label
    }
}
