//! detection::covariates — covariate values, formulas and design rows.
//!
//! Purpose
//! -------
//! Turn per-observation covariate maps into numeric design rows for the
//! log-linear links `σ(z) = exp(β₀ + β·z)` and `b(z) = exp(γ₀ + γ·z)`.
//!
//! Key behaviors
//! -------------
//! - Numeric covariates enter as a single column named after the covariate.
//! - Factor covariates use treatment coding: levels are sorted, the first
//!   is the baseline, and every other level gets a 0/1 column named
//!   `name[level]`.
//! - Levels are frozen when the design is built; evaluating at an unseen
//!   level is an error rather than a silent baseline.
//!
//! Invariants & assumptions
//! ------------------------
//! - A covariate is numeric everywhere or a factor everywhere.
//! - The intercepts live in the parameter vector, not in the design rows.
use crate::detection::key::KeyKind;
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A single covariate value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CovariateValue {
    Numeric(f64),
    Factor(String),
}

impl From<f64> for CovariateValue {
    fn from(value: f64) -> Self {
        CovariateValue::Numeric(value)
    }
}

impl From<&str> for CovariateValue {
    fn from(level: &str) -> Self {
        CovariateValue::Factor(level.to_string())
    }
}

/// Covariates attached to one observation, keyed by name.
pub type Covariates = BTreeMap<String, CovariateValue>;

/// Which covariates enter which link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CovariateFormula {
    #[serde(default)]
    pub scale: Vec<String>,
    #[serde(default)]
    pub shape: Vec<String>,
}

impl CovariateFormula {
    pub fn scale<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { scale: names.into_iter().map(Into::into).collect(), shape: Vec::new() }
    }

    pub fn with_shape<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shape = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_empty() && self.shape.is_empty()
    }

    /// # Errors
    /// - `CovariateTargetUnsupported` for scale covariates on the uniform key
    ///   or shape covariates on a key without a shape.
    /// - `DuplicateCovariate` when a name repeats within one target.
    pub fn validate(&self, key: KeyKind) -> Result<(), DomainError> {
        if !self.scale.is_empty() && !key.has_scale() {
            return Err(DomainError::CovariateTargetUnsupported {
                target: "scale",
                key: key.label(),
            });
        }
        if !self.shape.is_empty() && !key.has_shape() {
            return Err(DomainError::CovariateTargetUnsupported {
                target: "shape",
                key: key.label(),
            });
        }
        for names in [&self.scale, &self.shape] {
            let mut seen = BTreeSet::new();
            for name in names {
                if !seen.insert(name.as_str()) {
                    return Err(DomainError::DuplicateCovariate { name: name.clone() });
                }
            }
        }
        Ok(())
    }
}

/// One formula term after its kind and levels are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CovariateTerm {
    Numeric { name: String },
    /// `levels[0]` is the baseline.
    Factor { name: String, levels: Vec<String> },
}

impl CovariateTerm {
    /// Number of design columns this term contributes.
    pub fn width(&self) -> usize {
        match self {
            CovariateTerm::Numeric { .. } => 1,
            CovariateTerm::Factor { levels, .. } => levels.len().saturating_sub(1),
        }
    }

    pub fn column_names(&self) -> Vec<String> {
        match self {
            CovariateTerm::Numeric { name } => vec![name.clone()],
            CovariateTerm::Factor { name, levels } => {
                levels.iter().skip(1).map(|level| format!("{name}[{level}]")).collect()
            }
        }
    }

    fn name(&self) -> &str {
        match self {
            CovariateTerm::Numeric { name } | CovariateTerm::Factor { name, .. } => name,
        }
    }

    fn encode_into(
        &self, covariates: &Covariates, index: usize, row: &mut Vec<f64>,
    ) -> Result<(), DomainError> {
        let name = self.name();
        let value = covariates
            .get(name)
            .ok_or_else(|| DomainError::MissingCovariate { name: name.to_string(), index })?;
        match (self, value) {
            (CovariateTerm::Numeric { .. }, CovariateValue::Numeric(v)) => {
                if !v.is_finite() {
                    return Err(DomainError::NonFiniteCovariate { name: name.to_string(), value: *v });
                }
                row.push(*v);
            }
            (CovariateTerm::Factor { levels, .. }, CovariateValue::Factor(level)) => {
                let position = levels.iter().position(|l| l == level).ok_or_else(|| {
                    DomainError::UnknownFactorLevel { name: name.to_string(), level: level.clone() }
                })?;
                row.extend((1..levels.len()).map(|j| if j == position { 1.0 } else { 0.0 }));
            }
            _ => return Err(DomainError::CovariateKindMismatch { name: name.to_string() }),
        }
        Ok(())
    }

    fn from_rows<'a, I>(name: &str, rows: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = &'a Covariates>,
    {
        let mut numeric: Option<bool> = None;
        let mut levels = BTreeSet::new();
        for (index, covariates) in rows.into_iter().enumerate() {
            let value = covariates
                .get(name)
                .ok_or_else(|| DomainError::MissingCovariate { name: name.to_string(), index })?;
            let is_numeric = matches!(value, CovariateValue::Numeric(_));
            if *numeric.get_or_insert(is_numeric) != is_numeric {
                return Err(DomainError::CovariateKindMismatch { name: name.to_string() });
            }
            match value {
                CovariateValue::Numeric(v) if !v.is_finite() => {
                    return Err(DomainError::NonFiniteCovariate { name: name.to_string(), value: *v });
                }
                CovariateValue::Factor(level) => {
                    levels.insert(level.clone());
                }
                CovariateValue::Numeric(_) => {}
            }
        }
        Ok(match numeric {
            Some(false) => {
                CovariateTerm::Factor { name: name.to_string(), levels: levels.into_iter().collect() }
            }
            _ => CovariateTerm::Numeric { name: name.to_string() },
        })
    }
}

/// Resolved design for both links.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CovariateDesign {
    scale: Vec<CovariateTerm>,
    shape: Vec<CovariateTerm>,
}

impl CovariateDesign {
    /// Resolve `formula` against the covariate rows it will be fitted to.
    ///
    /// # Errors
    /// - `MissingCovariate` when a row lacks a named covariate.
    /// - `CovariateKindMismatch` when a covariate mixes numeric and factor
    ///   values.
    /// - `NonFiniteCovariate` for NaN or infinite numeric values.
    pub fn from_rows<'a, I>(formula: &CovariateFormula, rows: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = &'a Covariates>,
        I::IntoIter: Clone,
    {
        let rows = rows.into_iter();
        let scale = formula
            .scale
            .iter()
            .map(|name| CovariateTerm::from_rows(name, rows.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        let shape = formula
            .shape
            .iter()
            .map(|name| CovariateTerm::from_rows(name, rows.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { scale, shape })
    }

    pub fn is_empty(&self) -> bool {
        self.scale.is_empty() && self.shape.is_empty()
    }

    pub fn n_scale(&self) -> usize {
        self.scale.iter().map(CovariateTerm::width).sum()
    }

    pub fn n_shape(&self) -> usize {
        self.shape.iter().map(CovariateTerm::width).sum()
    }

    pub fn scale_names(&self) -> Vec<String> {
        self.scale.iter().flat_map(CovariateTerm::column_names).collect()
    }

    pub fn shape_names(&self) -> Vec<String> {
        self.shape.iter().flat_map(CovariateTerm::column_names).collect()
    }

    pub fn scale_row(&self, covariates: &Covariates, index: usize) -> Result<Vec<f64>, DomainError> {
        encode(&self.scale, covariates, index)
    }

    pub fn shape_row(&self, covariates: &Covariates, index: usize) -> Result<Vec<f64>, DomainError> {
        encode(&self.shape, covariates, index)
    }
}

fn encode(
    terms: &[CovariateTerm], covariates: &Covariates, index: usize,
) -> Result<Vec<f64>, DomainError> {
    let mut row = Vec::with_capacity(terms.iter().map(CovariateTerm::width).sum());
    for term in terms {
        term.encode_into(covariates, index, &mut row)?;
    }
    Ok(row)
}
