//! config — TOML description of a complete fit.
//!
//! A [`FitConfig`] names the model, the transect geometry, the truncation
//! and the control settings, so an analysis can be reproduced from a file:
//!
//! ```toml
//! transect = "line"
//! truncation = 200.0
//!
//! [model]
//! key = "half_normal"
//!
//! [model.adjustment]
//! kind = "cosine"
//! orders = [2]
//!
//! [control]
//! grid_resolution = 40
//! ```
//!
//! Only `[model]` is required; `transect` defaults to `line`, a missing
//! `truncation` uses the largest observed distance, and `[control]` falls
//! back to [`FitControl::default`].
use crate::data::ObservationSet;
use crate::detection::spec::{ModelSpec, TransectType};
use crate::errors::{DomainError, DsResult};
use crate::fitting::{FitControl, FittedModel, fit};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FitConfig {
    pub model: ModelSpec,
    #[serde(default)]
    pub transect: TransectType,
    #[serde(default)]
    pub truncation: Option<f64>,
    #[serde(default)]
    pub control: FitControl,
}

impl FitConfig {
    pub fn new(model: ModelSpec) -> Self {
        Self { model, transect: TransectType::Line, truncation: None, control: FitControl::default() }
    }

    /// Parse a TOML document and validate the model and control sections.
    ///
    /// # Errors
    /// - `Config` when the document does not parse.
    /// - Model or control validation errors.
    pub fn from_toml_str(text: &str) -> Result<Self, DomainError> {
        let config: FitConfig =
            toml::from_str(text).map_err(|e| DomainError::Config { text: e.to_string() })?;
        config.model.validate()?;
        config.control.validate()?;
        Ok(config)
    }

    /// Fit the configured model to `data`.
    pub fn fit(&self, data: &ObservationSet) -> DsResult<FittedModel> {
        fit(data, &self.model, self.transect, self.truncation, &self.control)
    }
}
