//! fitting::control — tuning knobs for a single fit.
//!
//! Purpose
//! -------
//! Collect every setting that changes how a fit runs, with no global state:
//! the solver, the monotonicity constraint, iteration and tolerance limits,
//! and optional starting values and parameter scaling.
//!
//! Key behaviors
//! -------------
//! - [`FitControl::default`] gives Nelder–Mead, monotonicity on, a 20-point
//!   grid, 1000 iterations and tolerance 1e-10.
//! - Builder methods adjust one field at a time.
//! - [`FitControl::validate`] rejects malformed settings with `DomainError`
//!   before any likelihood is evaluated.
//! - [`FitControl::from_toml_str`] loads and validates a TOML document; every
//!   field is optional and falls back to the default.
//!
//! Conventions
//! -----------
//! - `tolerance` is the L-BFGS cost-change tolerance and the Nelder–Mead
//!   simplex cost spread, both on the average log-likelihood.
//! - `starting_values` and `parameter_scaling` are in the unconstrained θ
//!   layout of the model being fitted; their length is checked at fit time.
use crate::detection::covariates::Covariates;
use crate::errors::DomainError;
use crate::optimization::loglik_optimizer::{
    DEFAULT_SIMPLEX_STEP, MLEOptions, OptimizerChoice, Tolerances,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_RESOLUTION: usize = 20;
pub const DEFAULT_MAX_ITERATIONS: usize = 1000;
pub const DEFAULT_TOLERANCE: f64 = 1e-10;
pub const DEFAULT_TOL_GRAD: f64 = 1e-7;

/// Fit settings. See the module docs for defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FitControl {
    pub optimizer: OptimizerChoice,
    /// Penalize adjusted curves that rise or go negative on `[0, w]`.
    pub monotonicity: bool,
    /// Grid points used by the monotonicity check.
    pub grid_resolution: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub starting_values: Option<Vec<f64>>,
    /// Optimizer works in `φ = θ / s` for these `s`.
    pub parameter_scaling: Option<Vec<f64>>,
    /// Extra covariate tuples whose curves must also be monotone.
    pub monotonicity_probes: Vec<Covariates>,
    /// Attach the optimizer observer (requires the `obs_slog` feature).
    pub verbose: bool,
}

impl Default for FitControl {
    fn default() -> Self {
        Self {
            optimizer: OptimizerChoice::NelderMead,
            monotonicity: true,
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            starting_values: None,
            parameter_scaling: None,
            monotonicity_probes: Vec::new(),
            verbose: false,
        }
    }
}

impl FitControl {
    pub fn with_optimizer(mut self, optimizer: OptimizerChoice) -> Self {
        self.optimizer = optimizer;
        self
    }

    pub fn with_monotonicity(mut self, enabled: bool) -> Self {
        self.monotonicity = enabled;
        self
    }

    pub fn with_grid_resolution(mut self, points: usize) -> Self {
        self.grid_resolution = points;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_starting_values(mut self, theta0: Vec<f64>) -> Self {
        self.starting_values = Some(theta0);
        self
    }

    pub fn with_parameter_scaling(mut self, scaling: Vec<f64>) -> Self {
        self.parameter_scaling = Some(scaling);
        self
    }

    pub fn with_monotonicity_probe(mut self, probe: Covariates) -> Self {
        self.monotonicity_probes.push(probe);
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Check settings that do not depend on the model.
    ///
    /// # Errors
    /// - `InvalidGridResolution` for fewer than two grid points.
    /// - `InvalidMaxIterations` for a zero budget.
    /// - `InvalidTolerance` for a non-finite or non-positive tolerance.
    /// - `NonFiniteParameter` for a non-finite starting value.
    /// - `InvalidParameterScaling` for a non-finite or non-positive scale.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.grid_resolution < 2 {
            return Err(DomainError::InvalidGridResolution { value: self.grid_resolution });
        }
        if self.max_iterations == 0 {
            return Err(DomainError::InvalidMaxIterations { value: self.max_iterations });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(DomainError::InvalidTolerance { value: self.tolerance });
        }
        if let Some(theta0) = &self.starting_values {
            if let Some((index, &value)) = theta0.iter().enumerate().find(|(_, v)| !v.is_finite()) {
                return Err(DomainError::NonFiniteParameter { index, value });
            }
        }
        if let Some(scaling) = &self.parameter_scaling {
            if let Some((index, &value)) =
                scaling.iter().enumerate().find(|(_, s)| !s.is_finite() || **s <= 0.0)
            {
                return Err(DomainError::InvalidParameterScaling { index, value });
            }
        }
        Ok(())
    }

    /// Optimizer-layer options for these settings.
    ///
    /// # Errors
    /// - `OptimizerConfig` when the optimization layer rejects a value.
    pub fn mle_options(&self) -> Result<MLEOptions, DomainError> {
        let tols = Tolerances::new(
            Some(DEFAULT_TOL_GRAD),
            Some(self.tolerance),
            Some(self.max_iterations),
        )
        .map_err(DomainError::OptimizerConfig)?;
        MLEOptions::new(tols, self.optimizer, self.verbose, None, DEFAULT_SIMPLEX_STEP)
            .map_err(DomainError::OptimizerConfig)
    }

    /// Parse and validate a TOML document.
    ///
    /// # Examples
    /// ```rust
    /// # use rust_distance::fitting::FitControl;
    /// let control = FitControl::from_toml_str("optimizer = \"lbfgs_more_thuente\"\ngrid_resolution = 40").unwrap();
    /// assert_eq!(control.grid_resolution, 40);
    /// assert!(control.monotonicity);
    /// ```
    ///
    /// # Errors
    /// - `Config` when the document does not parse.
    /// - Any [`FitControl::validate`] error.
    pub fn from_toml_str(text: &str) -> Result<Self, DomainError> {
        let control: FitControl =
            toml::from_str(text).map_err(|e| DomainError::Config { text: e.to_string() })?;
        control.validate()?;
        Ok(control)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Documented defaults.
    // - Each validation rejection.
    // - TOML loading with partial documents and bad input.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Defaults match the documented values.
    //
    // Given
    // -----
    // - `FitControl::default()`.
    //
    // Expect
    // ------
    // - Nelder–Mead, monotonicity on, grid 20, 1000 iterations, 1e-10.
    fn defaults_are_documented_values() {
        // Act
        let control = FitControl::default();

        // Assert
        assert_eq!(control.optimizer, OptimizerChoice::NelderMead);
        assert!(control.monotonicity);
        assert_eq!(control.grid_resolution, 20);
        assert_eq!(control.max_iterations, 1000);
        assert_eq!(control.tolerance, 1e-10);
        assert!(control.validate().is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Malformed settings are rejected.
    //
    // Given
    // -----
    // - Grid 1, zero iterations, negative tolerance, NaN start, zero scale.
    //
    // Expect
    // ------
    // - The matching `DomainError` for each.
    fn validate_rejects_malformed_settings() {
        // Arrange
        let base = FitControl::default();

        // Act / Assert
        assert_eq!(
            base.clone().with_grid_resolution(1).validate(),
            Err(DomainError::InvalidGridResolution { value: 1 })
        );
        assert_eq!(
            base.clone().with_max_iterations(0).validate(),
            Err(DomainError::InvalidMaxIterations { value: 0 })
        );
        assert_eq!(
            base.clone().with_tolerance(-1.0).validate(),
            Err(DomainError::InvalidTolerance { value: -1.0 })
        );
        assert!(matches!(
            base.clone().with_starting_values(vec![1.0, f64::NAN]).validate(),
            Err(DomainError::NonFiniteParameter { index: 1, .. })
        ));
        assert_eq!(
            base.with_parameter_scaling(vec![1.0, 0.0]).validate(),
            Err(DomainError::InvalidParameterScaling { index: 1, value: 0.0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // TOML documents may set any subset of fields.
    //
    // Given
    // -----
    // - A document setting the optimizer, tolerance and monotonicity; one
    //   with an unknown field; one with a zero grid.
    //
    // Expect
    // ------
    // - The first loads with other fields at defaults; the others fail.
    fn toml_loading_fills_defaults_and_rejects_bad_documents() {
        // Arrange
        let text = "optimizer = \"lbfgs_hager_zhang\"\ntolerance = 1e-8\nmonotonicity = false\n";

        // Act
        let control = FitControl::from_toml_str(text).expect("document should load");

        // Assert
        assert_eq!(control.optimizer, OptimizerChoice::LbfgsHagerZhang);
        assert_eq!(control.tolerance, 1e-8);
        assert!(!control.monotonicity);
        assert_eq!(control.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(matches!(FitControl::from_toml_str("speed = 3"), Err(DomainError::Config { .. })));
        assert!(matches!(
            FitControl::from_toml_str("grid_resolution = 0"),
            Err(DomainError::InvalidGridResolution { value: 0 })
        ));
    }
}
