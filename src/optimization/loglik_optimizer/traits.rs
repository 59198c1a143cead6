//! Public API surface for log-likelihood maximization.
//!
//! - [`LogLikelihood`]: trait a model implements to be fitted.
//! - [`MLEOptions`] and [`Tolerances`]: optimizer configuration.
//! - [`OptimizerChoice`]: which Argmin solver runs the fit.
//! - [`OptimOutcome`]: normalized result returned by [`maximize`](super::maximize).
//!
//! Convention: we *maximize* `ℓ(θ)` by minimizing the cost `c(θ) = -ℓ(θ)`.
//! An analytic gradient, when provided, is `∇ℓ(θ)`; the adapter flips the
//! sign.
use crate::optimization::{
    errors::{OptError, OptResult},
    loglik_optimizer::{
        Cost, FnEvalMap, Grad, Theta,
        types::DEFAULT_SIMPLEX_STEP,
        validation::{validate_theta_hat, validate_value, verify_tol_cost, verify_tol_grad},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use argmin_math::ArgminL2Norm;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// User-implemented log-likelihood interface.
///
/// - `type Data`: payload carried into `value`/`grad`/`check`.
///
/// Required:
/// - `value(&Theta, &Data) -> OptResult<Cost>`: evaluate `ℓ(θ)`. Models that
///   can step outside their feasible region should return a large finite
///   penalty there rather than an error, so derivative-free solvers keep
///   moving.
/// - `check(&Theta, &Data) -> OptResult<()>`: reject malformed `θ` before
///   the solver starts.
///
/// Optional:
/// - `grad(&Theta, &Data) -> OptResult<Grad>`: analytic `∇ℓ(θ)`. Finite
///   differences are used when this returns `GradientNotImplemented`.
pub trait LogLikelihood {
    type Data: 'static;

    fn value(&self, theta: &Theta, data: &Self::Data) -> OptResult<Cost>;
    fn check(&self, theta: &Theta, data: &Self::Data) -> OptResult<()>;

    fn grad(&self, _theta: &Theta, _data: &Self::Data) -> OptResult<Grad> {
        Err(OptError::GradientNotImplemented)
    }
}

/// Solver used to maximize the log-likelihood.
///
/// - `NelderMead`: derivative-free simplex; tolerates the flat penalty
///   region of monotonicity-constrained models. Default.
/// - `LbfgsMoreThuente` / `LbfgsHagerZhang`: quasi-Newton with
///   finite-difference gradients and the named line search.
///
/// Parsing is case-insensitive and ignores `-`/`_`, so `"nelder-mead"`,
/// `"NelderMead"` and `"lbfgs_more_thuente"` are all accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerChoice {
    #[default]
    NelderMead,
    LbfgsMoreThuente,
    LbfgsHagerZhang,
}

impl OptimizerChoice {
    /// Whether the solver consumes gradients.
    pub fn uses_gradient(&self) -> bool {
        !matches!(self, OptimizerChoice::NelderMead)
    }
}

impl FromStr for OptimizerChoice {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| *c != '-' && *c != '_').collect::<String>().to_lowercase();
        match normalized.as_str() {
            "neldermead" | "nm" => Ok(OptimizerChoice::NelderMead),
            "lbfgsmorethuente" | "morethuente" | "lbfgs" => Ok(OptimizerChoice::LbfgsMoreThuente),
            "lbfgshagerzhang" | "hagerzhang" => Ok(OptimizerChoice::LbfgsHagerZhang),
            _ => Err(OptError::InvalidOptimizer {
                name: s.to_string(),
                reason: "Valid options are 'NelderMead', 'LbfgsMoreThuente' or 'LbfgsHagerZhang'.",
            }),
        }
    }
}

/// Optimizer-level configuration.
///
/// Fields:
/// - `tols`: tolerances and iteration cap.
/// - `optimizer`: solver choice.
/// - `verbose`: attach the slog observer (behind `obs_slog`).
/// - `lbfgs_mem`: L-BFGS history size; `None` uses `DEFAULT_LBFGS_MEM`.
/// - `simplex_step`: Nelder–Mead initial edge length.
///
/// Default: `tol_grad = 1e-7`, `tol_cost = 1e-10`, `max_iter = 1000`,
/// Nelder–Mead, quiet, default memory, `DEFAULT_SIMPLEX_STEP`.
#[derive(Debug, Clone, PartialEq)]
pub struct MLEOptions {
    pub tols: Tolerances,
    pub optimizer: OptimizerChoice,
    pub verbose: bool,
    pub lbfgs_mem: Option<usize>,
    pub simplex_step: f64,
}

impl MLEOptions {
    /// Create validated optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidLBFGSMem`] when `lbfgs_mem == Some(0)`.
    /// - [`OptError::InvalidSimplexStep`] when `simplex_step` is not finite
    ///   and positive.
    pub fn new(
        tols: Tolerances, optimizer: OptimizerChoice, verbose: bool, lbfgs_mem: Option<usize>,
        simplex_step: f64,
    ) -> OptResult<Self> {
        if let Some(m) = lbfgs_mem {
            if m == 0 {
                return Err(OptError::InvalidLBFGSMem {
                    mem: m,
                    reason: "L-BFGS memory must be greater than zero.",
                });
            }
        }
        if !simplex_step.is_finite() || simplex_step <= 0.0 {
            return Err(OptError::InvalidSimplexStep {
                step: simplex_step,
                reason: "Simplex step must be finite and positive.",
            });
        }
        Ok(Self { tols, optimizer, verbose, lbfgs_mem, simplex_step })
    }
}

impl Default for MLEOptions {
    fn default() -> Self {
        Self {
            tols: Tolerances { tol_grad: Some(1e-7), tol_cost: Some(1e-10), max_iter: Some(1000) },
            optimizer: OptimizerChoice::NelderMead,
            verbose: false,
            lbfgs_mem: None,
            simplex_step: DEFAULT_SIMPLEX_STEP,
        }
    }
}

/// Numerical tolerances and iteration limits.
///
/// - `tol_grad`: L-BFGS stops when the gradient norm falls below this.
/// - `tol_cost`: L-BFGS stops when the cost change falls below this;
///   Nelder–Mead stops when the standard deviation of the simplex costs
///   falls below this.
/// - `max_iter`: hard iteration cap.
///
/// At least one field must be `Some` (see [`Tolerances::new`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub tol_grad: Option<f64>,
    pub tol_cost: Option<f64>,
    pub max_iter: Option<usize>,
}

impl Tolerances {
    /// Construct validated tolerances.
    ///
    /// # Errors
    /// - [`OptError::NoTolerancesProvided`] if all three are `None`.
    /// - [`OptError::InvalidTolGrad`] / [`OptError::InvalidTolCost`] for
    ///   non-finite or non-positive tolerances.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == Some(0)`.
    pub fn new(
        tol_grad: Option<f64>, tol_cost: Option<f64>, max_iter: Option<usize>,
    ) -> OptResult<Self> {
        if tol_grad.is_none() && tol_cost.is_none() && max_iter.is_none() {
            return Err(OptError::NoTolerancesProvided);
        }
        verify_tol_cost(tol_cost)?;
        verify_tol_grad(tol_grad)?;
        if let Some(max_iter) = max_iter {
            if max_iter == 0 {
                return Err(OptError::InvalidMaxIter {
                    max_iter,
                    reason: "Maximum iterations must be greater than zero.",
                });
            }
        }
        Ok(Self { tol_grad, tol_cost, max_iter })
    }
}

/// Result returned by `maximize`.
///
/// - `theta_hat`: best parameter vector found.
/// - `value`: best objective value `ℓ(θ̂)` (not the cost).
/// - `converged`: `true` only when the solver met its own convergence
///   criterion or target cost. Hitting the iteration cap is not
///   convergence.
/// - `status`: termination status rendered as text.
/// - `iterations`, `fn_evals`: Argmin counters.
/// - `grad_norm`: norm of the last gradient, when the solver kept one.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimOutcome {
    pub theta_hat: Theta,
    pub value: f64,
    pub converged: bool,
    pub status: String,
    pub iterations: usize,
    pub fn_evals: FnEvalMap,
    pub grad_norm: Option<f64>,
}

impl OptimOutcome {
    /// Build a validated outcome from raw solver state.
    ///
    /// # Errors
    /// - Propagates validation errors for `theta_hat` or `value`.
    pub fn new(
        theta_hat_opt: Option<Theta>, value: f64, termination: TerminationStatus, iterations: u64,
        fn_evals: FnEvalMap, grad: Option<Grad>,
    ) -> OptResult<Self> {
        let theta_hat = validate_theta_hat(theta_hat_opt)?;
        validate_value(value)?;
        let (converged, status) = match &termination {
            TerminationStatus::NotTerminated => (false, "Not terminated".to_string()),
            TerminationStatus::Terminated(reason) => (
                matches!(
                    reason,
                    TerminationReason::SolverConverged | TerminationReason::TargetCostReached
                ),
                format!("{reason:?}"),
            ),
        };
        let iterations = iterations as usize;
        let grad_norm = grad.map(|g| g.l2_norm());
        Ok(Self { theta_hat, value, converged, status, iterations, fn_evals, grad_norm })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Parsing of optimizer names.
    // - Validation in `Tolerances::new` and `MLEOptions::new`.
    // - Mapping of Argmin termination reasons onto `converged`.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Optimizer names parse regardless of case and separators.
    //
    // Given
    // -----
    // - Several spellings of each solver and one unknown name.
    //
    // Expect
    // ------
    // - Known spellings resolve; the unknown name is `InvalidOptimizer`.
    fn optimizer_choice_parses_common_spellings() {
        // Act / Assert
        assert_eq!("nelder-mead".parse::<OptimizerChoice>(), Ok(OptimizerChoice::NelderMead));
        assert_eq!("NelderMead".parse::<OptimizerChoice>(), Ok(OptimizerChoice::NelderMead));
        assert_eq!(
            "lbfgs_more_thuente".parse::<OptimizerChoice>(),
            Ok(OptimizerChoice::LbfgsMoreThuente)
        );
        assert_eq!("HagerZhang".parse::<OptimizerChoice>(), Ok(OptimizerChoice::LbfgsHagerZhang));
        assert!(matches!(
            "newton".parse::<OptimizerChoice>(),
            Err(OptError::InvalidOptimizer { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Tolerances reject empty and non-positive settings.
    //
    // Given
    // -----
    // - All-`None` tolerances, a negative cost tolerance, zero iterations.
    //
    // Expect
    // ------
    // - Each returns the matching `OptError` variant.
    fn tolerances_reject_invalid_settings() {
        // Act / Assert
        assert_eq!(Tolerances::new(None, None, None), Err(OptError::NoTolerancesProvided));
        assert!(matches!(
            Tolerances::new(None, Some(-1.0), None),
            Err(OptError::InvalidTolCost { .. })
        ));
        assert!(matches!(
            Tolerances::new(Some(1e-6), None, Some(0)),
            Err(OptError::InvalidMaxIter { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // `MLEOptions::new` guards L-BFGS memory and the simplex step.
    //
    // Given
    // -----
    // - Valid tolerances with `lbfgs_mem = Some(0)`, then a zero step.
    //
    // Expect
    // ------
    // - `InvalidLBFGSMem` then `InvalidSimplexStep`.
    fn mle_options_validate_memory_and_step() {
        // Arrange
        let tols = Tolerances::new(Some(1e-6), None, Some(10)).expect("Tolerances should be valid");

        // Act
        let bad_mem = MLEOptions::new(tols, OptimizerChoice::LbfgsMoreThuente, false, Some(0), 0.25);
        let bad_step = MLEOptions::new(tols, OptimizerChoice::NelderMead, false, None, 0.0);

        // Assert
        assert!(matches!(bad_mem, Err(OptError::InvalidLBFGSMem { .. })));
        assert!(matches!(bad_step, Err(OptError::InvalidSimplexStep { .. })));
    }

    #[test]
    // Purpose
    // -------
    // Only genuine convergence counts as converged.
    //
    // Given
    // -----
    // - Outcomes terminated by `SolverConverged` and by `MaxItersReached`.
    //
    // Expect
    // ------
    // - `converged` is true for the first and false for the second.
    fn outcome_treats_iteration_cap_as_not_converged() {
        // Arrange
        let theta = array![0.5, -0.5];

        // Act
        let ok = OptimOutcome::new(
            Some(theta.clone()),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::SolverConverged),
            12,
            FnEvalMap::new(),
            None,
        )
        .expect("outcome should build");
        let capped = OptimOutcome::new(
            Some(theta),
            -1.0,
            TerminationStatus::Terminated(TerminationReason::MaxItersReached),
            1000,
            FnEvalMap::new(),
            None,
        )
        .expect("outcome should build");

        // Assert
        assert!(ok.converged);
        assert!(!capped.converged);
        assert_eq!(capped.iterations, 1000);
    }
}
