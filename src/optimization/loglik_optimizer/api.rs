//! High-level entry point for maximizing a user-provided `LogLikelihood`.
//!
//! Dispatches on [`OptimizerChoice`]: L-BFGS with either line search, or
//! Nelder–Mead. The model is wrapped in an `ArgMinAdapter` (which
//! *minimizes* `-ℓ(θ)`) and handed to the matching runner.
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        OptimOutcome, Theta,
        adapter::ArgMinAdapter,
        builders::{
            build_optimizer_hager_zhang, build_optimizer_more_thuente, build_optimizer_nelder_mead,
            initial_simplex,
        },
        run::{run_lbfgs, run_nelder_mead},
        traits::{LogLikelihood, MLEOptions, OptimizerChoice},
    },
};

/// Maximize a log-likelihood `ℓ(θ)` with the solver named in `opts`.
///
/// # Behavior
/// - Validates the initial guess via `f.check(theta0, data)`.
/// - Builds the solver from `opts.optimizer` and runs it.
///
/// # Errors
/// - Propagates errors from `f.check`, the builders and the runners.
///
/// # Example
/// ```no_run
/// use ndarray::{array, Array1};
/// use rust_distance::optimization::errors::OptResult;
/// use rust_distance::optimization::loglik_optimizer::{maximize, LogLikelihood, MLEOptions};
///
/// struct Quadratic;
/// impl LogLikelihood for Quadratic {
///     type Data = ();
///     fn value(&self, theta: &Array1<f64>, _: &()) -> OptResult<f64> {
///         Ok(-theta.dot(theta))
///     }
///     fn check(&self, _: &Array1<f64>, _: &()) -> OptResult<()> {
///         Ok(())
///     }
/// }
///
/// let out = maximize(&Quadratic, array![0.4, -0.3], &(), &MLEOptions::default())?;
/// println!("θ̂ = {:?}", out.theta_hat);
/// # Ok::<(), rust_distance::optimization::errors::OptError>(())
/// ```
pub fn maximize<F: LogLikelihood>(
    f: &F, theta0: Theta, data: &F::Data, opts: &MLEOptions,
) -> OptResult<OptimOutcome> {
    f.check(&theta0, data)?;
    let problem = ArgMinAdapter::new(f, data);
    match opts.optimizer {
        OptimizerChoice::NelderMead => {
            let vertices = initial_simplex(f, &theta0, data, opts.simplex_step)?;
            let solver = build_optimizer_nelder_mead(vertices, opts)?;
            run_nelder_mead(&theta0, opts, problem, solver)
        }
        OptimizerChoice::LbfgsMoreThuente => {
            let solver = build_optimizer_more_thuente(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
        OptimizerChoice::LbfgsHagerZhang => {
            let solver = build_optimizer_hager_zhang(opts)?;
            run_lbfgs(theta0, opts, problem, solver)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::{
        errors::OptError,
        loglik_optimizer::{Cost, traits::Tolerances, types::DEFAULT_SIMPLEX_STEP},
    };
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Each optimizer choice reaching the maximum of a smooth concave
    //   objective.
    // - Rejection of a malformed starting point by `check`.
    // -------------------------------------------------------------------------

    /// ℓ(θ) = -(θ₀ - 1)² - 2(θ₁ + 0.5)², maximized at (1, -0.5).
    struct ShiftedBowl;

    impl LogLikelihood for ShiftedBowl {
        type Data = ();

        fn value(&self, theta: &Theta, _data: &()) -> OptResult<Cost> {
            Ok(-(theta[0] - 1.0).powi(2) - 2.0 * (theta[1] + 0.5).powi(2))
        }

        fn check(&self, theta: &Theta, _data: &()) -> OptResult<()> {
            if theta.len() != 2 {
                return Err(OptError::ThetaLengthMismatch { expected: 2, actual: theta.len() });
            }
            Ok(())
        }
    }

    fn opts(choice: OptimizerChoice) -> MLEOptions {
        let tols = Tolerances::new(Some(1e-8), Some(1e-12), Some(500))
            .expect("Tolerances should be valid");
        MLEOptions::new(tols, choice, false, None, DEFAULT_SIMPLEX_STEP)
            .expect("MLEOptions should be valid")
    }

    #[test]
    // Purpose
    // -------
    // All three solvers find the same maximum and report convergence.
    //
    // Given
    // -----
    // - `ShiftedBowl` from θ₀ = (0, 0).
    //
    // Expect
    // ------
    // - θ̂ ≈ (1, -0.5), ℓ(θ̂) ≈ 0, `converged == true`.
    fn every_optimizer_finds_the_bowl_minimum() {
        for choice in [
            OptimizerChoice::NelderMead,
            OptimizerChoice::LbfgsMoreThuente,
            OptimizerChoice::LbfgsHagerZhang,
        ] {
            // Act
            let out = maximize(&ShiftedBowl, array![0.0, 0.0], &(), &opts(choice))
                .expect("optimization should succeed");

            // Assert
            assert!(out.converged, "{choice:?} did not converge: {}", out.status);
            assert_abs_diff_eq!(out.theta_hat[0], 1.0, epsilon = 1e-3);
            assert_abs_diff_eq!(out.theta_hat[1], -0.5, epsilon = 1e-3);
            assert_abs_diff_eq!(out.value, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    // Purpose
    // -------
    // `check` runs before any solver work.
    //
    // Given
    // -----
    // - A three-element θ₀ for a two-parameter objective.
    //
    // Expect
    // ------
    // - `ThetaLengthMismatch` is returned unchanged.
    fn maximize_rejects_wrong_length_start() {
        // Act
        let out = maximize(&ShiftedBowl, array![0.0, 0.0, 0.0], &(), &opts(OptimizerChoice::NelderMead));

        // Assert
        assert_eq!(out, Err(OptError::ThetaLengthMismatch { expected: 2, actual: 3 }));
    }
}
