//! Execution helpers that run an Argmin solver on a log-likelihood problem
//! and return a crate-friendly [`OptimOutcome`].
use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        Grad, LogLikelihood, MLEOptions, OptimOutcome, Theta, adapter::ArgMinAdapter,
    },
};
use argmin::core::{CostFunction, Executor, IterState, Solver, State};

/// Run a gradient-based solver (L-BFGS) on `problem` starting from `theta0`.
///
/// Wires the initial parameter, the iteration cap and, with the `obs_slog`
/// feature and `opts.verbose`, a terminal slog observer. The final state is
/// converted into an [`OptimOutcome`] with `value = -best_cost`.
///
/// # Errors
/// - Argmin runtime errors (line-search failures, errors raised by the
///   objective) via `From<argmin::core::Error>`.
/// - Validation errors when building the outcome.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, Grad, (), (), (), f64>> + Send + 'static,
{
    log_initial_state(&theta0, &problem, opts);
    let mut optimizer = Executor::new(problem, solver);
    optimizer = optimizer.configure(|state| state.param(theta0));
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    let grad = result.take_gradient();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        grad,
    )
}

/// Run a derivative-free solver (Nelder–Mead) on `problem`.
///
/// The initial simplex is already embedded in `solver`, so no parameter is
/// set on the state. Gradient norm is always `None` in the outcome.
///
/// # Errors
/// Same as [`run_lbfgs`].
pub fn run_nelder_mead<'a, F, S>(
    theta0: &Theta, opts: &MLEOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: LogLikelihood,
    S: Solver<ArgMinAdapter<'a, F>, IterState<Theta, (), (), (), (), f64>> + Send + 'static,
{
    log_initial_state(theta0, &problem, opts);
    let mut optimizer = Executor::new(problem, solver);
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        optimizer = optimizer.add_observer(observer, argmin::core::observers::ObserverMode::Always);
    }
    if let Some(max_iter) = opts.tols.max_iter {
        optimizer = optimizer.configure(|state| state.max_iters(max_iter as u64));
    }

    let mut result = optimizer.run()?.state().clone();
    let iterations = result.get_iter();
    let function_counts = result.get_func_counts().clone();
    let termination = result.get_termination_status().clone();
    OptimOutcome::new(
        result.take_best_param(),
        -result.get_best_cost(),
        termination,
        iterations,
        function_counts,
        None,
    )
}

// ---- Helper Methods ----

fn log_initial_state<F>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>, opts: &MLEOptions)
where
    F: LogLikelihood,
{
    if !opts.verbose {
        return;
    }
    match problem.cost(theta0) {
        Ok(cost) => tracing::debug!(loglik = -cost, dim = theta0.len(), "optimizer start"),
        Err(err) => tracing::debug!(error = %err, "optimizer start: objective failed at theta0"),
    }
}
