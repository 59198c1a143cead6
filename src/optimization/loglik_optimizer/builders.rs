//! loglik_optimizer::builders — solver construction helpers.
//!
//! Purpose
//! -------
//! Build the Argmin solvers behind [`OptimizerChoice`](super::traits::OptimizerChoice)
//! from [`MLEOptions`], so the runner only sees a configured solver.
//!
//! Key behaviors
//! -------------
//! - L-BFGS with Hager–Zhang or More–Thuente line search; gradient and
//!   cost-change tolerances applied by [`configure_lbfgs`].
//! - Nelder–Mead with an axis-aligned initial simplex around `θ₀` of edge
//!   `opts.simplex_step`, stopping on the spread of simplex costs
//!   (`opts.tols.tol_cost`). Each axis vertex steps in whichever direction
//!   scores the higher log-likelihood, so a start on the edge of the
//!   feasible region still gets a simplex with interior vertices.
//!
//! Conventions
//! -----------
//! - L-BFGS builders leave `θ₀` and `max_iters` to the runner. Nelder–Mead
//!   needs its vertices up front because the simplex *is* its initial
//!   state; [`initial_simplex`] builds them.
//! - Argmin configuration errors surface as `OptError` via `From`.
use argmin::solver::quasinewton::LBFGS;

use crate::optimization::{
    errors::OptResult,
    loglik_optimizer::{
        traits::{LogLikelihood, MLEOptions},
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, NelderMeadSimplex, Theta,
        },
    },
};

/// Construct L-BFGS with Hager–Zhang line search.
///
/// # Errors
/// - `OptError` when Argmin rejects a tolerance.
pub fn build_optimizer_hager_zhang(opts: &MLEOptions) -> OptResult<LbfgsHagerZhang> {
    let hager_zhang = HagerZhangLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsHagerZhang::new(hager_zhang, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Construct L-BFGS with More–Thuente line search.
///
/// # Errors
/// - `OptError` when Argmin rejects a tolerance.
pub fn build_optimizer_more_thuente(opts: &MLEOptions) -> OptResult<LbfgsMoreThuente> {
    let more_thuente = MoreThuenteLS::new();
    let mem = opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM);
    let lbfgs = LbfgsMoreThuente::new(more_thuente, mem);
    configure_lbfgs(lbfgs, opts)
}

/// Axis-aligned simplex around `θ₀`: vertex `i + 1` is `θ₀ ± step·eᵢ`,
/// whichever sign gives the higher `ℓ`. Ties keep the `+` step.
///
/// # Errors
/// - Propagates errors from `f.value`.
pub fn initial_simplex<F: LogLikelihood>(
    f: &F, theta0: &Theta, data: &F::Data, step: f64,
) -> OptResult<Vec<Theta>> {
    let mut vertices = Vec::with_capacity(theta0.len() + 1);
    vertices.push(theta0.clone());
    for i in 0..theta0.len() {
        let mut plus = theta0.clone();
        plus[i] += step;
        let mut minus = theta0.clone();
        minus[i] -= step;
        if f.value(&minus, data)? > f.value(&plus, data)? {
            vertices.push(minus);
        } else {
            vertices.push(plus);
        }
    }
    Ok(vertices)
}

/// Construct a Nelder–Mead solver from its initial simplex.
///
/// Parameters
/// ----------
/// - `vertices`: `Vec<Theta>`
///   `dim + 1` vertices, usually from [`initial_simplex`].
/// - `opts`: `&MLEOptions`
///   Consults `tols.tol_cost`, when present, as the standard-deviation
///   tolerance on vertex costs.
///
/// Errors
/// ------
/// - `OptError::InvalidParameter` (via Argmin) for a non-positive or
///   non-finite tolerance.
pub fn build_optimizer_nelder_mead(
    vertices: Vec<Theta>, opts: &MLEOptions,
) -> OptResult<NelderMeadSimplex> {
    let mut solver = NelderMeadSimplex::new(vertices);
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_sd_tolerance(tol)?;
    }
    Ok(solver)
}

/// Apply optional gradient and cost-change tolerances to an L-BFGS solver.
///
/// A `None` tolerance leaves Argmin's default in place.
pub fn configure_lbfgs<L>(
    mut solver: LBFGS<L, Theta, Grad, Cost>, opts: &MLEOptions,
) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    if let Some(g) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(g)?;
    }
    if let Some(c) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(c)?;
    }
    Ok(solver)
}
