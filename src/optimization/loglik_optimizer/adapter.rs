//! Adapter exposing a `LogLikelihood` as an Argmin problem.
//!
//! Maximizing `ℓ(θ)` becomes minimizing `c(θ) = -ℓ(θ)`. Analytic gradients
//! are negated; otherwise the **cost** closure is finite-differenced, so no
//! sign flip is needed on that branch.
use std::cell::RefCell;

use crate::optimization::{
    errors::OptError,
    loglik_optimizer::{
        finite_diff::run_fd_diff,
        traits::LogLikelihood,
        types::{Cost, Grad, Theta},
        validation::validate_grad,
    },
};
use argmin::core::{CostFunction, Error, Gradient};
use finitediff::FiniteDiff;

/// Bridges a [`LogLikelihood`] and its data to Argmin's `CostFunction` and
/// `Gradient`.
#[derive(Debug, Clone)]
pub struct ArgMinAdapter<'a, F: LogLikelihood> {
    pub f: &'a F,
    pub data: &'a F::Data,
}

impl<'a, F: LogLikelihood> ArgMinAdapter<'a, F> {
    pub fn new(f: &'a F, data: &'a F::Data) -> Self {
        Self { f, data }
    }
}

impl<'a, F: LogLikelihood> CostFunction for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Output = Cost;

    /// `c(θ) = -ℓ(θ)`; a non-finite `ℓ` is reported as `NonFiniteCost`.
    fn cost(&self, theta: &Self::Param) -> Result<Self::Output, Error> {
        let output = self.f.value(theta, self.data)?;
        if !output.is_finite() {
            return Err((OptError::NonFiniteCost { value: output }).into());
        }
        Ok(-output)
    }
}

impl<'a, F: LogLikelihood> Gradient for ArgMinAdapter<'a, F> {
    type Param = Theta;
    type Gradient = Grad;

    /// Gradient of the cost.
    ///
    /// - Analytic `∇ℓ` is validated and negated.
    /// - Without one, central differences of the cost are tried first; a
    ///   failed cost evaluation or a non-finite entry triggers one forward
    ///   difference retry via [`run_fd_diff`].
    ///
    /// The FD closure must return `f64`, so the first cost error is parked
    /// in `closure_err` and the closure returns `NaN`.
    fn gradient(&self, theta: &Self::Param) -> Result<Self::Gradient, Error> {
        let dim = theta.len();
        match self.f.grad(theta, self.data) {
            Ok(g) => {
                validate_grad(&g, dim)?;
                Ok(-g)
            }
            Err(OptError::GradientNotImplemented) => {
                let closure_err: RefCell<Option<Error>> = RefCell::new(None);
                let cost_func = |theta: &Theta| -> f64 {
                    match self.cost(theta) {
                        Ok(val) => val,
                        Err(e) => {
                            let mut slot = closure_err.borrow_mut();
                            if slot.is_none() {
                                *slot = Some(e);
                            }
                            f64::NAN
                        }
                    }
                };
                let central = theta.central_diff(&cost_func);
                let central_failed = closure_err.borrow().is_some();
                if !central_failed && validate_grad(&central, dim).is_ok() {
                    return Ok(central);
                }
                Ok(run_fd_diff(theta, &cost_func, &closure_err)?)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::errors::OptResult;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Sign convention of the cost.
    // - Finite-difference gradient of the cost when no analytic gradient
    //   exists.
    // -------------------------------------------------------------------------

    struct Parabola;

    impl LogLikelihood for Parabola {
        type Data = f64;

        fn value(&self, theta: &Theta, center: &f64) -> OptResult<Cost> {
            Ok(-(theta[0] - center).powi(2))
        }

        fn check(&self, _theta: &Theta, _center: &f64) -> OptResult<()> {
            Ok(())
        }
    }

    #[test]
    // Purpose
    // -------
    // The adapter negates the log-likelihood and differentiates the cost.
    //
    // Given
    // -----
    // - ℓ(θ) = -(θ - 2)² evaluated at θ = 3.
    //
    // Expect
    // ------
    // - cost = 1 and ∂cost/∂θ ≈ 2.
    fn adapter_negates_value_and_differentiates_cost() {
        // Arrange
        let center = 2.0;
        let adapter = ArgMinAdapter::new(&Parabola, &center);
        let theta = array![3.0];

        // Act
        let cost = adapter.cost(&theta).expect("cost should evaluate");
        let grad = adapter.gradient(&theta).expect("gradient should evaluate");

        // Assert
        assert_abs_diff_eq!(cost, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grad[0], 2.0, epsilon = 1e-5);
    }
}
