//! inference::delta — delta-method standard errors for derived quantities.
use crate::optimization::loglik_optimizer::Theta;
use finitediff::FiniteDiff;
use ndarray::Array2;

/// `SE(h(θ̂)) = √(∇hᵀ Σ ∇h)` with `∇h` by central differences.
///
/// `h` may return `NaN` at infeasible points; the result is then `NaN`.
/// An empty parameter vector gives 0.
pub fn delta_method_se<F: Fn(&Theta) -> f64>(h: &F, theta_hat: &Theta, covariance: &Array2<f64>) -> f64 {
    if theta_hat.is_empty() {
        return 0.0;
    }
    let grad = theta_hat.central_diff(h);
    let variance = grad.dot(&covariance.dot(&grad));
    if variance.is_nan() { variance } else { variance.max(0.0).sqrt() }
}
