//! fitting::start — default starting values for the optimizer.
//!
//! - Log scale from the moment estimate: `√mean(x²)` for lines,
//!   `√(mean(r²)/2)` for points, falling back to `w/2` when the sample
//!   gives nothing positive.
//! - Mixture components are spread geometrically around that estimate, by
//!   factors of two, with equal weights (zero logits).
//! - Log shape `ln 2.5`; covariate and adjustment coefficients zero.
use crate::detection::{layout::ParamLayout, spec::TransectType};

/// Hazard-rate shape used when nothing better is known.
pub const DEFAULT_SHAPE: f64 = 2.5;

/// Moment estimate of the scale from retained distances.
pub fn moment_scale(distances: &[f64], transect: TransectType, truncation: f64) -> f64 {
    let n = distances.len().max(1) as f64;
    let mean_sq = distances.iter().map(|x| x * x).sum::<f64>() / n;
    let sigma = match transect {
        TransectType::Line => mean_sq.sqrt(),
        TransectType::Point => (mean_sq / 2.0).sqrt(),
    };
    if sigma.is_finite() && sigma > 0.0 { sigma } else { truncation / 2.0 }
}

/// Default θ₀ in the unconstrained layout.
pub fn default_start(
    layout: &ParamLayout, distances: &[f64], transect: TransectType, truncation: f64,
) -> Vec<f64> {
    let mut theta = vec![0.0; layout.len()];
    let log_sigma = moment_scale(distances, transect, truncation).ln();
    let m = layout.scale_intercepts.len();
    let centre = (m as f64 - 1.0) / 2.0;
    for (j, slot) in layout.scale_intercepts.clone().enumerate() {
        theta[slot] = log_sigma + (j as f64 - centre) * std::f64::consts::LN_2;
    }
    if let Some(slot) = layout.shape_intercept {
        theta[slot] = DEFAULT_SHAPE.ln();
    }
    theta
}
