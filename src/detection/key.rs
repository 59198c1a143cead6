//! detection::key — key functions of the detection curve.
//!
//! Purpose
//! -------
//! Define the three key shapes and their pointwise values and, where they
//! exist, closed-form integrals over `[0, u]`.
//!
//! Key behaviors
//! -------------
//! - Half-normal `k(x; σ) = exp(-x²/(2σ²))`.
//! - Hazard-rate `k(x; σ, b) = 1 - exp(-(x/σ)^(-b))`, with `k(0) = 1`
//!   taken as the limit.
//! - Uniform `k(x) = 1` on `[0, w]`; its normalized form is constant.
//!
//! Invariants & assumptions
//! ------------------------
//! - `k(0) = 1` exactly for every key, so ratios against `k(0)` introduce
//!   no rounding at the origin.
//! - Callers validate `σ > 0`, `b > 0` before evaluating.
use crate::errors::DomainError;
use crate::numerics::erf;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, SQRT_2};
use std::str::FromStr;

/// Key function family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyKind {
    HalfNormal,
    HazardRate,
    Uniform,
}

impl KeyKind {
    /// Short label used in model names: `hn`, `hr`, `unif`.
    pub fn label(&self) -> &'static str {
        match self {
            KeyKind::HalfNormal => "hn",
            KeyKind::HazardRate => "hr",
            KeyKind::Uniform => "unif",
        }
    }

    /// Whether the key has a scale parameter σ.
    pub fn has_scale(&self) -> bool {
        !matches!(self, KeyKind::Uniform)
    }

    /// Whether the key has a shape parameter b.
    pub fn has_shape(&self) -> bool {
        matches!(self, KeyKind::HazardRate)
    }
}

impl std::fmt::Display for KeyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for KeyKind {
    type Err = DomainError;

    /// Accepts `hn`/`half-normal`, `hr`/`hazard-rate`, `unif`/`uniform`,
    /// case-insensitive, with `-`, `_` or nothing between words.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| *c != '-' && *c != '_').collect::<String>().to_lowercase();
        match normalized.as_str() {
            "hn" | "halfnormal" => Ok(KeyKind::HalfNormal),
            "hr" | "hazardrate" | "hazard" => Ok(KeyKind::HazardRate),
            "unif" | "uniform" => Ok(KeyKind::Uniform),
            _ => Err(DomainError::UnknownKey { name: s.to_string() }),
        }
    }
}

/// Half-normal key value.
#[inline]
pub fn half_normal(x: f64, sigma: f64) -> f64 {
    let z = x / sigma;
    (-0.5 * z * z).exp()
}

/// Hazard-rate key value; `x ≤ 0` returns exactly 1.
#[inline]
pub fn hazard_rate(x: f64, sigma: f64, shape: f64) -> f64 {
    if x <= 0.0 {
        return 1.0;
    }
    -(-(x / sigma).powf(-shape)).exp_m1()
}

/// `∫₀ᵘ exp(-t²/(2σ²)) dt = σ √(π/2) erf(u / (σ√2))`.
pub fn half_normal_line_integral(sigma: f64, upper: f64) -> f64 {
    sigma * FRAC_PI_2.sqrt() * erf(upper / (sigma * SQRT_2))
}

/// `∫₀ᵘ t exp(-t²/(2σ²)) dt = σ² (1 - exp(-u²/(2σ²)))`.
pub fn half_normal_point_integral(sigma: f64, upper: f64) -> f64 {
    let z = upper / sigma;
    -sigma * sigma * (-0.5 * z * z).exp_m1()
}
