//! goodness_of_fit::statistics — Kolmogorov–Smirnov and Cramér–von Mises
//! tests of a fitted detection function.
//!
//! Purpose
//! -------
//! Measure how far the model CDF of the retained distances departs from
//! their empirical CDF, without binning.
//!
//! Key behaviors
//! -------------
//! - [`ks_test`]: `D = maxᵢ max(|cᵢ − i/n|, |cᵢ − (i−1)/n|)`; p-value from the
//!   asymptotic Kolmogorov distribution at `λ = (√n + 0.12 + 0.11/√n) D`.
//! - [`cvm_test`]: `W² = Σ (cᵢ − (2i−1)/(2n))² + 1/(12n)`; p-value
//!   `1 − A(W²)` with the four-term Anderson–Darling series.
//! - [`goodness_of_fit`]: both tests on a [`FittedModel`], each observation
//!   evaluated under its own covariate curve.
//!
//! Invariants & assumptions
//! ------------------------
//! - `cᵢ` are sorted ascending before either statistic is formed.
//! - p-values are clamped to `[0, 1]`.
//! - Parameters are estimated from the same data, so the asymptotic
//!   p-values are conservative.
use crate::errors::DsResult;
use crate::fitting::FittedModel;
use crate::goodness_of_fit::validation::validate_cdf_values;
use crate::numerics::{cramer_von_mises_cdf, kolmogorov_survival};

/// Statistic and p-value of one EDF test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestOutcome {
    statistic: f64,
    p_value: f64,
}

impl TestOutcome {
    pub fn statistic(&self) -> f64 {
        self.statistic
    }

    pub fn p_value(&self) -> f64 {
        self.p_value
    }
}

/// Both EDF tests for one fitted model.
///
/// `pairs` holds `(i/n, cᵢ)` with `cᵢ` sorted ascending, ready for a
/// Q–Q style comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct GoodnessOfFit {
    pub ks_statistic: f64,
    pub ks_p_value: f64,
    pub cvm_statistic: f64,
    pub cvm_p_value: f64,
    pub n: usize,
    pub pairs: Vec<(f64, f64)>,
}

/// Kolmogorov–Smirnov test of model CDF values against `U(0, 1)`.
///
/// # Errors
/// - `TooFewForGof` for fewer than two values.
/// - `InvalidCdfValue` for non-finite values or values outside `[0, 1]`.
pub fn ks_test(cdf_values: &[f64]) -> DsResult<TestOutcome> {
    validate_cdf_values(cdf_values)?;
    Ok(ks_sorted(&sorted(cdf_values)))
}

/// Cramér–von Mises test of model CDF values against `U(0, 1)`.
///
/// # Errors
/// - As [`ks_test`].
pub fn cvm_test(cdf_values: &[f64]) -> DsResult<TestOutcome> {
    validate_cdf_values(cdf_values)?;
    Ok(cvm_sorted(&sorted(cdf_values)))
}

/// KS and CvM tests on the retained observations of `model`.
///
/// # Errors
/// - `TooFewForGof` when the model retained fewer than two observations.
/// - Curve errors when a covariate curve cannot be rebuilt.
///
/// # Examples
/// ```rust
/// # use rust_distance::data::ObservationSet;
/// # use rust_distance::detection::{ModelSpec, TransectType};
/// # use rust_distance::fitting::{FitControl, fit};
/// # use rust_distance::goodness_of_fit::goodness_of_fit;
/// let data = ObservationSet::from_distances([12.0, 45.0, 78.0, 130.0, 210.0]).unwrap();
/// let model = fit(&data, &ModelSpec::half_normal(), TransectType::Line, Some(200.0), &FitControl::default()).unwrap();
/// let gof = goodness_of_fit(&model).unwrap();
/// assert!((0.0..=1.0).contains(&gof.ks_p_value));
/// ```
pub fn goodness_of_fit(model: &FittedModel) -> DsResult<GoodnessOfFit> {
    let cdf_values = model.cdf_values()?;
    validate_cdf_values(&cdf_values)?;
    let c = sorted(&cdf_values);
    let n = c.len();
    let ks = ks_sorted(&c);
    let cvm = cvm_sorted(&c);
    let pairs = c.iter().enumerate().map(|(i, &ci)| ((i + 1) as f64 / n as f64, ci)).collect();
    Ok(GoodnessOfFit {
        ks_statistic: ks.statistic,
        ks_p_value: ks.p_value,
        cvm_statistic: cvm.statistic,
        cvm_p_value: cvm.p_value,
        n,
        pairs,
    })
}

// ---- Helper methods ----

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut c = values.to_vec();
    c.sort_by(f64::total_cmp);
    c
}

fn ks_sorted(c: &[f64]) -> TestOutcome {
    let n = c.len() as f64;
    let statistic = c.iter().enumerate().fold(0.0_f64, |d, (i, &ci)| {
        let upper = (ci - (i + 1) as f64 / n).abs();
        let lower = (ci - i as f64 / n).abs();
        d.max(upper).max(lower)
    });
    let root_n = n.sqrt();
    let lambda = (root_n + 0.12 + 0.11 / root_n) * statistic;
    TestOutcome { statistic, p_value: kolmogorov_survival(lambda).clamp(0.0, 1.0) }
}

fn cvm_sorted(c: &[f64]) -> TestOutcome {
    let n = c.len() as f64;
    let statistic = c
        .iter()
        .enumerate()
        .map(|(i, &ci)| (ci - (2.0 * i as f64 + 1.0) / (2.0 * n)).powi(2))
        .sum::<f64>()
        + 1.0 / (12.0 * n);
    TestOutcome { statistic, p_value: (1.0 - cramer_von_mises_cdf(statistic)).clamp(0.0, 1.0) }
}
