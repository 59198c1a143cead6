//! selection::ranking — AIC ranking of fitted detection functions.
//!
//! Purpose
//! -------
//! Order candidate fits of the same data by AIC and report ΔAIC, Akaike
//! weights and an advisory "not justified" flag.
//!
//! Key behaviors
//! -------------
//! - Ascending AIC; ties fall back to fewer parameters, then label, then
//!   input position. Distinct models therefore rank the same whatever the
//!   input order.
//! - [`TieBreakPolicy::FlagNotJustified`] flags a model when another model
//!   has exactly one parameter fewer and `|ΔAIC| < threshold`. Nothing is
//!   dropped.
//! - Fits with different truncations, transect types or retained sample
//!   sizes are rejected with `IncomparableModelsError`.
use crate::errors::{DsResult, IncomparableModelsError};
use crate::fitting::FittedModel;
use std::borrow::Borrow;
use tracing::debug;

/// Relative tolerance for equal truncation distances.
pub const TRUNCATION_RTOL: f64 = 1e-9;

/// Default `|ΔAIC|` threshold for the not-justified flag.
pub const DEFAULT_AIC_THRESHOLD: f64 = 2.0;

/// How near-ties between nested-size models are reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TieBreakPolicy {
    /// Flag the larger model when `|ΔAIC| < threshold` and it has exactly
    /// one more parameter.
    FlagNotJustified { threshold: f64 },
    Off,
}

impl Default for TieBreakPolicy {
    fn default() -> Self {
        TieBreakPolicy::FlagNotJustified { threshold: DEFAULT_AIC_THRESHOLD }
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedModel {
    /// Position of the model in the input slice.
    pub index: usize,
    pub label: String,
    pub n_params: usize,
    pub aic: f64,
    /// AIC minus the best AIC.
    pub delta_aic: f64,
    /// Akaike weight `exp(−Δ/2) / Σ exp(−Δ/2)`.
    pub weight: f64,
    pub not_justified: bool,
}

/// Rank with the default policy.
///
/// # Errors
/// - `IncomparableModelsError` when the fits cannot be compared.
pub fn compare<M: Borrow<FittedModel>>(models: &[M]) -> DsResult<Vec<RankedModel>> {
    compare_with_policy(models, TieBreakPolicy::default())
}

/// Rank `models` by AIC under `policy`.
///
/// An empty slice gives an empty ranking.
///
/// # Errors
/// - `TruncationMismatch` when truncations differ beyond
///   [`TRUNCATION_RTOL`].
/// - `TransectMismatch` when line and point fits are mixed.
/// - `SampleSizeMismatch` when retained sample sizes differ.
pub fn compare_with_policy<M: Borrow<FittedModel>>(
    models: &[M], policy: TieBreakPolicy,
) -> DsResult<Vec<RankedModel>> {
    let Some(first) = models.first().map(Borrow::borrow) else {
        return Ok(Vec::new());
    };
    for other in models.iter().skip(1).map(Borrow::borrow) {
        check_comparable(first, other)?;
    }
    let candidates = models
        .iter()
        .enumerate()
        .map(|(index, m)| {
            let m = m.borrow();
            Candidate { index, label: m.label().to_string(), n_params: m.k(), aic: m.aic() }
        })
        .collect();
    Ok(rank(candidates, policy))
}

fn check_comparable(first: &FittedModel, other: &FittedModel) -> Result<(), IncomparableModelsError> {
    let (a, b) = (first.truncation(), other.truncation());
    if (a - b).abs() > TRUNCATION_RTOL * a.abs().max(b.abs()) {
        return Err(IncomparableModelsError::TruncationMismatch { first: a, second: b });
    }
    if first.transect() != other.transect() {
        return Err(IncomparableModelsError::TransectMismatch);
    }
    if first.n() != other.n() {
        return Err(IncomparableModelsError::SampleSizeMismatch { first: first.n(), second: other.n() });
    }
    Ok(())
}

#[derive(Debug, Clone)]
struct Candidate {
    index: usize,
    label: String,
    n_params: usize,
    aic: f64,
}

fn rank(mut candidates: Vec<Candidate>, policy: TieBreakPolicy) -> Vec<RankedModel> {
    candidates.sort_by(|a, b| {
        a.aic
            .total_cmp(&b.aic)
            .then(a.n_params.cmp(&b.n_params))
            .then_with(|| a.label.cmp(&b.label))
            .then(a.index.cmp(&b.index))
    });
    let best = candidates.first().map_or(0.0, |c| c.aic);
    let relative: Vec<f64> = candidates.iter().map(|c| (-(c.aic - best) / 2.0).exp()).collect();
    let total: f64 = relative.iter().sum();

    candidates
        .iter()
        .zip(&relative)
        .map(|(c, &r)| {
            let not_justified = match policy {
                TieBreakPolicy::FlagNotJustified { threshold } => {
                    let flagged = candidates.iter().any(|o| {
                        o.n_params + 1 == c.n_params && (c.aic - o.aic).abs() < threshold
                    });
                    if flagged {
                        debug!(model = %c.label, aic = c.aic, threshold, "extra parameter not justified by AIC");
                    }
                    flagged
                }
                TieBreakPolicy::Off => false,
            };
            RankedModel {
                index: c.index,
                label: c.label.clone(),
                n_params: c.n_params,
                aic: c.aic,
                delta_aic: c.aic - best,
                weight: if total > 0.0 { r / total } else { f64::NAN },
                not_justified,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ObservationSet;
    use crate::detection::spec::{ModelSpec, TransectType};
    use crate::errors::DsError;
    use crate::fitting::{FitControl, fit};
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use std::sync::OnceLock;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Ordering, ΔAIC and weights on synthetic candidates.
    // - The not-justified flag and its `Off` policy.
    // - Rejection of incomparable fits.
    // - Order independence over permutations of real fits.
    // -------------------------------------------------------------------------

    fn candidate(index: usize, label: &str, n_params: usize, aic: f64) -> Candidate {
        Candidate { index, label: label.to_string(), n_params, aic }
    }

    fn fitted_candidates() -> &'static Vec<FittedModel> {
        static MODELS: OnceLock<Vec<FittedModel>> = OnceLock::new();
        MODELS.get_or_init(|| {
            let data = ObservationSet::from_distances([
                2.0, 5.0, 7.5, 9.0, 12.0, 15.0, 18.5, 21.0, 26.0, 33.0, 41.0, 55.0,
            ])
            .expect("valid distances");
            let control = FitControl::default();
            [ModelSpec::half_normal(), ModelSpec::uniform(), ModelSpec::hazard_rate()]
                .iter()
                .map(|spec| fit(&data, spec, TransectType::Line, Some(60.0), &control).expect("fit should succeed"))
                .collect()
        })
    }

    #[test]
    // Purpose
    // -------
    // Candidates are ordered by AIC with ΔAIC and weights attached.
    //
    // Given
    // -----
    // - AICs 104, 100, 100 with 2, 2, 1 parameters.
    //
    // Expect
    // ------
    // - Order: the 1-parameter tie first, then the 2-parameter tie, then
    //   104; weights sum to 1 and the first two are equal.
    fn ranking_orders_by_aic_then_parameters() {
        // Arrange
        let candidates = vec![
            candidate(0, "hr", 2, 104.0),
            candidate(1, "hn+cos(2)", 2, 100.0),
            candidate(2, "hn", 1, 100.0),
        ];

        // Act
        let ranked = rank(candidates, TieBreakPolicy::Off);

        // Assert
        let order: Vec<usize> = ranked.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert_eq!(ranked[2].delta_aic, 4.0);
        assert_relative_eq!(ranked.iter().map(|r| r.weight).sum::<f64>(), 1.0, max_relative = 1e-12);
        assert_relative_eq!(ranked[0].weight, ranked[1].weight);
        assert!(ranked.iter().all(|r| !r.not_justified));
    }

    #[test]
    // Purpose
    // -------
    // The flag marks only the larger model of a near-tie one parameter
    // apart.
    //
    // Given
    // -----
    // - hn (k=1, 100.0), hn+cos(2) (k=2, 99.0), hn+cos(2,3) (k=3, 96.5).
    //
    // Expect
    // ------
    // - hn+cos(2) flagged (|Δ| = 1 < 2 against hn); hn+cos(2,3) not
    //   (|Δ| = 2.5 against hn+cos(2)); hn not.
    fn flag_marks_larger_model_of_near_tie() {
        // Arrange
        let candidates = vec![
            candidate(0, "hn", 1, 100.0),
            candidate(1, "hn+cos(2)", 2, 99.0),
            candidate(2, "hn+cos(2,3)", 3, 96.5),
        ];

        // Act
        let ranked = rank(candidates, TieBreakPolicy::default());

        // Assert
        let flag = |label: &str| ranked.iter().find(|r| r.label == label).map(|r| r.not_justified);
        assert_eq!(flag("hn"), Some(false));
        assert_eq!(flag("hn+cos(2)"), Some(true));
        assert_eq!(flag("hn+cos(2,3)"), Some(false));
    }

    #[test]
    // Purpose
    // -------
    // Fits of differently truncated data cannot be ranked.
    //
    // Given
    // -----
    // - Half-normal fits to the same distances at w = 150 and w = 82.5.
    //
    // Expect
    // ------
    // - `TruncationMismatch`; an empty slice ranks to nothing.
    fn differing_truncations_are_incomparable() {
        // Arrange
        let data = ObservationSet::from_distances([12.0, 45.0, 78.0, 130.0, 210.0]).expect("valid distances");
        let control = FitControl::default();
        let wide = fit(&data, &ModelSpec::half_normal(), TransectType::Line, Some(150.0), &control)
            .expect("fit at 150");
        let narrow = fit(&data, &ModelSpec::half_normal(), TransectType::Line, Some(82.5), &control)
            .expect("fit at 82.5");

        // Act
        let result = compare(&[wide, narrow]);

        // Assert
        assert!(matches!(
            result,
            Err(DsError::IncomparableModels(IncomparableModelsError::TruncationMismatch { .. }))
        ));
        let empty: [&FittedModel; 0] = [];
        assert_eq!(compare(&empty).expect("empty ranking"), vec![]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        // Purpose
        // -------
        // The ranking of distinct models does not depend on input order.
        //
        // Given
        // -----
        // - Half-normal, uniform and hazard-rate fits, permuted.
        //
        // Expect
        // ------
        // - Identical label order, ΔAIC and flags for every permutation.
        fn ranking_is_order_independent(perm in Just(vec![0usize, 1, 2]).prop_shuffle()) {
            // Arrange
            let models = fitted_candidates();
            let permuted: Vec<&FittedModel> = perm.iter().map(|&i| &models[i]).collect();
            let reference: Vec<&FittedModel> = models.iter().collect();

            // Act
            let a = compare(&reference).expect("comparable");
            let b = compare(&permuted).expect("comparable");

            // Assert
            let key = |r: &RankedModel| (r.label.clone(), r.delta_aic, r.not_justified);
            prop_assert_eq!(a.iter().map(key).collect::<Vec<_>>(), b.iter().map(key).collect::<Vec<_>>());
        }
    }
}
