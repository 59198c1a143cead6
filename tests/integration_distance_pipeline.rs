//! Integration tests for detection-function fitting and model selection.
//!
//! Purpose
//! -------
//! - Validate the end-to-end pipeline: simulated or field distances, MLE
//!   fitting, detection probability, goodness of fit and AIC ranking.
//! - Exercise realistic sample sizes and truncations rather than toy edge
//!   cases only.
//!
//! Coverage
//! --------
//! - `simulation::simulate_distances` feeding `fitting::fit`.
//! - `fitting::FittedModel` accessors, `evaluate` and
//!   `average_detection_probability`.
//! - `goodness_of_fit::goodness_of_fit` on a fitted model.
//! - `selection::compare` over comparable and incomparable fits.
//! - `config::FitConfig` driving a fit from TOML.
//!
//! Exclusions
//! ----------
//! - Low-level key, adjustment and quadrature checks; those are unit tests.
//! - Python bindings.
use approx::assert_relative_eq;
use rust_distance::{
    DsError, FitConfig, FitControl, FittedModel, ModelSpec, ObservationSet, TransectType,
    average_detection_probability, compare, evaluate, fit, goodness_of_fit,
    detection::{AdjustmentKind, AdjustmentSpec, DetectionCurve, KeyKind},
    errors::{DegenerateDataError, IncomparableModelsError},
    simulation::{SimOpts, simulate_distances},
};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a test-writer subscriber once; `RUST_LOG` controls verbosity.
fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Simulate `n` half-normal distances with scale `sigma`, truncated at `w`.
fn simulated_half_normal(sigma: f64, w: f64, transect: TransectType, n: usize, seed: u64) -> ObservationSet {
    let curve = DetectionCurve::half_normal(sigma, w).expect("valid half-normal curve");
    let distances =
        simulate_distances(&curve, transect, n, SimOpts::seeded(seed)).expect("simulation should succeed");
    ObservationSet::from_distances(distances).expect("simulated distances are valid")
}

fn fit_default(data: &ObservationSet, spec: &ModelSpec, transect: TransectType, w: f64) -> FittedModel {
    fit(data, spec, transect, Some(w), &FitControl::default()).expect("fit should succeed")
}

#[test]
// Purpose
// -------
// Half-normal fits recover the simulating scale across seeds.
//
// Given
// -----
// - σ₀ = 50, w = 200, line transects, n = 2000, 20 seeds.
//
// Expect
// ------
// - σ̂ within 5% of σ₀ in at least 19 of 20 trials; every fit converged.
fn half_normal_scale_is_recovered_from_simulated_lines() {
    init_tracing();
    // Arrange
    let (sigma, w) = (50.0, 200.0);
    let spec = ModelSpec::half_normal();

    // Act
    let estimates: Vec<(bool, f64)> = (0..20u64)
        .map(|seed| {
            let data = simulated_half_normal(sigma, w, TransectType::Line, 2000, 1000 + seed);
            let model = fit_default(&data, &spec, TransectType::Line, w);
            (model.converged(), model.scales()[0])
        })
        .collect();

    // Assert
    assert!(estimates.iter().all(|(converged, _)| *converged));
    let close = estimates.iter().filter(|(_, s)| ((s - sigma) / sigma).abs() < 0.05).count();
    assert!(close >= 19, "only {close} of 20 estimates within 5%: {estimates:?}");
}

#[test]
// Purpose
// -------
// Point-transect fits recover the scale and report a consistent P̂a.
//
// Given
// -----
// - σ₀ = 50, w = 150, point transects, n = 1500, seed 77.
//
// Expect
// ------
// - σ̂ within 10% of σ₀.
// - P̂a within 10% of the true curve's P_a and strictly inside (0, 1).
fn half_normal_scale_is_recovered_from_simulated_points() {
    init_tracing();
    // Arrange
    let (sigma, w) = (50.0, 150.0);
    let data = simulated_half_normal(sigma, w, TransectType::Point, 1500, 77);
    let truth = DetectionCurve::half_normal(sigma, w)
        .expect("valid curve")
        .detection_probability(TransectType::Point);

    // Act
    let model = fit_default(&data, &ModelSpec::half_normal(), TransectType::Point, w);

    // Assert
    assert_relative_eq!(model.scales()[0], sigma, max_relative = 0.10);
    let (pa, se) = average_detection_probability(&model);
    assert!(pa > 0.0 && pa < 1.0);
    assert_relative_eq!(pa, truth, max_relative = 0.10);
    assert!(se.is_finite() && se > 0.0);
}

#[test]
// Purpose
// -------
// A small field sample runs through fit, P̂a and goodness of fit.
//
// Given
// -----
// - Distances [12, 45, 78, 130, 210], half-normal, w = 200 (210 dropped).
//
// Expect
// ------
// - Converged fit on n = 4 with 0 < P̂a < 1.
// - Finite KS and CvM statistics with p-values in [0, 1].
fn field_sample_fits_and_passes_through_goodness_of_fit() {
    init_tracing();
    // Arrange
    let data = ObservationSet::from_distances([12.0, 45.0, 78.0, 130.0, 210.0]).expect("valid distances");

    // Act
    let model = fit_default(&data, &ModelSpec::half_normal(), TransectType::Line, 200.0);
    let gof = goodness_of_fit(&model).expect("goodness of fit on 4 distances");

    // Assert
    assert!(model.converged());
    assert_eq!(model.n(), 4);
    let pa = model.detection_probability();
    assert!(pa > 0.0 && pa < 1.0, "P̂a = {pa}");
    assert!(gof.ks_statistic.is_finite() && gof.cvm_statistic.is_finite());
    assert!((0.0..=1.0).contains(&gof.ks_p_value));
    assert!((0.0..=1.0).contains(&gof.cvm_p_value));
    assert_eq!(gof.n, 4);
}

#[test]
// Purpose
// -------
// Fits at different truncation distances are never ranked together.
//
// Given
// -----
// - The same distances fitted at w = 150 and w = 82.5.
//
// Expect
// ------
// - `IncomparableModels(TruncationMismatch)`.
fn differently_truncated_fits_are_incomparable() {
    init_tracing();
    // Arrange
    let data = ObservationSet::from_distances([3.0, 9.0, 14.0, 22.0, 31.0, 40.0, 52.0, 66.0, 80.0, 97.0, 120.0])
        .expect("valid distances");
    let wide = fit_default(&data, &ModelSpec::half_normal(), TransectType::Line, 150.0);
    let narrow = fit_default(&data, &ModelSpec::half_normal(), TransectType::Line, 82.5);

    // Act
    let result = compare(&[&wide, &narrow]);

    // Assert
    assert!(matches!(
        result,
        Err(DsError::IncomparableModels(IncomparableModelsError::TruncationMismatch { .. }))
    ));
}

#[test]
// Purpose
// -------
// A hazard-rate model cannot be fitted to a single distance.
//
// Given
// -----
// - One distance, hazard-rate key (two parameters).
//
// Expect
// ------
// - `DegenerateData(TooFewObservations { n: 1, k: 2 })`.
fn single_observation_hazard_rate_is_degenerate() {
    init_tracing();
    // Arrange
    let data = ObservationSet::from_distances([17.0]).expect("valid distance");

    // Act
    let result = fit(&data, &ModelSpec::hazard_rate(), TransectType::Line, Some(50.0), &FitControl::default());

    // Assert
    assert!(matches!(
        result,
        Err(DsError::DegenerateData(DegenerateDataError::TooFewObservations { n: 1, k: 2 }))
    ));
}

#[test]
// Purpose
// -------
// Repeated fits of the same input evaluate bit-identically.
//
// Given
// -----
// - Two independent hazard-rate fits of one simulated sample.
//
// Expect
// ------
// - Identical θ̂ bits and identical `g(x)` bits on a grid over [0, w].
fn repeated_fits_evaluate_bit_identically() {
    init_tracing();
    // Arrange
    let w = 120.0;
    let data = simulated_half_normal(40.0, w, TransectType::Line, 300, 5);
    let spec = ModelSpec::hazard_rate();

    // Act
    let first = fit_default(&data, &spec, TransectType::Line, w);
    let second = fit_default(&data, &spec, TransectType::Line, w);

    // Assert
    let bits = |m: &FittedModel| m.theta_hat().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));
    for i in 0..=24 {
        let x = w * i as f64 / 24.0;
        let a = evaluate(&first, x).expect("x inside [0, w]");
        let b = evaluate(&second, x).expect("x inside [0, w]");
        assert_eq!(a.to_bits(), b.to_bits(), "g({x}) differs");
    }
}

#[test]
// Purpose
// -------
// Ranking a candidate set does not depend on its order.
//
// Given
// -----
// - hn, hr, uniform + cos(1) and hn + cos(2) fitted to one simulated sample,
//   ranked forwards and reversed.
//
// Expect
// ------
// - Same labels, ΔAIC and flags in the same order; best ΔAIC is 0 and
//   weights sum to 1.
fn model_ranking_is_order_independent() {
    init_tracing();
    // Arrange
    let w = 150.0;
    let data = simulated_half_normal(45.0, w, TransectType::Line, 400, 21);
    let specs = [
        ModelSpec::half_normal(),
        ModelSpec::hazard_rate(),
        ModelSpec::uniform().with_adjustment(AdjustmentSpec::with_terms(
            AdjustmentKind::Cosine,
            KeyKind::Uniform,
            1,
        )),
        ModelSpec::half_normal().with_adjustment(AdjustmentSpec::with_terms(
            AdjustmentKind::Cosine,
            KeyKind::HalfNormal,
            1,
        )),
    ];
    let models: Vec<FittedModel> =
        specs.iter().map(|spec| fit_default(&data, spec, TransectType::Line, w)).collect();
    let reversed: Vec<&FittedModel> = models.iter().rev().collect();

    // Act
    let forward = compare(&models).expect("comparable fits");
    let backward = compare(&reversed).expect("comparable fits");

    // Assert
    let key = |r: &rust_distance::RankedModel| (r.label.clone(), r.delta_aic, r.not_justified);
    assert_eq!(forward.iter().map(key).collect::<Vec<_>>(), backward.iter().map(key).collect::<Vec<_>>());
    assert_eq!(forward[0].delta_aic, 0.0);
    assert_relative_eq!(forward.iter().map(|r| r.weight).sum::<f64>(), 1.0, max_relative = 1e-12);
}

#[test]
// Purpose
// -------
// P̂a does not depend on the distance unit.
//
// Given
// -----
// - One simulated sample in metres and the same sample in kilometres,
//   with w scaled alike.
//
// Expect
// ------
// - Equal P̂a to 1e-4 relative; σ̂ scales by 1/1000.
fn detection_probability_is_scale_equivariant() {
    init_tracing();
    // Arrange
    let w = 200.0;
    let metres = simulated_half_normal(60.0, w, TransectType::Line, 500, 9);
    let kilometres =
        ObservationSet::from_distances(metres.iter().map(|o| o.distance / 1000.0)).expect("valid distances");

    // Act
    let m = fit_default(&metres, &ModelSpec::half_normal(), TransectType::Line, w);
    let km = fit_default(&kilometres, &ModelSpec::half_normal(), TransectType::Line, w / 1000.0);

    // Assert
    assert_relative_eq!(m.detection_probability(), km.detection_probability(), max_relative = 1e-4);
    assert_relative_eq!(m.scales()[0] / 1000.0, km.scales()[0], max_relative = 1e-4);
}

#[test]
// Purpose
// -------
// A TOML configuration reproduces the equivalent programmatic fit.
//
// Given
// -----
// - Hazard-rate key, w = 150, simulated line distances.
//
// Expect
// ------
// - Equal log-likelihood and AIC from both routes.
fn configured_fit_matches_programmatic_fit() {
    init_tracing();
    // Arrange
    let data = simulated_half_normal(45.0, 150.0, TransectType::Line, 250, 31);
    let config = FitConfig::from_toml_str("truncation = 150.0\n\n[model]\nkey = \"hazard_rate\"\n")
        .expect("document should load");

    // Act
    let from_config = config.fit(&data).expect("configured fit");
    let direct = fit_default(&data, &ModelSpec::hazard_rate(), TransectType::Line, 150.0);

    // Assert
    assert_eq!(from_config.loglik(), direct.loglik());
    assert_eq!(from_config.aic(), direct.aic());
}
