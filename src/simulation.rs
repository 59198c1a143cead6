//! simulation — Monte Carlo distances from a detection curve.
//!
//! Purpose
//! -------
//! Draw synthetic detection distances for power studies and consistency
//! checks of the fitting engine.
//!
//! Key behaviors
//! -------------
//! - Candidates are uniform on `[0, w]` (line) or have density `2r/w²`
//!   (point, drawn as `w √U`); each is kept with probability `g(x)`.
//! - A fixed seed gives the same distances on every run; `None` seeds from
//!   OS entropy.
//! - The draw budget bounds the work for curves with tiny `P̂a`.
use crate::detection::{curve::DetectionCurve, spec::TransectType};
use crate::errors::{DegenerateDataError, DsResult};
use rand::{Rng, SeedableRng};
use rand_isaac::Isaac64Rng;

/// Default candidate budget per call.
pub const DEFAULT_MAX_DRAWS: usize = 10_000_000;

/// Simulation settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimOpts {
    pub seed: Option<u64>,
    pub max_draws: usize,
}

impl Default for SimOpts {
    fn default() -> Self {
        Self { seed: None, max_draws: DEFAULT_MAX_DRAWS }
    }
}

impl SimOpts {
    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed), ..Self::default() }
    }
}

/// Draw `n` detected distances from `curve` by acceptance sampling.
///
/// # Errors
/// - `SimulationExhausted` when fewer than `n` candidates are accepted
///   within `opts.max_draws`.
///
/// # Examples
/// ```rust
/// # use rust_distance::detection::{DetectionCurve, TransectType};
/// # use rust_distance::simulation::{SimOpts, simulate_distances};
/// let curve = DetectionCurve::half_normal(50.0, 200.0).unwrap();
/// let x = simulate_distances(&curve, TransectType::Line, 100, SimOpts::seeded(7)).unwrap();
/// assert_eq!(x.len(), 100);
/// assert!(x.iter().all(|d| (0.0..=200.0).contains(d)));
/// ```
pub fn simulate_distances(
    curve: &DetectionCurve, transect: TransectType, n: usize, opts: SimOpts,
) -> DsResult<Vec<f64>> {
    let mut rng = match opts.seed {
        Some(seed) => Isaac64Rng::seed_from_u64(seed),
        None => Isaac64Rng::from_entropy(),
    };
    let w = curve.truncation();
    let mut accepted = Vec::with_capacity(n.min(opts.max_draws));
    let mut draws = 0;
    while accepted.len() < n {
        if draws == opts.max_draws {
            return Err(DegenerateDataError::SimulationExhausted {
                accepted: accepted.len(),
                requested: n,
                draws,
            }
            .into());
        }
        draws += 1;
        let u: f64 = rng.gen();
        let x = match transect {
            TransectType::Line => w * u,
            TransectType::Point => w * u.sqrt(),
        };
        if rng.gen::<f64>() < curve.raw(x).clamp(0.0, 1.0) {
            accepted.push(x);
        }
    }
    Ok(accepted)
}
