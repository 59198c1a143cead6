//! fitting::monotonicity — shape constraints for adjusted detection curves.
//!
//! Adjustment series can make `g` rise with distance, dip below zero, or
//! climb above one when `A(0)` is near zero. Every curve the likelihood
//! builds for an adjusted model (one per covariate group, plus
//! caller-supplied probe tuples) must stay within `[0, 1]` on an equally
//! spaced grid over `[0, w]`. When monotonicity is requested it must also
//! be non-increasing on that grid. Plain keys and mixtures satisfy both
//! already and are never checked.
use crate::detection::{curve::DetectionCurve, spec::ModelSpec};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonotonicityCheck {
    bounded: bool,
    enabled: bool,
    grid_resolution: usize,
}

impl MonotonicityCheck {
    /// Range check for any adjusted model; the monotone check only when
    /// also requested.
    pub fn new(spec: &ModelSpec, requested: bool, grid_resolution: usize) -> Self {
        let adjusted = spec.n_adjustments() > 0;
        Self { bounded: adjusted, enabled: requested && adjusted, grid_resolution }
    }

    /// No shape constraint at all; used by covariance stencils.
    pub fn disabled() -> Self {
        Self { bounded: false, enabled: false, grid_resolution: 2 }
    }

    /// Whether the non-increasing requirement is in force.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Whether any constraint is in force.
    pub fn is_active(&self) -> bool {
        self.bounded || self.enabled
    }

    /// `true` when `curve` passes every constraint in force.
    pub fn accepts(&self, curve: &DetectionCurve) -> bool {
        if self.enabled && !curve.is_non_increasing(self.grid_resolution) {
            return false;
        }
        !self.bounded || curve.is_within_unit_interval(self.grid_resolution)
    }
}
