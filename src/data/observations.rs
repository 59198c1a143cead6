//! Observation containers for distance-sampling fits.
//!
//! Purpose
//! -------
//! Provide a small, validated container for detection distances and their
//! per-observation covariates. This module centralizes input validation so
//! the fitting engine can assume clean data.
//!
//! Key behaviors
//! -------------
//! - [`ObservationSet`] enforces non-emptiness, finite non-negative
//!   distances and finite numeric covariates at construction.
//! - [`Observation`] carries an optional sample label (transect or point
//!   identifier) that fitting ignores but callers may use for grouping.
//!
//! Invariants & assumptions
//! ------------------------
//! - Distances are perpendicular (line transects) or radial (point
//!   transects); the container does not know which.
//! - Truncation is applied by the fitting engine, never here; the set keeps
//!   every observation it was given.
//!
//! Conventions
//! -----------
//! - Indexing is 0-based and error indices point at the first offending
//!   observation.
use crate::detection::covariates::{CovariateValue, Covariates};
use crate::errors::{DegenerateDataError, DomainError, DsResult};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// One detection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Perpendicular or radial distance; finite and `≥ 0`.
    pub distance: f64,
    /// Covariate values keyed by name.
    #[serde(default)]
    pub covariates: Covariates,
    /// Transect or point identifier.
    #[serde(default)]
    pub sample: Option<String>,
}

impl Observation {
    pub fn new(distance: f64) -> Self {
        Self { distance, covariates: Covariates::new(), sample: None }
    }

    pub fn with_covariate(mut self, name: impl Into<String>, value: impl Into<CovariateValue>) -> Self {
        self.covariates.insert(name.into(), value.into());
        self
    }

    pub fn with_sample(mut self, sample: impl Into<String>) -> Self {
        self.sample = Some(sample.into());
        self
    }
}

/// `ObservationSet` — validated, immutable collection of detections.
///
/// Invariants
/// ----------
/// - At least one observation.
/// - Every distance is finite and `≥ 0`.
/// - Every numeric covariate is finite.
///
/// Performance
/// -----------
/// - Validation is a single O(n) scan; after construction the set is a
///   plain vector with no hidden allocations.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationSet {
    observations: Vec<Observation>,
}

impl ObservationSet {
    /// Construct a validated [`ObservationSet`].
    ///
    /// Errors
    /// ------
    /// - `DegenerateDataError::NoObservations`
    ///   Returned when `observations` is empty.
    /// - `DomainError::NonFiniteDistance { index, value }`
    ///   Returned for a NaN or infinite distance.
    /// - `DomainError::NegativeDistance { index, value }`
    ///   Returned for a distance below zero.
    /// - `DomainError::NonFiniteCovariate { name, value }`
    ///   Returned for a NaN or infinite numeric covariate.
    ///
    /// Panics
    /// ------
    /// - Never panics.
    pub fn new(observations: Vec<Observation>) -> DsResult<Self> {
        if observations.is_empty() {
            return Err(DegenerateDataError::NoObservations.into());
        }
        for (index, obs) in observations.iter().enumerate() {
            let value = obs.distance;
            if !value.is_finite() {
                return Err(DomainError::NonFiniteDistance { index, value }.into());
            }
            if value < 0.0 {
                return Err(DomainError::NegativeDistance { index, value }.into());
            }
            for (name, covariate) in &obs.covariates {
                if let CovariateValue::Numeric(v) = covariate {
                    if !v.is_finite() {
                        return Err(DomainError::NonFiniteCovariate { name: name.clone(), value: *v }.into());
                    }
                }
            }
        }
        Ok(Self { observations })
    }

    /// Observations with distances only.
    ///
    /// # Examples
    /// ```rust
    /// # use rust_distance::data::ObservationSet;
    /// let data = ObservationSet::from_distances([12.0, 45.0, 78.0]).unwrap();
    /// assert_eq!(data.len(), 3);
    /// assert_eq!(data.max_distance(), 78.0);
    /// ```
    pub fn from_distances<I: IntoIterator<Item = f64>>(distances: I) -> DsResult<Self> {
        Self::new(distances.into_iter().map(Observation::new).collect())
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Observation> {
        self.observations.iter()
    }

    pub fn distances(&self) -> Array1<f64> {
        self.observations.iter().map(|o| o.distance).collect()
    }

    /// Largest observed distance, the default truncation.
    pub fn max_distance(&self) -> f64 {
        self.observations.iter().map(|o| o.distance).fold(0.0, f64::max)
    }

    /// Observations with `distance ≤ truncation`.
    pub fn within(&self, truncation: f64) -> Vec<&Observation> {
        self.observations.iter().filter(|o| o.distance <= truncation).collect()
    }
}

impl<'a> IntoIterator for &'a ObservationSet {
    type Item = &'a Observation;
    type IntoIter = std::slice::Iter<'a, Observation>;

    fn into_iter(self) -> Self::IntoIter {
        self.observations.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DsError;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Construction happy path and each rejection.
    // - Truncation filtering and the default truncation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Invalid inputs are rejected with the offending index.
    //
    // Given
    // -----
    // - An empty list, [1, -2], [1, NaN], and a NaN covariate.
    //
    // Expect
    // ------
    // - `NoObservations`, `NegativeDistance { index: 1 }`,
    //   `NonFiniteDistance { index: 1 }`, `NonFiniteCovariate`.
    fn construction_rejects_invalid_inputs() {
        // Act
        let empty = ObservationSet::new(vec![]);
        let negative = ObservationSet::from_distances([1.0, -2.0]);
        let nan = ObservationSet::from_distances([1.0, f64::NAN]);
        let covariate = ObservationSet::new(vec![Observation::new(1.0).with_covariate("size", f64::INFINITY)]);

        // Assert
        assert_eq!(empty, Err(DsError::DegenerateData(DegenerateDataError::NoObservations)));
        assert_eq!(
            negative,
            Err(DsError::Domain(DomainError::NegativeDistance { index: 1, value: -2.0 }))
        );
        assert!(matches!(nan, Err(DsError::Domain(DomainError::NonFiniteDistance { index: 1, .. }))));
        assert!(matches!(covariate, Err(DsError::Domain(DomainError::NonFiniteCovariate { .. }))));
    }

    #[test]
    // Purpose
    // -------
    // Truncation keeps observations at or below w.
    //
    // Given
    // -----
    // - Distances [12, 45, 78, 130, 210] and w = 130.
    //
    // Expect
    // ------
    // - Four retained; max distance 210; zero distance is accepted.
    fn within_keeps_boundary_observations() {
        // Arrange
        let data = ObservationSet::from_distances([12.0, 45.0, 78.0, 130.0, 210.0]).expect("valid data");

        // Act
        let kept = data.within(130.0);

        // Assert
        assert_eq!(kept.len(), 4);
        assert_eq!(data.max_distance(), 210.0);
        assert!(ObservationSet::from_distances([0.0]).is_ok());
        assert_eq!(data.distances().len(), 5);
    }
}
