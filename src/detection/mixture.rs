//! detection::mixture — finite mixtures of key functions.
//!
//! `g(x) = Σⱼ φⱼ kⱼ(x) / Σⱼ φⱼ`, each component with its own scale;
//! hazard-rate components share one shape. Weights come from a softmax of
//! `m - 1` free logits with the last component as reference.
use crate::detection::key::KeyKind;
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};

pub const MIN_COMPONENTS: usize = 2;
pub const MAX_COMPONENTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixtureSpec {
    pub components: usize,
}

impl MixtureSpec {
    pub fn new(components: usize) -> Self {
        Self { components }
    }

    /// # Errors
    /// - `InvalidMixtureComponents` outside `2..=5`.
    /// - `MixtureKeyUnsupported` for the uniform key.
    pub fn validate(&self, key: KeyKind) -> Result<(), DomainError> {
        if self.components < MIN_COMPONENTS {
            return Err(DomainError::InvalidMixtureComponents {
                components: self.components,
                reason: "a mixture needs at least two components",
            });
        }
        if self.components > MAX_COMPONENTS {
            return Err(DomainError::InvalidMixtureComponents {
                components: self.components,
                reason: "at most five components are supported",
            });
        }
        if !key.has_scale() {
            return Err(DomainError::MixtureKeyUnsupported { key: key.label() });
        }
        Ok(())
    }

    /// Number of free weight logits.
    pub fn n_logits(&self) -> usize {
        self.components.saturating_sub(1)
    }
}

/// Check explicit mixture weights: finite, non-negative, summing to one.
///
/// # Errors
/// - `InvalidMixtureWeights` with the failing condition.
pub fn validate_weights(weights: &[f64]) -> Result<(), DomainError> {
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(DomainError::InvalidMixtureWeights {
            reason: "weights must be finite and non-negative",
        });
    }
    let total: f64 = weights.iter().sum();
    if (total - 1.0).abs() > 1e-9 {
        return Err(DomainError::InvalidMixtureWeights { reason: "weights must sum to one" });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Component count and key are both checked.
    //
    // Given
    // -----
    // - 1, 2 and 6 components on half-normal; 2 on uniform.
    //
    // Expect
    // ------
    // - Only 2 components on half-normal is valid.
    fn mixture_spec_validates_components_and_key() {
        // Act / Assert
        assert!(MixtureSpec::new(2).validate(KeyKind::HalfNormal).is_ok());
        assert!(MixtureSpec::new(1).validate(KeyKind::HalfNormal).is_err());
        assert!(MixtureSpec::new(6).validate(KeyKind::HalfNormal).is_err());
        assert_eq!(
            MixtureSpec::new(2).validate(KeyKind::Uniform),
            Err(DomainError::MixtureKeyUnsupported { key: "unif" })
        );
    }

    #[test]
    // Purpose
    // -------
    // Explicit weights must form a probability vector.
    //
    // Given
    // -----
    // - [0.3, 0.7], [0.5, 0.6], [-0.1, 1.1].
    //
    // Expect
    // ------
    // - Only the first is accepted.
    fn explicit_weights_must_be_a_probability_vector() {
        // Act / Assert
        assert!(validate_weights(&[0.3, 0.7]).is_ok());
        assert!(validate_weights(&[0.5, 0.6]).is_err());
        assert!(validate_weights(&[-0.1, 1.1]).is_err());
    }
}
