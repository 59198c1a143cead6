//! goodness_of_fit::validation — input guards for the EDF statistics.
use crate::errors::{DegenerateDataError, DomainError, DsResult};

/// Smallest sample the EDF statistics are computed for.
pub const MIN_GOF_SAMPLE: usize = 2;

/// Check model CDF values before computing a statistic.
///
/// # Errors
/// - `DegenerateDataError::TooFewForGof` for fewer than
///   [`MIN_GOF_SAMPLE`] values.
/// - `DomainError::InvalidCdfValue` for a value that is non-finite or
///   outside `[0, 1]`.
pub fn validate_cdf_values(cdf_values: &[f64]) -> DsResult<()> {
    let n = cdf_values.len();
    if n < MIN_GOF_SAMPLE {
        return Err(DegenerateDataError::TooFewForGof { n, minimum: MIN_GOF_SAMPLE }.into());
    }
    if let Some((index, &value)) =
        cdf_values.iter().enumerate().find(|(_, c)| !c.is_finite() || !(0.0..=1.0).contains(*c))
    {
        return Err(DomainError::InvalidCdfValue { index, value }.into());
    }
    Ok(())
}
