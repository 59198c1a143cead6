//! data — validated observation containers.
pub mod observations;

pub use self::observations::{Observation, ObservationSet};
