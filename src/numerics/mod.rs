//! numerics — quadrature and special functions.
//!
//! Detection-curve integrals without a closed form go through the
//! adaptive Gauss–Kronrod rule in [`quadrature`]; goodness-of-fit p-values
//! use the asymptotic distributions in [`special`].

pub mod quadrature;
pub mod special;

pub use self::quadrature::{Quadrature, integrate, integrate_adaptive};
pub use self::special::{bessel_k, cramer_von_mises_cdf, erf, kolmogorov_survival};
