//! detection::adjustment — series adjustments layered on a key.
//!
//! An adjustment multiplies the key by `1 + Σⱼ αⱼ aⱼ(x)` over an explicit
//! set of orders `j`. Three bases are supported:
//!
//! | kind       | `aⱼ(x)`            | minimum order            |
//! |------------|--------------------|--------------------------|
//! | cosine     | `cos(jπx/w)`       | 1 with uniform, else 2   |
//! | Hermite    | `He₂ⱼ(x/σ)`        | 2 (half-normal key only) |
//! | polynomial | `(x/w)^(2j)`       | 1 with uniform, else 2   |
//!
//! `He` is the probabilists' Hermite polynomial. Orders must start at the
//! minimum and be contiguous: `[2, 3, 4]` is valid for a half-normal key,
//! `[3, 4]` and `[2, 4]` are not.
use crate::detection::key::KeyKind;
use crate::errors::DomainError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;

/// Adjustment basis family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    Cosine,
    Hermite,
    Polynomial,
}

impl AdjustmentKind {
    /// Short label: `cos`, `herm`, `poly`.
    pub fn label(&self) -> &'static str {
        match self {
            AdjustmentKind::Cosine => "cos",
            AdjustmentKind::Hermite => "herm",
            AdjustmentKind::Polynomial => "poly",
        }
    }

    /// Smallest admissible order for this basis on `key`.
    pub fn minimum_order(&self, key: KeyKind) -> usize {
        match (self, key) {
            (AdjustmentKind::Hermite, _) => 2,
            (_, KeyKind::Uniform) => 1,
            _ => 2,
        }
    }

    /// Whether this basis may be combined with `key`.
    pub fn supports(&self, key: KeyKind) -> bool {
        match self {
            AdjustmentKind::Hermite => key == KeyKind::HalfNormal,
            _ => true,
        }
    }
}

impl FromStr for AdjustmentKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cos" | "cosine" => Ok(AdjustmentKind::Cosine),
            "herm" | "hermite" => Ok(AdjustmentKind::Hermite),
            "poly" | "polynomial" => Ok(AdjustmentKind::Polynomial),
            _ => Err(DomainError::UnknownAdjustment { name: s.to_string() }),
        }
    }
}

/// Basis kind plus the orders it uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentSpec {
    pub kind: AdjustmentKind,
    pub orders: Vec<usize>,
}

impl AdjustmentSpec {
    pub fn new(kind: AdjustmentKind, orders: Vec<usize>) -> Self {
        Self { kind, orders }
    }

    /// `n_terms` contiguous orders starting at the minimum for `key`.
    pub fn with_terms(kind: AdjustmentKind, key: KeyKind, n_terms: usize) -> Self {
        let start = kind.minimum_order(key);
        Self { kind, orders: (start..start + n_terms).collect() }
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Check the basis against `key` and the order set against the
    /// minimum-order and contiguity rules.
    ///
    /// # Errors
    /// - `AdjustmentKeyMismatch` for Hermite on a non-half-normal key.
    /// - `EmptyAdjustmentOrders` for an empty order set.
    /// - `AdjustmentOrderTooLow` when the first order is below the minimum.
    /// - `AdjustmentOrdersNotContiguous` otherwise.
    pub fn validate(&self, key: KeyKind) -> Result<(), DomainError> {
        if !self.kind.supports(key) {
            return Err(DomainError::AdjustmentKeyMismatch {
                adjustment: self.kind.label(),
                key: key.label(),
            });
        }
        let minimum = self.kind.minimum_order(key);
        let first = *self.orders.first().ok_or(DomainError::EmptyAdjustmentOrders)?;
        if first < minimum {
            return Err(DomainError::AdjustmentOrderTooLow { order: first, minimum });
        }
        let contiguous = self.orders.iter().enumerate().all(|(i, &order)| order == minimum + i);
        if !contiguous {
            return Err(DomainError::AdjustmentOrdersNotContiguous {
                orders: self.orders.clone(),
                minimum,
            });
        }
        Ok(())
    }

    /// Label such as `cos(2,3)`.
    pub fn label(&self) -> String {
        let orders: Vec<String> = self.orders.iter().map(|o| o.to_string()).collect();
        format!("{}({})", self.kind.label(), orders.join(","))
    }
}

/// Basis function `aⱼ(x)` for order `j`.
///
/// `truncation` scales cosine and polynomial terms; `sigma` scales Hermite
/// terms.
pub fn basis(kind: AdjustmentKind, order: usize, x: f64, truncation: f64, sigma: f64) -> f64 {
    match kind {
        AdjustmentKind::Cosine => (order as f64 * PI * x / truncation).cos(),
        AdjustmentKind::Polynomial => (x / truncation).powi(2 * order as i32),
        AdjustmentKind::Hermite => hermite(2 * order, x / sigma),
    }
}

/// Adjustment factor `1 + Σ αⱼ aⱼ(x)`.
pub fn series(
    kind: AdjustmentKind, orders: &[usize], coefs: &[f64], x: f64, truncation: f64, sigma: f64,
) -> f64 {
    1.0 + orders
        .iter()
        .zip(coefs)
        .map(|(&order, &alpha)| alpha * basis(kind, order, x, truncation, sigma))
        .sum::<f64>()
}

/// Probabilists' Hermite polynomial `Heₙ(z)` by the three-term recurrence
/// `He_{n+1} = z Heₙ - n He_{n-1}`.
pub fn hermite(n: usize, z: f64) -> f64 {
    let (mut prev, mut curr) = (1.0, z);
    if n == 0 {
        return prev;
    }
    for k in 1..n {
        let next = z * curr - k as f64 * prev;
        prev = curr;
        curr = next;
    }
    curr
}
