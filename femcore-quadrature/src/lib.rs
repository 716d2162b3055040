//! Quadrature rules for finite element reference domains.
//!
//! Rules are plain `f64` data so that they can be used independently of `femcore`.
//!
//! # Reference domains
//!
//! - The reference interval is `[-1, 1]`.
//! - The reference quadrilateral is `[-1, 1]^2` with corners numbered counter-clockwise,
//!   starting from `(-1, -1)`.
//! - The reference hexahedron is `[-1, 1]^3`. The bottom face `z = -1` is numbered like the
//!   reference quadrilateral, followed by the top face `z = 1` in the same order.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod nodal;
pub mod tensor;
pub mod univariate;

/// Library-wide error type.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Indicates that a rule satisfying the given requirements is not available.
    NoRuleAvailable,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRuleAvailable => {
                write!(f, "There is no quadrature rule satisfying the requirements available")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule, stored as `(weights, points)`.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A two-dimensional quadrature rule.
pub type Rule2d = Rule<2>;

/// A three-dimensional quadrature rule.
pub type Rule3d = Rule<3>;

/// Approximates the integral of `f` with the given rule.
pub fn integrate<const D: usize>(rule: &Rule<D>, f: impl Fn(&Point<D>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, x)| w * f(x))
        .sum()
}
