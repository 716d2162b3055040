//! Quadrature rules on reference domains.
//!
//! The rule data itself lives in the `femcore-quadrature` crate as plain `f64` tables; this
//! module converts it into the scalar type used by the rest of the crate.
use crate::error::{Error, Result};
use crate::Real;
use nalgebra::{convert, DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// A quadrature rule: integration points in local coordinates and their weights.
///
/// Points are stored row-major, one row of `dim` coordinates per point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuadratureRule<T> {
    dim: usize,
    weights: Vec<T>,
    points: Vec<T>,
}

impl<T: Real> QuadratureRule<T> {
    /// Creates a rule from weights and row-major point coordinates.
    pub fn try_new(dim: usize, weights: Vec<T>, points: Vec<T>) -> Result<Self> {
        let rule = Self { dim, weights, points };
        rule.validate()?;
        Ok(rule)
    }

    /// Creates a rule from an `[nip, dim]` matrix of local coordinates `xi` and `nip` weights `w`.
    pub fn from_matrix(xi: &DMatrix<T>, w: &DVector<T>) -> Result<Self> {
        if xi.nrows() != w.len() {
            return Err(Error::InvalidQuadratureRule {
                reason: format!("{} points but {} weights", xi.nrows(), w.len()),
            });
        }
        // The column-major storage of the transpose is the row-major storage of `xi`
        let points = xi.transpose().as_slice().to_vec();
        Self::try_new(xi.ncols(), w.as_slice().to_vec(), points)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn num_points(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Local coordinates of point `q`.
    pub fn point(&self, q: usize) -> &[T] {
        &self.points[q * self.dim..(q + 1) * self.dim]
    }

    /// The points as an `[nip, dim]` matrix.
    pub fn points_matrix(&self) -> DMatrix<T> {
        DMatrix::from_row_slice(self.num_points(), self.dim, &self.points)
    }

    /// Approximates the integral of `f` over the reference domain.
    pub fn integrate(&self, f: impl Fn(&[T]) -> T) -> T {
        (0..self.num_points()).fold(T::zero(), |sum, q| sum + f(self.point(q)) * self.weights[q])
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(Error::InvalidQuadratureRule { reason });
        if self.dim == 0 {
            invalid("points must have at least one coordinate".to_string())
        } else if self.weights.is_empty() {
            invalid("rule has no points".to_string())
        } else if self.points.len() != self.dim * self.weights.len() {
            invalid(format!(
                "{} coordinates do not match {} points of dimension {}",
                self.points.len(),
                self.weights.len(),
                self.dim
            ))
        } else {
            Ok(())
        }
    }
}

impl<T: Real, const D: usize> From<femcore_quadrature::Rule<D>> for QuadratureRule<T> {
    fn from((weights, points): femcore_quadrature::Rule<D>) -> Self {
        Self {
            dim: D,
            weights: weights.into_iter().map(convert).collect(),
            points: points.into_iter().flatten().map(convert).collect(),
        }
    }
}

/// Gauss rules for the reference quadrilateral and hexahedron.
pub mod tensor {
    use super::QuadratureRule;
    use crate::Real;

    pub fn quadrilateral_gauss<T: Real>(num_points_per_dim: usize) -> QuadratureRule<T> {
        femcore_quadrature::tensor::quadrilateral_gauss(num_points_per_dim).into()
    }

    pub fn hexahedron_gauss<T: Real>(num_points_per_dim: usize) -> QuadratureRule<T> {
        femcore_quadrature::tensor::hexahedron_gauss(num_points_per_dim).into()
    }
}

/// Rules with one unit-weight point at every reference node.
pub mod nodal {
    use super::QuadratureRule;
    use crate::Real;

    pub fn quadrilateral<T: Real>() -> QuadratureRule<T> {
        femcore_quadrature::nodal::quadrilateral_nodal().into()
    }

    pub fn hexahedron<T: Real>() -> QuadratureRule<T> {
        femcore_quadrature::nodal::hexahedron_nodal().into()
    }
}
