//! Reference elements: shape functions and their local gradients.
use crate::quadrature::QuadratureRule;
use crate::Real;
use std::fmt::Debug;

mod hexahedron;
mod quadrilateral;

pub use hexahedron::*;
pub use quadrilateral::*;

/// An isoparametric element type defined on a reference domain.
///
/// Implementors are stateless descriptions of an element *type*; the geometry of individual
/// elements is supplied separately as nodal coordinates.
pub trait ReferenceElement<T: Real>: Debug + Clone + Send + Sync {
    /// Number of nodes per element.
    fn num_nodes(&self) -> usize;

    /// Dimension of the reference domain, which is also the spatial dimension.
    fn reference_dim(&self) -> usize;

    /// The rule used when no rule is given explicitly.
    fn default_quadrature(&self) -> QuadratureRule<T>;

    /// A rule with one unit-weight point at every node, in node order.
    fn nodal_quadrature(&self) -> QuadratureRule<T>;

    /// Evaluates every shape function at the local coordinates `xi`.
    ///
    /// # Panics
    ///
    /// Panics if `basis_values.len() != num_nodes()` or `xi.len() != reference_dim()`.
    fn populate_basis(&self, basis_values: &mut [T], xi: &[T]);

    /// Evaluates the local gradient of every shape function at `xi`.
    ///
    /// The output is row-major with shape `[num_nodes, reference_dim]`: entry `(m, i)` is the
    /// derivative of shape function `m` with respect to local coordinate `i`.
    ///
    /// # Panics
    ///
    /// Panics if `basis_gradients.len() != num_nodes() * reference_dim()` or
    /// `xi.len() != reference_dim()`.
    fn populate_basis_gradients(&self, basis_gradients: &mut [T], xi: &[T]);
}
