use crate::element::ReferenceElement;
use crate::quadrature::{nodal, tensor, QuadratureRule};
use crate::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Bilinear quadrilateral with four nodes, numbered counter-clockwise from `(-1, -1)`.
///
/// The default rule is the 2x2 Gauss rule.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quad4;

/// Local coordinates of the nodes of the reference quadrilateral.
#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn quad4_nodes<T: Real>() -> [[T; 2]; 4] {
    [
        [-1.0, -1.0],
        [ 1.0, -1.0],
        [ 1.0,  1.0],
        [-1.0,  1.0],
    ]
}

impl<T: Real> ReferenceElement<T> for Quad4 {
    fn num_nodes(&self) -> usize {
        4
    }

    fn reference_dim(&self) -> usize {
        2
    }

    fn default_quadrature(&self) -> QuadratureRule<T> {
        tensor::quadrilateral_gauss(2)
    }

    fn nodal_quadrature(&self) -> QuadratureRule<T> {
        nodal::quadrilateral()
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis(&self, basis_values: &mut [T], xi: &[T]) {
        assert_eq!(basis_values.len(), 4);
        assert_eq!(xi.len(), 2);
        // N_m(xi) = (1 + a_m xi_0) (1 + b_m xi_1) / 4 with (a_m, b_m) the corner of node m
        for (phi, [a, b]) in basis_values.iter_mut().zip(quad4_nodes::<T>()) {
            *phi = 0.25 * (1.0 + a * xi[0]) * (1.0 + b * xi[1]);
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis_gradients(&self, basis_gradients: &mut [T], xi: &[T]) {
        assert_eq!(basis_gradients.len(), 8);
        assert_eq!(xi.len(), 2);
        for (grad, [a, b]) in basis_gradients.chunks_exact_mut(2).zip(quad4_nodes::<T>()) {
            grad[0] = 0.25 * a * (1.0 + b * xi[1]);
            grad[1] = 0.25 * b * (1.0 + a * xi[0]);
        }
    }
}
