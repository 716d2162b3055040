use crate::element::ReferenceElement;
use crate::quadrature::{nodal, tensor, QuadratureRule};
use crate::Real;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

/// Trilinear hexahedron with eight nodes.
///
/// Nodes 0-3 lie on the face `z = -1` and nodes 4-7 on the face `z = 1`, each face numbered
/// counter-clockwise from `(-1, -1)`. The default rule is the 2x2x2 Gauss rule.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hex8;

#[rustfmt::skip]
#[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
fn hex8_nodes<T: Real>() -> [[T; 3]; 8] {
    [
        [-1.0, -1.0, -1.0],
        [ 1.0, -1.0, -1.0],
        [ 1.0,  1.0, -1.0],
        [-1.0,  1.0, -1.0],
        [-1.0, -1.0,  1.0],
        [ 1.0, -1.0,  1.0],
        [ 1.0,  1.0,  1.0],
        [-1.0,  1.0,  1.0],
    ]
}

impl<T: Real> ReferenceElement<T> for Hex8 {
    fn num_nodes(&self) -> usize {
        8
    }

    fn reference_dim(&self) -> usize {
        3
    }

    fn default_quadrature(&self) -> QuadratureRule<T> {
        tensor::hexahedron_gauss(2)
    }

    fn nodal_quadrature(&self) -> QuadratureRule<T> {
        nodal::hexahedron()
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis(&self, basis_values: &mut [T], xi: &[T]) {
        assert_eq!(basis_values.len(), 8);
        assert_eq!(xi.len(), 3);
        for (phi, [a, b, c]) in basis_values.iter_mut().zip(hex8_nodes::<T>()) {
            *phi = 0.125 * (1.0 + a * xi[0]) * (1.0 + b * xi[1]) * (1.0 + c * xi[2]);
        }
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn populate_basis_gradients(&self, basis_gradients: &mut [T], xi: &[T]) {
        assert_eq!(basis_gradients.len(), 24);
        assert_eq!(xi.len(), 3);
        for (grad, [a, b, c]) in basis_gradients.chunks_exact_mut(3).zip(hex8_nodes::<T>()) {
            let (s0, s1, s2) = (1.0 + a * xi[0], 1.0 + b * xi[1], 1.0 + c * xi[2]);
            grad[0] = 0.125 * a * s1 * s2;
            grad[1] = 0.125 * b * s0 * s2;
            grad[2] = 0.125 * c * s0 * s1;
        }
    }
}
