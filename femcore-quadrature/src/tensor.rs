//! Tensor-product Gauss rules for the reference quadrilateral and hexahedron.

use crate::univariate::gauss;
use crate::Rule;

/// Gauss rule on `[-1, 1]^D` built as the tensor product of `D` one-dimensional rules.
///
/// The last coordinate varies fastest.
fn tensor_gauss<const D: usize>(num_points_per_dim: usize) -> Rule<D> {
    let (weights_1d, points_1d) = gauss(num_points_per_dim);
    let n = weights_1d.len();
    let total = n.pow(D as u32);

    let mut weights = Vec::with_capacity(total);
    let mut points = Vec::with_capacity(total);
    for flat in 0..total {
        let mut point = [0.0; D];
        let mut weight = 1.0;
        let mut rest = flat;
        for d in (0..D).rev() {
            let k = rest % n;
            rest /= n;
            point[d] = points_1d[k][0];
            weight *= weights_1d[k];
        }
        weights.push(weight);
        points.push(point);
    }

    (weights, points)
}

/// A Gauss rule for the reference quadrilateral with `num_points_per_dim` points per axis.
///
/// # Panics
///
/// Panics if `num_points_per_dim` is zero.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule<2> {
    tensor_gauss(num_points_per_dim)
}

/// A Gauss rule for the reference hexahedron with `num_points_per_dim` points per axis.
///
/// # Panics
///
/// Panics if `num_points_per_dim` is zero.
pub fn hexahedron_gauss(num_points_per_dim: usize) -> Rule<3> {
    tensor_gauss(num_points_per_dim)
}
