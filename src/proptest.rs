//! Strategies for property-based testing with `proptest`.
use crate::array::ElementVectors;
use ::proptest::prelude::*;
use ::proptest::sample::subsequence;
use nalgebra::{DMatrix, Point2, Rotation2, Vector2};
use std::f64::consts::{FRAC_PI_2, PI};

pub fn point2() -> impl Strategy<Value = Point2<f64>> {
    // Keep coordinates moderate so that products of coordinates stay well conditioned
    let range = -10.0..10.0;
    [range.clone(), range].prop_map(|[x, y]| Point2::new(x, y))
}

/// Convex, counter-clockwise quadrilaterals with corners ordered like [`Quad4`](crate::element::Quad4).
///
/// The corners start out on the unit circle, one in each quadrant and bounded away from the
/// quadrant borders, and are then stretched, rotated and translated. Affine maps with positive
/// determinant preserve convexity and orientation.
pub fn convex_quad4() -> impl Strategy<Value = [Point2<f64>; 4]> {
    let fraction = 0.1..0.9;
    let fractions = [fraction.clone(), fraction.clone(), fraction.clone(), fraction];
    let stretch = [0.2..5.0, 0.2..5.0];
    let angle = 0.0..2.0 * PI;
    (fractions, stretch, angle, point2()).prop_map(|(fractions, [sx, sy], angle, center): ([f64; 4], [f64; 2], f64, Point2<f64>)| {
        let rotation = Rotation2::new(angle);
        let mut corners = [Point2::origin(); 4];
        for (k, (corner, t)) in corners.iter_mut().zip(fractions).enumerate() {
            // Quadrant k starts at angle -PI + k * PI / 2, so the first corner lies near (-1, -1)
            let phi = -PI + (k as f64 + t) * FRAC_PI_2;
            let on_circle = Vector2::new(sx * phi.cos(), sy * phi.sin());
            *corner = center + rotation * on_circle;
        }
        corners
    })
}

/// Per-element coordinates `[1, 4, 2]` of a single convex quadrilateral.
pub fn convex_quad4_coordinates() -> impl Strategy<Value = ElementVectors<f64>> {
    convex_quad4().prop_map(|corners| ElementVectors::from_fn([1, 4, 2], |[_, m, i]| corners[m][i]))
}

/// A random permutation of `[0, nnode * ndim)` laid out as a `[nnode, ndim]` DOF table.
pub fn dof_numbering(nnode: usize, ndim: usize) -> impl Strategy<Value = DMatrix<usize>> {
    Just((0..nnode * ndim).collect::<Vec<_>>())
        .prop_shuffle()
        .prop_map(move |dofs| DMatrix::from_row_slice(nnode, ndim, &dofs))
}

/// Random sets of prescribed DOFs out of `[0, ndof)`, in random order.
pub fn prescribed_dofs(ndof: usize) -> impl Strategy<Value = Vec<usize>> {
    subsequence((0..ndof).collect::<Vec<_>>(), 0..=ndof).prop_shuffle()
}
