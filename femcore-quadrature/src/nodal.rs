//! Nodal rules: one point at each corner of the reference domain, with unit weight.
//!
//! Integrating `N_i N_j` with a nodal rule gives a diagonal (lumped) mass matrix, because every
//! shape function vanishes at all nodes but its own.

use crate::Rule;

/// The corners of the reference quadrilateral, in reference node order.
pub fn quadrilateral_nodal() -> Rule<2> {
    let points = vec![[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
    (vec![1.0; points.len()], points)
}

/// The corners of the reference hexahedron, in reference node order.
pub fn hexahedron_nodal() -> Rule<3> {
    let (_, face) = quadrilateral_nodal();
    let points: Vec<_> = [-1.0, 1.0]
        .iter()
        .flat_map(|&z| face.iter().map(move |&[x, y]| [x, y, z]))
        .collect();
    (vec![1.0; points.len()], points)
}
