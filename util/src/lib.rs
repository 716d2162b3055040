//! Assertions and structured meshes shared by the tests and benchmarks.
use nalgebra::{DMatrix, Scalar};

/// Poor man's approx assertion for matrices
#[macro_export]
macro_rules! assert_approx_matrix_eq {
    ($x:expr, $y:expr, abstol = $tol:expr) => {{
        let diff = $x - $y;

        let max_absdiff = diff.abs().max();
        let approx_eq = max_absdiff <= $tol;

        if !approx_eq {
            println!("abstol: {:e}", $tol);
            println!("left: {}", $x);
            println!("right: {}", $y);
            println!("diff: {:e}", diff);
        }
        assert!(approx_eq);
    }};
}

#[macro_export]
macro_rules! assert_panics {
    ($e:expr) => {{
        use std::panic::catch_unwind;
        use std::stringify;
        let expr_string = stringify!($e);
        let result = catch_unwind(|| $e);
        if result.is_ok() {
            panic!("assert_panics!({}) failed.", expr_string);
        }
    }};
}

/// A structured mesh: nodal coordinates `[nnode, ndim]` and connectivity `[nelem, nne]`.
#[derive(Debug, Clone)]
pub struct StructuredMesh {
    pub coordinates: DMatrix<f64>,
    pub connectivity: DMatrix<usize>,
}

impl StructuredMesh {
    pub fn nnode(&self) -> usize {
        self.coordinates.nrows()
    }

    pub fn ndim(&self) -> usize {
        self.coordinates.ncols()
    }

    pub fn nelem(&self) -> usize {
        self.connectivity.nrows()
    }

    pub fn nne(&self) -> usize {
        self.connectivity.ncols()
    }

    /// Coordinates copied per element, row-major `[nelem, nne, ndim]`.
    pub fn element_coordinates(&self) -> Vec<f64> {
        gather_rows(&self.coordinates, &self.connectivity)
    }

    /// DOF numbers `[nnode, ndim]` enumerating the nodes and then their components.
    pub fn dofs(&self) -> DMatrix<usize> {
        let ndim = self.ndim();
        DMatrix::from_fn(self.nnode(), ndim, |node, i| node * ndim + i)
    }
}

/// Row-major `[nelem, nne, ncols]` copy of the rows of `nodal` referenced by `conn`.
pub fn gather_rows<T: Scalar + Copy>(nodal: &DMatrix<T>, conn: &DMatrix<usize>) -> Vec<T> {
    let mut data = Vec::with_capacity(conn.len() * nodal.ncols());
    for e in 0..conn.nrows() {
        for m in 0..conn.ncols() {
            data.extend(nodal.row(conn[(e, m)]).iter().copied());
        }
    }
    data
}

/// `nx * ny` square cells of width `h` with lower left corner at the origin.
///
/// Nodes are numbered row by row, elements counter-clockwise from their lower left corner.
pub fn quad_grid(nx: usize, ny: usize, h: f64) -> StructuredMesh {
    let node = |i: usize, j: usize| j * (nx + 1) + i;
    let coordinates = DMatrix::from_fn((nx + 1) * (ny + 1), 2, |n, d| {
        let ij = [n % (nx + 1), n / (nx + 1)];
        h * ij[d] as f64
    });
    let mut conn = Vec::with_capacity(4 * nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            conn.extend([node(i, j), node(i + 1, j), node(i + 1, j + 1), node(i, j + 1)]);
        }
    }
    StructuredMesh {
        coordinates,
        connectivity: DMatrix::from_row_slice(nx * ny, 4, &conn),
    }
}

/// `nx * ny * nz` cubic cells of width `h` with a corner at the origin.
///
/// Elements list the nodes of their bottom face counter-clockwise, then the top face.
pub fn hex_grid(nx: usize, ny: usize, nz: usize, h: f64) -> StructuredMesh {
    let node = |i: usize, j: usize, k: usize| (k * (ny + 1) + j) * (nx + 1) + i;
    let coordinates = DMatrix::from_fn((nx + 1) * (ny + 1) * (nz + 1), 3, |n, d| {
        let ijk = [n % (nx + 1), (n / (nx + 1)) % (ny + 1), n / ((nx + 1) * (ny + 1))];
        h * ijk[d] as f64
    });
    let mut conn = Vec::with_capacity(8 * nx * ny * nz);
    for k in 0..nz {
        for j in 0..ny {
            for i in 0..nx {
                conn.extend([
                    node(i, j, k),
                    node(i + 1, j, k),
                    node(i + 1, j + 1, k),
                    node(i, j + 1, k),
                    node(i, j, k + 1),
                    node(i + 1, j, k + 1),
                    node(i + 1, j + 1, k + 1),
                    node(i, j + 1, k + 1),
                ]);
            }
        }
    }
    StructuredMesh {
        coordinates,
        connectivity: DMatrix::from_row_slice(nx * ny * nz, 8, &conn),
    }
}
