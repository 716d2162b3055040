//! Element quadrature and partitioned degree-of-freedom assembly for finite element solvers.
//!
//! The crate is organized around three representations of a vector field on a mesh:
//!
//! - *DOF values* (`dofval`, a [`DVector`](nalgebra::DVector)), optionally split into the
//!   *unknown* and *prescribed* partitions,
//! - *node vectors* (`nodevec`, a [`DMatrix`](nalgebra::DMatrix) with one row per node),
//! - *element vectors* (`elemvec`, an [`ElementVectors`](array::ElementVectors) array holding a
//!   copy of the nodal values for every element).
//!
//! [`integrate::Quadrature`] integrates over elements, [`vector::Vector`] converts and assembles
//! between the representations, and [`matrix_diagonal::MatrixDiagonal`] is a lumped operator on
//! the same partitioned DOF space.
use nalgebra::RealField;

pub mod array;
pub mod element;
pub mod error;
pub mod field;
pub mod integrate;
pub mod iterate;
pub mod matrix_diagonal;
pub mod quadrature;
pub mod vector;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::{Error, Result};

/// Real scalar types supported by `femcore` routines.
///
/// Trait alias for [`RealField`] types that are also [`Copy`], which covers `f32` and `f64`.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
