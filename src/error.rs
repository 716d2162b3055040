//! Library-wide error type.
use std::fmt;
use std::fmt::{Display, Formatter};

/// Convenience alias for results with the crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `femcore` operations.
///
/// Every error is a deterministic function of the input and local to the call that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// An argument's shape disagrees with the dimensions fixed at construction.
    DimensionMismatch {
        name: &'static str,
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
    /// A connectivity, DOF or prescribed-DOF table references an index outside its range.
    IndexOutOfBounds {
        name: &'static str,
        index: usize,
        bound: usize,
    },
    /// An index that must be unique occurs more than once.
    DuplicateIndex { name: &'static str, index: usize },
    /// The Jacobian determinant is zero or negative at an integration point of an element.
    DegenerateElement { element: usize, point: usize },
    /// A diagonal entry is zero for a DOF that was requested in a solve.
    SingularDiagonal { dof: usize },
    /// An element matrix passed to a diagonal operator has non-zero off-diagonal entries.
    NonDiagonalElementMatrix { element: usize },
    /// A quadrature rule is unusable for the requested element.
    InvalidQuadratureRule { reason: String },
    /// Settings of a convergence check cannot be satisfied.
    InvalidStopCriterion { reason: String },
}

impl Error {
    pub(crate) fn dimension_mismatch(name: &'static str, expected: &[usize], actual: &[usize]) -> Self {
        Self::DimensionMismatch {
            name,
            expected: expected.to_vec(),
            actual: actual.to_vec(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::DimensionMismatch { name, expected, actual } => {
                write!(f, "{name} has shape {actual:?}, expected {expected:?}")
            }
            Self::IndexOutOfBounds { name, index, bound } => {
                write!(f, "{name} contains index {index}, which is not less than {bound}")
            }
            Self::DuplicateIndex { name, index } => {
                write!(f, "{name} contains index {index} more than once")
            }
            Self::DegenerateElement { element, point } => {
                write!(
                    f,
                    "element {element} has a non-positive Jacobian determinant at integration point {point}"
                )
            }
            Self::SingularDiagonal { dof } => write!(f, "diagonal entry of DOF {dof} is zero"),
            Self::NonDiagonalElementMatrix { element } => {
                write!(f, "element matrix {element} has non-zero off-diagonal entries")
            }
            Self::InvalidQuadratureRule { reason } => write!(f, "invalid quadrature rule: {reason}"),
            Self::InvalidStopCriterion { reason } => write!(f, "invalid stop criterion: {reason}"),
        }
    }
}

impl std::error::Error for Error {}

/// Fails with [`Error::DimensionMismatch`] unless `actual == expected`.
pub(crate) fn check_shape(name: &'static str, expected: &[usize], actual: &[usize]) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::dimension_mismatch(name, expected, actual))
    }
}
