//! Dense row-major arrays for per-element and per-integration-point data.
//!
//! Node vectors, DOF vectors and integration point scalars are plain `nalgebra` matrices and
//! vectors. Data with three or four indices is stored in a [`DenseArray`].
use crate::error::{check_shape, Error, Result};
use nalgebra::{DMatrix, Scalar};
use num::Zero;
use std::ops::{Index, IndexMut};

/// An owned dense array of fixed rank and runtime shape, stored in row-major order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DenseArray<T, const RANK: usize> {
    shape: [usize; RANK],
    data: Vec<T>,
}

/// Nodal vectors stored per element, with shape `[nelem, nne, ndim]`.
pub type ElementVectors<T> = DenseArray<T, 3>;

/// Dense element matrices, with shape `[nelem, nne * ndim, nne * ndim]`.
pub type ElementMatrices<T> = DenseArray<T, 3>;

/// A second-order tensor at every integration point, with shape `[nelem, nip, ndim, ndim]`.
pub type QuadratureTensors<T> = DenseArray<T, 4>;

impl<T, const RANK: usize> DenseArray<T, RANK> {
    /// Wraps row-major `data` with the given shape.
    ///
    /// Fails if `data.len()` is not the product of the shape.
    pub fn from_vec(shape: [usize; RANK], data: Vec<T>) -> Result<Self> {
        let len = shape.iter().product();
        if data.len() != len {
            return Err(Error::dimension_mismatch("array data", &[len], &[data.len()]));
        }
        Ok(Self { shape, data })
    }

    /// Builds an array by evaluating `f` at every multi-index, in row-major order.
    pub fn from_fn(shape: [usize; RANK], mut f: impl FnMut([usize; RANK]) -> T) -> Self {
        let len = shape.iter().product();
        let mut data = Vec::with_capacity(len);
        let mut index = [0; RANK];
        for _ in 0..len {
            data.push(f(index));
            // Advance the multi-index, last axis fastest
            for axis in (0..RANK).rev() {
                index[axis] += 1;
                if index[axis] < shape[axis] {
                    break;
                }
                index[axis] = 0;
            }
        }
        Self { shape, data }
    }

    pub fn shape(&self) -> [usize; RANK] {
        self.shape
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// The contiguous block of entries whose first index is `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i` is out of bounds.
    pub fn block(&self, i: usize) -> &[T] {
        let stride = self.outer_stride();
        &self.data[i * stride..(i + 1) * stride]
    }

    /// Mutable version of [`block`](Self::block).
    pub fn block_mut(&mut self, i: usize) -> &mut [T] {
        let stride = self.outer_stride();
        &mut self.data[i * stride..(i + 1) * stride]
    }

    fn outer_stride(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    fn flat_index(&self, index: [usize; RANK]) -> usize {
        let mut flat = 0;
        for (axis, (&i, &n)) in index.iter().zip(&self.shape).enumerate() {
            assert!(i < n, "index {i} out of bounds for axis {axis} with length {n}");
            flat = flat * n + i;
        }
        flat
    }

    pub(crate) fn check_shape(&self, name: &'static str, expected: [usize; RANK]) -> Result<()> {
        check_shape(name, &expected, &self.shape)
    }
}

impl<T: Clone, const RANK: usize> DenseArray<T, RANK> {
    pub fn from_element(shape: [usize; RANK], value: T) -> Self {
        let len = shape.iter().product();
        Self {
            shape,
            data: vec![value; len],
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T: Clone + Zero, const RANK: usize> DenseArray<T, RANK> {
    pub fn zeros(shape: [usize; RANK]) -> Self {
        Self::from_element(shape, T::zero())
    }
}

impl<T: Scalar> DenseArray<T, 3> {
    /// Copies the matrix `self[i, :, :]`.
    pub fn matrix(&self, i: usize) -> DMatrix<T> {
        DMatrix::from_row_slice(self.shape[1], self.shape[2], self.block(i))
    }
}

impl<T, const RANK: usize> Index<[usize; RANK]> for DenseArray<T, RANK> {
    type Output = T;

    fn index(&self, index: [usize; RANK]) -> &T {
        &self.data[self.flat_index(index)]
    }
}

impl<T, const RANK: usize> IndexMut<[usize; RANK]> for DenseArray<T, RANK> {
    fn index_mut(&mut self, index: [usize; RANK]) -> &mut T {
        let flat = self.flat_index(index);
        &mut self.data[flat]
    }
}
