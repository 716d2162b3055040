//! Lumped (diagonal) operators over a partitioned DOF space.
use crate::array::{ElementMatrices, ElementVectors};
use crate::error::{check_shape, Error, Result};
use crate::vector::Vector;
use crate::Real;
use itertools::izip;
use log::debug;
use nalgebra::{DVector, Scalar};
use serde::{Deserialize, Serialize};

/// Settings for [`MatrixDiagonal::solve_with`].
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagonalSolveOptions {
    /// Split the solution into its unknown and prescribed partitions.
    pub partitioned: bool,
    /// Diagonal entries with magnitude at or below this value are treated as zero.
    pub zero_tolerance: f64,
}

impl Default for DiagonalSolveOptions {
    fn default() -> Self {
        Self {
            partitioned: false,
            zero_tolerance: 0.0,
        }
    }
}

/// Result of [`MatrixDiagonal::solve_with`].
#[derive(Debug, Clone, PartialEq)]
pub enum DiagonalSolution<T: Scalar> {
    Full(DVector<T>),
    Partitioned { u: DVector<T>, p: DVector<T> },
}

/// A diagonal matrix with one entry per DOF of a [`Vector`] layout.
///
/// Entries are stored by DOF number. The partitioned accessors and solves order the unknown and
/// prescribed entries like [`Vector::iiu`] and [`Vector::iip`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixDiagonal<T: Scalar> {
    vector: Vector,
    diagonal: DVector<T>,
}

impl<T: Real> MatrixDiagonal<T> {
    /// A zero diagonal over the DOFs of `vector`.
    pub fn new(vector: &Vector) -> Self {
        Self {
            vector: vector.clone(),
            diagonal: DVector::zeros(vector.ndof()),
        }
    }

    pub fn vector(&self) -> &Vector {
        &self.vector
    }

    pub fn ndof(&self) -> usize {
        self.vector.ndof()
    }

    /// Replaces the diagonal by the assembled diagonals of the element matrices.
    ///
    /// Every element matrix must be diagonal, i.e. all off-diagonal entries exactly zero, which is
    /// the case for mass matrices integrated with a nodal rule. Nothing is modified on failure.
    pub fn assemble(&mut self, elemmat: &ElementMatrices<T>) -> Result<()> {
        let nelem = self.vector.nelem();
        let nne = self.vector.nne();
        let nd = self.vector.ndim();
        let n = nne * nd;
        elemmat.check_shape("elemmat", [nelem, n, n])?;

        let mut elemvec = ElementVectors::<T>::zeros([nelem, nne, nd]);
        for e in 0..nelem {
            let matrix = elemmat.block(e);
            let is_diagonal = matrix
                .iter()
                .enumerate()
                .all(|(k, entry)| k / n == k % n || *entry == T::zero());
            if !is_diagonal {
                return Err(Error::NonDiagonalElementMatrix { element: e });
            }
            for (a, value) in elemvec.block_mut(e).iter_mut().enumerate() {
                *value = matrix[a * n + a];
            }
        }

        self.vector
            .assemble_dofs_from_element_into(&elemvec, &mut self.diagonal)?;
        debug!("Assembled diagonal matrix with {} DOFs from {nelem} elements", self.ndof());
        Ok(())
    }

    /// Replaces the diagonal by assembling element-vector shaped diagonal contributions.
    pub fn assemble_element_vectors(&mut self, elemvec: &ElementVectors<T>) -> Result<()> {
        self.vector
            .assemble_dofs_from_element_into(elemvec, &mut self.diagonal)
    }

    /// Sets the diagonal from values indexed by DOF number.
    pub fn set(&mut self, dofval: &DVector<T>) -> Result<()> {
        check_shape("dofval", &[self.ndof()], &[dofval.len()])?;
        self.diagonal.copy_from(dofval);
        Ok(())
    }

    pub fn set_partitioned(&mut self, dofval_u: &DVector<T>, dofval_p: &DVector<T>) -> Result<()> {
        self.vector
            .as_dofs_from_parts_into(dofval_u, dofval_p, &mut self.diagonal)
    }

    /// The diagonal, indexed by DOF number.
    pub fn values(&self) -> &DVector<T> {
        &self.diagonal
    }

    pub fn values_u(&self) -> DVector<T> {
        self.select(self.vector.iiu())
    }

    pub fn values_p(&self) -> DVector<T> {
        self.select(self.vector.iip())
    }

    fn select(&self, dofs: &[usize]) -> DVector<T> {
        DVector::from_iterator(dofs.len(), dofs.iter().map(|&dof| self.diagonal[dof]))
    }

    /// Computes `b = D x`.
    pub fn dot(&self, x: &DVector<T>) -> Result<DVector<T>> {
        check_shape("x", &[self.ndof()], &[x.len()])?;
        Ok(self.diagonal.component_mul(x))
    }

    /// The unknown rows of `D x` for `x` given in partitioned form.
    pub fn dot_u(&self, x_u: &DVector<T>, x_p: &DVector<T>) -> Result<DVector<T>> {
        self.vector.check_parts(x_u, x_p)?;
        Ok(self.values_u().component_mul(x_u))
    }

    /// The prescribed rows of `D x` for `x` given in partitioned form.
    pub fn dot_p(&self, x_u: &DVector<T>, x_p: &DVector<T>) -> Result<DVector<T>> {
        self.vector.check_parts(x_u, x_p)?;
        Ok(self.values_p().component_mul(x_p))
    }

    /// Solves `D x = rhs` for all DOFs.
    ///
    /// Fails with [`Error::SingularDiagonal`] if a diagonal entry is exactly zero.
    pub fn solve(&self, rhs: &DVector<T>) -> Result<DVector<T>> {
        self.solve_full(rhs, T::zero())
    }

    /// Solves the unknown partition `D_uu x_u = rhs_u`.
    ///
    /// Only the unknown diagonal entries need to be non-zero.
    pub fn solve_u(&self, rhs_u: &DVector<T>) -> Result<DVector<T>> {
        let iiu = self.vector.iiu();
        check_shape("rhs_u", &[iiu.len()], &[rhs_u.len()])?;
        let mut x_u = DVector::<T>::zeros(iiu.len());
        for (entry, &dof, &b) in izip!(x_u.iter_mut(), iiu, rhs_u.iter()) {
            *entry = self.divide(dof, b, T::zero())?;
        }
        Ok(x_u)
    }

    /// Solves `D x = rhs` for all DOFs according to `options`.
    ///
    /// An exactly zero diagonal entry is singular whatever the value of `zero_tolerance`.
    pub fn solve_with(&self, rhs: &DVector<T>, options: &DiagonalSolveOptions) -> Result<DiagonalSolution<T>> {
        let tolerance: T = nalgebra::convert(options.zero_tolerance);
        let x = self.solve_full(rhs, tolerance)?;
        if options.partitioned {
            let u = DVector::from_iterator(self.vector.nnu(), self.vector.iiu().iter().map(|&dof| x[dof]));
            let p = DVector::from_iterator(self.vector.nnp(), self.vector.iip().iter().map(|&dof| x[dof]));
            Ok(DiagonalSolution::Partitioned { u, p })
        } else {
            Ok(DiagonalSolution::Full(x))
        }
    }

    fn solve_full(&self, rhs: &DVector<T>, tolerance: T) -> Result<DVector<T>> {
        check_shape("rhs", &[self.ndof()], &[rhs.len()])?;
        let mut x = DVector::<T>::zeros(self.ndof());
        for (dof, (entry, &b)) in x.iter_mut().zip(rhs.iter()).enumerate() {
            *entry = self.divide(dof, b, tolerance)?;
        }
        Ok(x)
    }

    fn divide(&self, dof: usize, b: T, tolerance: T) -> Result<T> {
        let d = self.diagonal[dof];
        if d == T::zero() || d.abs() <= tolerance {
            Err(Error::SingularDiagonal { dof })
        } else {
            Ok(b / d)
        }
    }
}
