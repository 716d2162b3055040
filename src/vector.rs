//! Conversion and assembly between DOF values, node vectors and element vectors.
//!
//! Notation:
//!
//! | name       | type                  | shape                 |
//! |------------|-----------------------|-----------------------|
//! | `dofval`   | [`DVector`]           | `[ndof]`              |
//! | `dofval_u` | [`DVector`]           | `[nnu]` (unknown)     |
//! | `dofval_p` | [`DVector`]           | `[nnp]` (prescribed)  |
//! | `nodevec`  | [`DMatrix`]           | `[nnode, ndim]`       |
//! | `elemvec`  | [`ElementVectors`]    | `[nelem, nne, ndim]`  |
//!
//! Two families of operations are provided. The `as_*` functions *overwrite*: every destination
//! entry is set from a source entry, and when several source entries map to the same destination
//! (a node shared by several elements) the one visited last wins. Elements are visited in
//! ascending order, then local nodes in ascending order, so the outcome is deterministic, but
//! which value survives is an artifact of that order: only use the `as_*` element-to-global
//! functions for fields that are single-valued by construction. The `assemble_*` functions
//! *add*: every contribution is summed into its destination, in the same deterministic order,
//! starting from zero.
//!
//! Every operation has an `_into` form writing into a caller-allocated buffer. The buffer shape
//! is validated before anything is written, the buffer is cleared, and no allocation happens.
use crate::array::ElementVectors;
use crate::error::{check_shape, Error, Result};
use crate::Real;
use log::{debug, trace};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

/// DOF numbering of a mesh, partitioned into unknown and prescribed DOFs.
///
/// The DOFs are renumbered once at construction (see [`part`](Self::part)) such that the unknown
/// DOFs come first, in ascending order of their original number, followed by the prescribed
/// DOFs in the order in which they were given. `dofval_u[k]` therefore always belongs to
/// `iiu()[k]` and `dofval_p[k]` to `iip()[k]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vector {
    conn: DMatrix<usize>,
    dofs: DMatrix<usize>,
    part: DMatrix<usize>,
    iiu: Vec<usize>,
    iip: Vec<usize>,
    nelem: usize,
    nne: usize,
    nnode: usize,
    ndim: usize,
    ndof: usize,
    nnu: usize,
    nnp: usize,
    // Node n is referenced by the (element, local node) pairs
    // incidence[incidence_offsets[n]..incidence_offsets[n + 1]], sorted by element
    incidence_offsets: Vec<usize>,
    incidence: Vec<(usize, usize)>,
}

/// Selects which DOFs a DOF-space operation reads or writes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum DofSet {
    All,
    Unknown,
    Prescribed,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Accumulate {
    Overwrite,
    Add,
}

impl Vector {
    /// Constructs the DOF layout without prescribed DOFs.
    ///
    /// `conn` is the `[nelem, nne]` connectivity and `dofs` the `[nnode, ndim]` DOF numbers.
    pub fn new(conn: DMatrix<usize>, dofs: DMatrix<usize>) -> Result<Self> {
        Self::with_prescribed(conn, dofs, &[])
    }

    /// Constructs the DOF layout with the prescribed DOFs `iip`.
    ///
    /// Fails if `conn` references a node outside `[0, nnode)`, if `dofs` is not a permutation of
    /// `[0, nnode * ndim)`, or if `iip` contains duplicates or DOFs outside that range.
    pub fn with_prescribed(conn: DMatrix<usize>, dofs: DMatrix<usize>, iip: &[usize]) -> Result<Self> {
        let (nelem, nne) = conn.shape();
        let (nnode, ndim) = dofs.shape();
        let ndof = nnode * ndim;

        if let Some(&node) = conn.iter().find(|&&node| node >= nnode) {
            return Err(Error::IndexOutOfBounds {
                name: "conn",
                index: node,
                bound: nnode,
            });
        }
        // `dofs` has exactly `ndof` entries, so uniqueness within range makes it a permutation
        check_unique_indices("dofs", dofs.iter().copied(), ndof)?;

        let mut is_prescribed = vec![false; ndof];
        check_unique_indices("iip", iip.iter().copied(), ndof)?;
        for &dof in iip {
            is_prescribed[dof] = true;
        }

        let iiu: Vec<usize> = (0..ndof).filter(|&dof| !is_prescribed[dof]).collect();
        let iip = iip.to_vec();
        let nnu = iiu.len();
        let nnp = iip.len();

        let mut renumbered = vec![0; ndof];
        for (k, &dof) in iiu.iter().enumerate() {
            renumbered[dof] = k;
        }
        for (k, &dof) in iip.iter().enumerate() {
            renumbered[dof] = nnu + k;
        }
        let part = dofs.map(|dof| renumbered[dof]);

        let mut incidence_offsets = vec![0; nnode + 1];
        for &node in conn.iter() {
            incidence_offsets[node + 1] += 1;
        }
        for n in 0..nnode {
            incidence_offsets[n + 1] += incidence_offsets[n];
        }
        let mut incidence = vec![(0, 0); nelem * nne];
        let mut cursor = incidence_offsets.clone();
        for e in 0..nelem {
            for m in 0..nne {
                let node = conn[(e, m)];
                incidence[cursor[node]] = (e, m);
                cursor[node] += 1;
            }
        }

        debug!("Partitioned {ndof} DOFs of {nnode} nodes into {nnu} unknown and {nnp} prescribed DOFs");

        Ok(Self {
            conn,
            dofs,
            part,
            iiu,
            iip,
            nelem,
            nne,
            nnode,
            ndim,
            ndof,
            nnu,
            nnp,
            incidence_offsets,
            incidence,
        })
    }

    /// Number of elements.
    pub fn nelem(&self) -> usize {
        self.nelem
    }

    /// Number of nodes per element.
    pub fn nne(&self) -> usize {
        self.nne
    }

    /// Number of nodes.
    pub fn nnode(&self) -> usize {
        self.nnode
    }

    /// Number of spatial dimensions, i.e. DOFs per node.
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Number of DOFs.
    pub fn ndof(&self) -> usize {
        self.ndof
    }

    /// Number of unknown DOFs.
    pub fn nnu(&self) -> usize {
        self.nnu
    }

    /// Number of prescribed DOFs.
    pub fn nnp(&self) -> usize {
        self.nnp
    }

    pub fn conn(&self) -> &DMatrix<usize> {
        &self.conn
    }

    pub fn dofs(&self) -> &DMatrix<usize> {
        &self.dofs
    }

    /// Unknown DOFs, in ascending order.
    pub fn iiu(&self) -> &[usize] {
        &self.iiu
    }

    /// Prescribed DOFs, in the order given at construction.
    pub fn iip(&self) -> &[usize] {
        &self.iip
    }

    /// The partitioned DOF numbers `[nnode, ndim]`: unknown DOFs in `[0, nnu)`, prescribed DOFs
    /// in `[nnu, ndof)`.
    pub fn part(&self) -> &DMatrix<usize> {
        &self.part
    }

    /// The (element, local node) pairs referencing `node`, ordered by element.
    ///
    /// # Panics
    ///
    /// Panics if `node` is not less than [`Vector::nnode`].
    pub fn incident_elements(&self, node: usize) -> &[(usize, usize)] {
        &self.incidence[self.incidence_offsets[node]..self.incidence_offsets[node + 1]]
    }

    fn dof_set_len(&self, set: DofSet) -> usize {
        match set {
            DofSet::All => self.ndof,
            DofSet::Unknown => self.nnu,
            DofSet::Prescribed => self.nnp,
        }
    }

    /// The index of DOF `(node, i)` in a vector over `set`, if the DOF belongs to the set.
    fn dof_index(&self, set: DofSet, node: usize, i: usize) -> Option<usize> {
        match set {
            DofSet::All => Some(self.dofs[(node, i)]),
            DofSet::Unknown => Some(self.part[(node, i)]).filter(|&d| d < self.nnu),
            DofSet::Prescribed => self.part[(node, i)].checked_sub(self.nnu),
        }
    }

    fn check_dofval<T: Real>(&self, name: &'static str, dofval: &DVector<T>, set: DofSet) -> Result<()> {
        check_shape(name, &[self.dof_set_len(set)], &[dofval.len()])
    }

    pub(crate) fn check_nodevec<T: Real>(&self, name: &'static str, nodevec: &DMatrix<T>) -> Result<()> {
        check_shape(name, &[self.nnode, self.ndim], &[nodevec.nrows(), nodevec.ncols()])
    }

    pub(crate) fn check_elemvec<T: Real>(&self, name: &'static str, elemvec: &ElementVectors<T>) -> Result<()> {
        elemvec.check_shape(name, [self.nelem, self.nne, self.ndim])
    }

    pub(crate) fn check_parts<T: Real>(&self, dofval_u: &DVector<T>, dofval_p: &DVector<T>) -> Result<()> {
        self.check_dofval("dofval_u", dofval_u, DofSet::Unknown)?;
        self.check_dofval("dofval_p", dofval_p, DofSet::Prescribed)
    }

    fn zeros_dofval<T: Real>(&self, set: DofSet) -> DVector<T> {
        DVector::zeros(self.dof_set_len(set))
    }

    fn zeros_nodevec<T: Real>(&self) -> DMatrix<T> {
        DMatrix::zeros(self.nnode, self.ndim)
    }

    fn zeros_elemvec<T: Real>(&self) -> ElementVectors<T> {
        ElementVectors::zeros([self.nelem, self.nne, self.ndim])
    }

    /// Value of DOF `(node, i)` taken from the unknown and prescribed partitions.
    fn part_value<T: Real>(&self, dofval_u: &DVector<T>, dofval_p: &DVector<T>, node: usize, i: usize) -> T {
        let d = self.part[(node, i)];
        if d < self.nnu {
            dofval_u[d]
        } else {
            dofval_p[d - self.nnu]
        }
    }

    fn scatter_node<T: Real>(&self, nodevec: &DMatrix<T>, out: &mut [T], set: DofSet, mode: Accumulate) {
        out.fill(T::zero());
        for node in 0..self.nnode {
            for i in 0..self.ndim {
                if let Some(k) = self.dof_index(set, node, i) {
                    accumulate(&mut out[k], nodevec[(node, i)], mode);
                }
            }
        }
    }

    /// Writes element values into `out`, where `target(node, i)` gives the destination index.
    fn scatter_element<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        out: &mut [T],
        mode: Accumulate,
        target: impl Fn(usize, usize) -> Option<usize>,
    ) {
        out.fill(T::zero());
        for e in 0..self.nelem {
            let values = elemvec.block(e);
            for m in 0..self.nne {
                let node = self.conn[(e, m)];
                for i in 0..self.ndim {
                    if let Some(k) = target(node, i) {
                        accumulate(&mut out[k], values[m * self.ndim + i], mode);
                    }
                }
            }
        }
    }

    fn gather_node<T: Real>(&self, nodevec: &mut DMatrix<T>, source: impl Fn(usize, usize) -> T) {
        for node in 0..self.nnode {
            for i in 0..self.ndim {
                nodevec[(node, i)] = source(node, i);
            }
        }
    }

    fn gather_element<T: Real>(&self, elemvec: &mut ElementVectors<T>, source: impl Fn(usize, usize) -> T) {
        for e in 0..self.nelem {
            let values = elemvec.block_mut(e);
            for m in 0..self.nne {
                let node = self.conn[(e, m)];
                for i in 0..self.ndim {
                    values[m * self.ndim + i] = source(node, i);
                }
            }
        }
    }
}

fn accumulate<T: Real>(entry: &mut T, value: T, mode: Accumulate) {
    match mode {
        Accumulate::Overwrite => *entry = value,
        Accumulate::Add => *entry += value,
    }
}

fn check_unique_indices(name: &'static str, indices: impl IntoIterator<Item = usize>, bound: usize) -> Result<()> {
    let mut seen = vec![false; bound];
    for index in indices {
        if index >= bound {
            return Err(Error::IndexOutOfBounds { name, index, bound });
        }
        if seen[index] {
            return Err(Error::DuplicateIndex { name, index });
        }
        seen[index] = true;
    }
    Ok(())
}

/// Conversions with overwrite semantics.
impl Vector {
    /// Combines the unknown and prescribed partitions into full DOF values.
    pub fn as_dofs_from_parts<T: Real>(&self, dofval_u: &DVector<T>, dofval_p: &DVector<T>) -> Result<DVector<T>> {
        let mut dofval = self.zeros_dofval(DofSet::All);
        self.as_dofs_from_parts_into(dofval_u, dofval_p, &mut dofval)?;
        Ok(dofval)
    }

    pub fn as_dofs_from_parts_into<T: Real>(
        &self,
        dofval_u: &DVector<T>,
        dofval_p: &DVector<T>,
        dofval: &mut DVector<T>,
    ) -> Result<()> {
        self.check_parts(dofval_u, dofval_p)?;
        self.check_dofval("dofval", dofval, DofSet::All)?;
        for (&dof, value) in self.iiu.iter().zip(dofval_u.iter()) {
            dofval[dof] = *value;
        }
        for (&dof, value) in self.iip.iter().zip(dofval_p.iter()) {
            dofval[dof] = *value;
        }
        Ok(())
    }

    pub fn as_dofs_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<DVector<T>> {
        let mut dofval = self.zeros_dofval(DofSet::All);
        self.as_dofs_from_node_into(nodevec, &mut dofval)?;
        Ok(dofval)
    }

    pub fn as_dofs_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, dofval: &mut DVector<T>) -> Result<()> {
        self.as_dof_set_from_node_into(nodevec, dofval, DofSet::All)
    }

    pub fn as_dofs_u_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<DVector<T>> {
        let mut dofval_u = self.zeros_dofval(DofSet::Unknown);
        self.as_dofs_u_from_node_into(nodevec, &mut dofval_u)?;
        Ok(dofval_u)
    }

    pub fn as_dofs_u_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, dofval_u: &mut DVector<T>) -> Result<()> {
        self.as_dof_set_from_node_into(nodevec, dofval_u, DofSet::Unknown)
    }

    pub fn as_dofs_p_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<DVector<T>> {
        let mut dofval_p = self.zeros_dofval(DofSet::Prescribed);
        self.as_dofs_p_from_node_into(nodevec, &mut dofval_p)?;
        Ok(dofval_p)
    }

    pub fn as_dofs_p_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, dofval_p: &mut DVector<T>) -> Result<()> {
        self.as_dof_set_from_node_into(nodevec, dofval_p, DofSet::Prescribed)
    }

    fn as_dof_set_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, out: &mut DVector<T>, set: DofSet) -> Result<()> {
        self.check_nodevec("nodevec", nodevec)?;
        self.check_dofval("dofval", out, set)?;
        self.scatter_node(nodevec, out.as_mut_slice(), set, Accumulate::Overwrite);
        Ok(())
    }

    /// DOF values from element vectors; for shared nodes the last element wins.
    pub fn as_dofs_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        let mut dofval = self.zeros_dofval(DofSet::All);
        self.as_dofs_from_element_into(elemvec, &mut dofval)?;
        Ok(dofval)
    }

    pub fn as_dofs_from_element_into<T: Real>(&self, elemvec: &ElementVectors<T>, dofval: &mut DVector<T>) -> Result<()> {
        self.dof_set_from_element_into(elemvec, dofval, DofSet::All, Accumulate::Overwrite)
    }

    pub fn as_dofs_u_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        let mut dofval_u = self.zeros_dofval(DofSet::Unknown);
        self.as_dofs_u_from_element_into(elemvec, &mut dofval_u)?;
        Ok(dofval_u)
    }

    pub fn as_dofs_u_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        dofval_u: &mut DVector<T>,
    ) -> Result<()> {
        self.dof_set_from_element_into(elemvec, dofval_u, DofSet::Unknown, Accumulate::Overwrite)
    }

    pub fn as_dofs_p_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        let mut dofval_p = self.zeros_dofval(DofSet::Prescribed);
        self.as_dofs_p_from_element_into(elemvec, &mut dofval_p)?;
        Ok(dofval_p)
    }

    pub fn as_dofs_p_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        dofval_p: &mut DVector<T>,
    ) -> Result<()> {
        self.dof_set_from_element_into(elemvec, dofval_p, DofSet::Prescribed, Accumulate::Overwrite)
    }

    fn dof_set_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        out: &mut DVector<T>,
        set: DofSet,
        mode: Accumulate,
    ) -> Result<()> {
        self.check_elemvec("elemvec", elemvec)?;
        self.check_dofval("dofval", out, set)?;
        self.scatter_element(elemvec, out.as_mut_slice(), mode, |node, i| self.dof_index(set, node, i));
        Ok(())
    }

    pub fn as_node_from_dofs<T: Real>(&self, dofval: &DVector<T>) -> Result<DMatrix<T>> {
        let mut nodevec = self.zeros_nodevec();
        self.as_node_from_dofs_into(dofval, &mut nodevec)?;
        Ok(nodevec)
    }

    pub fn as_node_from_dofs_into<T: Real>(&self, dofval: &DVector<T>, nodevec: &mut DMatrix<T>) -> Result<()> {
        self.check_dofval("dofval", dofval, DofSet::All)?;
        self.check_nodevec("nodevec", nodevec)?;
        self.gather_node(nodevec, |node, i| dofval[self.dofs[(node, i)]]);
        Ok(())
    }

    pub fn as_node_from_parts<T: Real>(&self, dofval_u: &DVector<T>, dofval_p: &DVector<T>) -> Result<DMatrix<T>> {
        let mut nodevec = self.zeros_nodevec();
        self.as_node_from_parts_into(dofval_u, dofval_p, &mut nodevec)?;
        Ok(nodevec)
    }

    pub fn as_node_from_parts_into<T: Real>(
        &self,
        dofval_u: &DVector<T>,
        dofval_p: &DVector<T>,
        nodevec: &mut DMatrix<T>,
    ) -> Result<()> {
        self.check_parts(dofval_u, dofval_p)?;
        self.check_nodevec("nodevec", nodevec)?;
        self.gather_node(nodevec, |node, i| self.part_value(dofval_u, dofval_p, node, i));
        Ok(())
    }

    /// Node vectors from element vectors; for shared nodes the last element wins.
    pub fn as_node_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DMatrix<T>> {
        let mut nodevec = self.zeros_nodevec();
        self.as_node_from_element_into(elemvec, &mut nodevec)?;
        Ok(nodevec)
    }

    pub fn as_node_from_element_into<T: Real>(&self, elemvec: &ElementVectors<T>, nodevec: &mut DMatrix<T>) -> Result<()> {
        self.node_from_element_into(elemvec, nodevec, Accumulate::Overwrite)
    }

    fn node_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        nodevec: &mut DMatrix<T>,
        mode: Accumulate,
    ) -> Result<()> {
        self.check_elemvec("elemvec", elemvec)?;
        self.check_nodevec("nodevec", nodevec)?;
        // Column-major storage: entry (node, i) lives at node + i * nnode
        let nnode = self.nnode;
        self.scatter_element(elemvec, nodevec.as_mut_slice(), mode, |node, i| Some(node + i * nnode));
        Ok(())
    }

    pub fn as_element_from_dofs<T: Real>(&self, dofval: &DVector<T>) -> Result<ElementVectors<T>> {
        let mut elemvec = self.zeros_elemvec();
        self.as_element_from_dofs_into(dofval, &mut elemvec)?;
        Ok(elemvec)
    }

    pub fn as_element_from_dofs_into<T: Real>(&self, dofval: &DVector<T>, elemvec: &mut ElementVectors<T>) -> Result<()> {
        self.check_dofval("dofval", dofval, DofSet::All)?;
        self.check_elemvec("elemvec", elemvec)?;
        self.gather_element(elemvec, |node, i| dofval[self.dofs[(node, i)]]);
        Ok(())
    }

    pub fn as_element_from_parts<T: Real>(
        &self,
        dofval_u: &DVector<T>,
        dofval_p: &DVector<T>,
    ) -> Result<ElementVectors<T>> {
        let mut elemvec = self.zeros_elemvec();
        self.as_element_from_parts_into(dofval_u, dofval_p, &mut elemvec)?;
        Ok(elemvec)
    }

    pub fn as_element_from_parts_into<T: Real>(
        &self,
        dofval_u: &DVector<T>,
        dofval_p: &DVector<T>,
        elemvec: &mut ElementVectors<T>,
    ) -> Result<()> {
        self.check_parts(dofval_u, dofval_p)?;
        self.check_elemvec("elemvec", elemvec)?;
        self.gather_element(elemvec, |node, i| self.part_value(dofval_u, dofval_p, node, i));
        Ok(())
    }

    pub fn as_element_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<ElementVectors<T>> {
        let mut elemvec = self.zeros_elemvec();
        self.as_element_from_node_into(nodevec, &mut elemvec)?;
        Ok(elemvec)
    }

    pub fn as_element_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, elemvec: &mut ElementVectors<T>) -> Result<()> {
        self.check_nodevec("nodevec", nodevec)?;
        self.check_elemvec("elemvec", elemvec)?;
        self.gather_element(elemvec, |node, i| nodevec[(node, i)]);
        Ok(())
    }
}

/// Assembly with additive semantics.
impl Vector {
    pub fn assemble_dofs_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<DVector<T>> {
        let mut dofval = self.zeros_dofval(DofSet::All);
        self.assemble_dofs_from_node_into(nodevec, &mut dofval)?;
        Ok(dofval)
    }

    pub fn assemble_dofs_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, dofval: &mut DVector<T>) -> Result<()> {
        self.assemble_dof_set_from_node_into(nodevec, dofval, DofSet::All)
    }

    pub fn assemble_dofs_u_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<DVector<T>> {
        let mut dofval_u = self.zeros_dofval(DofSet::Unknown);
        self.assemble_dofs_u_from_node_into(nodevec, &mut dofval_u)?;
        Ok(dofval_u)
    }

    pub fn assemble_dofs_u_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, dofval_u: &mut DVector<T>) -> Result<()> {
        self.assemble_dof_set_from_node_into(nodevec, dofval_u, DofSet::Unknown)
    }

    pub fn assemble_dofs_p_from_node<T: Real>(&self, nodevec: &DMatrix<T>) -> Result<DVector<T>> {
        let mut dofval_p = self.zeros_dofval(DofSet::Prescribed);
        self.assemble_dofs_p_from_node_into(nodevec, &mut dofval_p)?;
        Ok(dofval_p)
    }

    pub fn assemble_dofs_p_from_node_into<T: Real>(&self, nodevec: &DMatrix<T>, dofval_p: &mut DVector<T>) -> Result<()> {
        self.assemble_dof_set_from_node_into(nodevec, dofval_p, DofSet::Prescribed)
    }

    fn assemble_dof_set_from_node_into<T: Real>(
        &self,
        nodevec: &DMatrix<T>,
        out: &mut DVector<T>,
        set: DofSet,
    ) -> Result<()> {
        self.check_nodevec("nodevec", nodevec)?;
        self.check_dofval("dofval", out, set)?;
        self.scatter_node(nodevec, out.as_mut_slice(), set, Accumulate::Add);
        Ok(())
    }

    /// Sums the contributions of all elements into DOF values.
    pub fn assemble_dofs_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        let mut dofval = self.zeros_dofval(DofSet::All);
        self.assemble_dofs_from_element_into(elemvec, &mut dofval)?;
        Ok(dofval)
    }

    pub fn assemble_dofs_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        dofval: &mut DVector<T>,
    ) -> Result<()> {
        self.dof_set_from_element_into(elemvec, dofval, DofSet::All, Accumulate::Add)
    }

    pub fn assemble_dofs_u_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        let mut dofval_u = self.zeros_dofval(DofSet::Unknown);
        self.assemble_dofs_u_from_element_into(elemvec, &mut dofval_u)?;
        Ok(dofval_u)
    }

    pub fn assemble_dofs_u_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        dofval_u: &mut DVector<T>,
    ) -> Result<()> {
        self.dof_set_from_element_into(elemvec, dofval_u, DofSet::Unknown, Accumulate::Add)
    }

    pub fn assemble_dofs_p_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        let mut dofval_p = self.zeros_dofval(DofSet::Prescribed);
        self.assemble_dofs_p_from_element_into(elemvec, &mut dofval_p)?;
        Ok(dofval_p)
    }

    pub fn assemble_dofs_p_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        dofval_p: &mut DVector<T>,
    ) -> Result<()> {
        self.dof_set_from_element_into(elemvec, dofval_p, DofSet::Prescribed, Accumulate::Add)
    }

    /// Sums the contributions of all elements into node vectors.
    pub fn assemble_node_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DMatrix<T>> {
        let mut nodevec = self.zeros_nodevec();
        self.assemble_node_from_element_into(elemvec, &mut nodevec)?;
        Ok(nodevec)
    }

    pub fn assemble_node_from_element_into<T: Real>(
        &self,
        elemvec: &ElementVectors<T>,
        nodevec: &mut DMatrix<T>,
    ) -> Result<()> {
        self.node_from_element_into(elemvec, nodevec, Accumulate::Add)
    }
}

/// Parallel assembly.
///
/// Every node sums its incident element contributions on its own, in the same order as the
/// serial functions, so the results are bitwise identical to their serial counterparts.
impl Vector {
    pub fn par_assemble_node_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DMatrix<T>> {
        self.check_elemvec("elemvec", elemvec)?;
        let sums = self.par_node_sums(elemvec);
        Ok(DMatrix::from_row_slice(self.nnode, self.ndim, &sums))
    }

    pub fn par_assemble_dofs_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        self.par_assemble_dof_set_from_element(elemvec, DofSet::All)
    }

    pub fn par_assemble_dofs_u_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        self.par_assemble_dof_set_from_element(elemvec, DofSet::Unknown)
    }

    pub fn par_assemble_dofs_p_from_element<T: Real>(&self, elemvec: &ElementVectors<T>) -> Result<DVector<T>> {
        self.par_assemble_dof_set_from_element(elemvec, DofSet::Prescribed)
    }

    fn par_assemble_dof_set_from_element<T: Real>(&self, elemvec: &ElementVectors<T>, set: DofSet) -> Result<DVector<T>> {
        self.check_elemvec("elemvec", elemvec)?;
        let sums = self.par_node_sums(elemvec);
        let mut out = self.zeros_dofval(set);
        for node in 0..self.nnode {
            for i in 0..self.ndim {
                if let Some(k) = self.dof_index(set, node, i) {
                    out[k] = sums[node * self.ndim + i];
                }
            }
        }
        Ok(out)
    }

    /// Row-major `[nnode, ndim]` sums of the element contributions at every node.
    fn par_node_sums<T: Real>(&self, elemvec: &ElementVectors<T>) -> Vec<T> {
        let nd = self.ndim;
        let mut sums = vec![T::zero(); self.nnode * nd];
        if nd == 0 {
            return sums;
        }
        trace!("Assembling {} elements into {} nodes in parallel", self.nelem, self.nnode);
        sums.par_chunks_mut(nd).enumerate().for_each(|(node, sum)| {
            for &(e, m) in self.incident_elements(node) {
                let values = &elemvec.block(e)[m * nd..(m + 1) * nd];
                for (s, v) in sum.iter_mut().zip(values) {
                    *s += *v;
                }
            }
        });
        sums
    }
}
