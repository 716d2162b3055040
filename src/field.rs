//! Tagged field representations with explicit overwrite and additive conversions.
//!
//! [`Vector`] exposes one named function per ordered pair of representations. [`Field`] wraps
//! the three representations in a single type so that a driver can hold "some vector field" and
//! convert it with [`Vector::convert`] or [`Vector::assemble`], keeping the choice between
//! overwrite and additive semantics visible at the call site.
use crate::array::ElementVectors;
use crate::error::Result;
use crate::vector::Vector;
use crate::Real;
use nalgebra::{DMatrix, DVector, Scalar};
use serde::{Deserialize, Serialize};

/// A vector field on a mesh in one of its three representations.
#[derive(Debug, Clone, PartialEq)]
pub enum Field<T: Scalar> {
    /// DOF values split into the unknown (`u`) and prescribed (`p`) partitions.
    Dof { u: DVector<T>, p: DVector<T> },
    /// One row per node, `[nnode, ndim]`.
    Node(DMatrix<T>),
    /// One nodal vector per element and local node, `[nelem, nne, ndim]`.
    Element(ElementVectors<T>),
}

/// Tag identifying a [`Field`] representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    Dof,
    Node,
    Element,
}

impl<T: Scalar> Field<T> {
    pub fn representation(&self) -> Representation {
        match self {
            Self::Dof { .. } => Representation::Dof,
            Self::Node(_) => Representation::Node,
            Self::Element(_) => Representation::Element,
        }
    }
}

impl Vector {
    /// Converts `field` into the `target` representation with overwrite semantics.
    ///
    /// Converting an element field to DOF or node form keeps the value of the last element
    /// visiting each node, see [`as_node_from_element`](Self::as_node_from_element).
    /// Converting to the field's own representation validates its shape and returns a copy.
    pub fn convert<T: Real>(&self, field: &Field<T>, target: Representation) -> Result<Field<T>> {
        match (field, target) {
            (Field::Dof { u, p }, Representation::Dof) => {
                self.check_parts(u, p)?;
                Ok(field.clone())
            }
            (Field::Dof { u, p }, Representation::Node) => self.as_node_from_parts(u, p).map(Field::Node),
            (Field::Dof { u, p }, Representation::Element) => self.as_element_from_parts(u, p).map(Field::Element),
            (Field::Node(nodevec), Representation::Dof) => Ok(Field::Dof {
                u: self.as_dofs_u_from_node(nodevec)?,
                p: self.as_dofs_p_from_node(nodevec)?,
            }),
            (Field::Node(nodevec), Representation::Node) => {
                self.check_nodevec("nodevec", nodevec)?;
                Ok(field.clone())
            }
            (Field::Node(nodevec), Representation::Element) => self.as_element_from_node(nodevec).map(Field::Element),
            (Field::Element(elemvec), Representation::Dof) => Ok(Field::Dof {
                u: self.as_dofs_u_from_element(elemvec)?,
                p: self.as_dofs_p_from_element(elemvec)?,
            }),
            (Field::Element(elemvec), Representation::Node) => self.as_node_from_element(elemvec).map(Field::Node),
            (Field::Element(elemvec), Representation::Element) => {
                self.check_elemvec("elemvec", elemvec)?;
                Ok(field.clone())
            }
        }
    }

    /// Converts `field` into the `target` representation with additive semantics.
    ///
    /// Only element-to-node, element-to-DOF and node-to-DOF have destinations that receive
    /// several contributions. All other pairs coincide with [`convert`](Self::convert).
    pub fn assemble<T: Real>(&self, field: &Field<T>, target: Representation) -> Result<Field<T>> {
        match (field, target) {
            (Field::Node(nodevec), Representation::Dof) => Ok(Field::Dof {
                u: self.assemble_dofs_u_from_node(nodevec)?,
                p: self.assemble_dofs_p_from_node(nodevec)?,
            }),
            (Field::Element(elemvec), Representation::Dof) => Ok(Field::Dof {
                u: self.assemble_dofs_u_from_element(elemvec)?,
                p: self.assemble_dofs_p_from_element(elemvec)?,
            }),
            (Field::Element(elemvec), Representation::Node) => {
                self.assemble_node_from_element(elemvec).map(Field::Node)
            }
            _ => self.convert(field, target),
        }
    }
}
