//! Numerical integration over all elements of a mesh.
//!
//! Conventions for the arrays consumed and produced here:
//!
//! | name      | type                                 | shape                          |
//! |-----------|--------------------------------------|--------------------------------|
//! | `elemvec` | [`ElementVectors`]                   | `[nelem, nne, ndim]`           |
//! | `elemmat` | [`ElementMatrices`]                  | `[nelem, nne*ndim, nne*ndim]`  |
//! | `qscalar` | [`DMatrix`]                          | `[nelem, nip]`                 |
//! | `qtensor` | [`QuadratureTensors`]                | `[nelem, nip, ndim, ndim]`     |
use crate::array::{DenseArray, ElementMatrices, ElementVectors, QuadratureTensors};
use crate::element::ReferenceElement;
use crate::error::{check_shape, Error, Result};
use crate::quadrature::QuadratureRule;
use crate::Real;
use log::debug;
use nalgebra::DMatrix;
use numeric_literals::replace_float_literals;

/// Shape functions, integration volumes and physical gradients for every element of a mesh.
///
/// The reference quantities (shape functions and their local gradients at each integration
/// point) depend only on the element type and the rule and are evaluated once. The physical
/// quantities (integration point volumes and global gradients) depend on the nodal positions
/// and are recomputed by [`update_x`](Self::update_x), and only there.
#[derive(Debug, Clone)]
pub struct Quadrature<T, E> {
    element: E,
    rule: QuadratureRule<T>,
    nelem: usize,
    nne: usize,
    ndim: usize,
    nip: usize,
    /// Nodal positions per element `[nelem, nne, ndim]`
    x: ElementVectors<T>,
    /// Shape functions `[nip, nne]`
    n: DMatrix<T>,
    /// Shape function gradients w.r.t. local coordinates `[nip, nne, ndim]`
    dn_dxi: DenseArray<T, 3>,
    /// Shape function gradients w.r.t. global coordinates `[nelem, nip, nne, ndim]`
    dn_dx: DenseArray<T, 4>,
    /// Integration point volumes `[nelem, nip]`
    vol: DMatrix<T>,
}

impl<T, E> Quadrature<T, E>
where
    T: Real,
    E: ReferenceElement<T>,
{
    /// Constructs the quadrature with the element's default rule.
    ///
    /// Fails if `x` does not have shape `[nelem, nne, ndim]` for the element type, or if any
    /// element is degenerate.
    pub fn new(element: E, x: ElementVectors<T>) -> Result<Self> {
        let rule = element.default_quadrature();
        Self::with_rule(element, x, rule)
    }

    /// Constructs the quadrature with a caller-supplied rule.
    pub fn with_rule(element: E, x: ElementVectors<T>, rule: QuadratureRule<T>) -> Result<Self> {
        let nne = element.num_nodes();
        let ndim = element.reference_dim();
        rule.validate()?;
        if rule.dim() != ndim {
            return Err(Error::InvalidQuadratureRule {
                reason: format!("rule has dimension {}, element has dimension {ndim}", rule.dim()),
            });
        }
        let nelem = x.shape()[0];
        x.check_shape("x", [nelem, nne, ndim])?;
        let nip = rule.num_points();

        let mut n = DMatrix::<T>::zeros(nip, nne);
        let mut dn_dxi = DenseArray::<T, 3>::zeros([nip, nne, ndim]);
        let mut basis = vec![T::zero(); nne];
        for q in 0..nip {
            element.populate_basis(&mut basis, rule.point(q));
            for (m, phi) in basis.iter().enumerate() {
                n[(q, m)] = *phi;
            }
            element.populate_basis_gradients(dn_dxi.block_mut(q), rule.point(q));
        }

        let (dn_dx, vol) = compute_dn(&x, &dn_dxi, rule.weights())?;
        debug!("Constructed quadrature: {nelem} elements, {nne} nodes per element, {nip} integration points");

        Ok(Self {
            element,
            rule,
            nelem,
            nne,
            ndim,
            nip,
            x,
            n,
            dn_dxi,
            dn_dx,
            vol,
        })
    }

    /// Replaces the nodal positions and recomputes volumes and global gradients.
    ///
    /// `x` must have the shape given at construction. On failure the previous positions and
    /// derived quantities are kept unchanged.
    pub fn update_x(&mut self, x: ElementVectors<T>) -> Result<()> {
        x.check_shape("x", [self.nelem, self.nne, self.ndim])?;
        let (dn_dx, vol) = compute_dn(&x, &self.dn_dxi, self.rule.weights())?;
        self.x = x;
        self.dn_dx = dn_dx;
        self.vol = vol;
        debug!("Updated nodal positions of {} elements", self.nelem);
        Ok(())
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn rule(&self) -> &QuadratureRule<T> {
        &self.rule
    }

    pub fn nelem(&self) -> usize {
        self.nelem
    }

    pub fn nne(&self) -> usize {
        self.nne
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn nip(&self) -> usize {
        self.nip
    }

    /// Current nodal positions `[nelem, nne, ndim]`.
    pub fn x(&self) -> &ElementVectors<T> {
        &self.x
    }

    /// Shape functions `[nip, nne]`.
    pub fn shape_functions(&self) -> &DMatrix<T> {
        &self.n
    }

    /// Shape function gradients with respect to local coordinates `[nip, nne, ndim]`.
    pub fn shape_function_gradients(&self) -> &DenseArray<T, 3> {
        &self.dn_dxi
    }

    /// Shape function gradients with respect to global coordinates `[nelem, nip, nne, ndim]`.
    pub fn shape_function_gradients_global(&self) -> &DenseArray<T, 4> {
        &self.dn_dx
    }

    fn qscalar_shape(&self) -> [usize; 2] {
        [self.nelem, self.nip]
    }

    fn qtensor_shape(&self) -> [usize; 4] {
        [self.nelem, self.nip, self.ndim, self.ndim]
    }

    fn elemvec_shape(&self) -> [usize; 3] {
        [self.nelem, self.nne, self.ndim]
    }

    fn elemmat_shape(&self) -> [usize; 3] {
        let n = self.nne * self.ndim;
        [self.nelem, n, n]
    }

    /// Integration point volumes `[nelem, nip]`.
    pub fn dv(&self) -> DMatrix<T> {
        self.vol.clone()
    }

    pub fn dv_into(&self, qscalar: &mut DMatrix<T>) -> Result<()> {
        check_shape("qscalar", &self.qscalar_shape(), &[qscalar.nrows(), qscalar.ncols()])?;
        qscalar.copy_from(&self.vol);
        Ok(())
    }

    /// Integration point volumes repeated for every tensor component `[nelem, nip, ndim, ndim]`.
    pub fn dv_tensor(&self) -> QuadratureTensors<T> {
        let mut qtensor = QuadratureTensors::zeros(self.qtensor_shape());
        self.fill_dv_tensor(&mut qtensor);
        qtensor
    }

    pub fn dv_tensor_into(&self, qtensor: &mut QuadratureTensors<T>) -> Result<()> {
        qtensor.check_shape("qtensor", self.qtensor_shape())?;
        self.fill_dv_tensor(qtensor);
        Ok(())
    }

    fn fill_dv_tensor(&self, qtensor: &mut QuadratureTensors<T>) {
        let nd2 = self.ndim * self.ndim;
        for (point, components) in qtensor.as_mut_slice().chunks_exact_mut(nd2).enumerate() {
            let (e, q) = (point / self.nip, point % self.nip);
            components.fill(self.vol[(e, q)]);
        }
    }

    /// The dyadic product `qtensor[e, q, i, j] = sum_m dNdx[e, q, m, i] * elemvec[e, m, j]`.
    ///
    /// For a displacement field this is the displacement gradient at each integration point.
    pub fn grad_n_vector(&self, elemvec: &ElementVectors<T>) -> Result<QuadratureTensors<T>> {
        let mut qtensor = QuadratureTensors::zeros(self.qtensor_shape());
        self.grad_n_vector_into(elemvec, &mut qtensor)?;
        Ok(qtensor)
    }

    pub fn grad_n_vector_into(&self, elemvec: &ElementVectors<T>, qtensor: &mut QuadratureTensors<T>) -> Result<()> {
        self.apply_grad_n_vector(elemvec, qtensor, GradientPart::Full)
    }

    /// Transpose of [`grad_n_vector`](Self::grad_n_vector).
    pub fn grad_n_vector_t(&self, elemvec: &ElementVectors<T>) -> Result<QuadratureTensors<T>> {
        let mut qtensor = QuadratureTensors::zeros(self.qtensor_shape());
        self.grad_n_vector_t_into(elemvec, &mut qtensor)?;
        Ok(qtensor)
    }

    pub fn grad_n_vector_t_into(&self, elemvec: &ElementVectors<T>, qtensor: &mut QuadratureTensors<T>) -> Result<()> {
        self.apply_grad_n_vector(elemvec, qtensor, GradientPart::Transpose)
    }

    /// Symmetric part of [`grad_n_vector`](Self::grad_n_vector).
    ///
    /// For a displacement field this is the small-strain tensor.
    pub fn sym_grad_n_vector(&self, elemvec: &ElementVectors<T>) -> Result<QuadratureTensors<T>> {
        let mut qtensor = QuadratureTensors::zeros(self.qtensor_shape());
        self.sym_grad_n_vector_into(elemvec, &mut qtensor)?;
        Ok(qtensor)
    }

    pub fn sym_grad_n_vector_into(
        &self,
        elemvec: &ElementVectors<T>,
        qtensor: &mut QuadratureTensors<T>,
    ) -> Result<()> {
        self.apply_grad_n_vector(elemvec, qtensor, GradientPart::Symmetric)
    }

    #[replace_float_literals(T::from_f64(literal).expect("Literal must fit in T"))]
    fn apply_grad_n_vector(
        &self,
        elemvec: &ElementVectors<T>,
        qtensor: &mut QuadratureTensors<T>,
        part: GradientPart,
    ) -> Result<()> {
        elemvec.check_shape("elemvec", self.elemvec_shape())?;
        qtensor.check_shape("qtensor", self.qtensor_shape())?;

        let nd = self.ndim;
        let mut gradient = DMatrix::<T>::zeros(nd, nd);
        for e in 0..self.nelem {
            let u = elemvec.block(e);
            for q in 0..self.nip {
                gradient.fill(T::zero());
                for m in 0..self.nne {
                    for i in 0..nd {
                        let dn = self.dn_dx[[e, q, m, i]];
                        for j in 0..nd {
                            gradient[(i, j)] += dn * u[m * nd + j];
                        }
                    }
                }

                for i in 0..nd {
                    for j in 0..nd {
                        qtensor[[e, q, i, j]] = match part {
                            GradientPart::Full => gradient[(i, j)],
                            GradientPart::Transpose => gradient[(j, i)],
                            GradientPart::Symmetric => 0.5 * (gradient[(i, j)] + gradient[(j, i)]),
                        };
                    }
                }
            }
        }
        Ok(())
    }

    /// Element matrices of the integral `int N_m qscalar N_n dV`.
    ///
    /// Entry `[e, m * ndim + i, n * ndim + i]` holds the integral for shape functions `m` and `n`;
    /// different vector components are not coupled. With a density as `qscalar` this is the
    /// consistent mass matrix, or the lumped mass matrix if the quadrature uses the nodal rule.
    pub fn int_n_scalar_nt_dv(&self, qscalar: &DMatrix<T>) -> Result<ElementMatrices<T>> {
        let mut elemmat = ElementMatrices::zeros(self.elemmat_shape());
        self.int_n_scalar_nt_dv_into(qscalar, &mut elemmat)?;
        Ok(elemmat)
    }

    pub fn int_n_scalar_nt_dv_into(&self, qscalar: &DMatrix<T>, elemmat: &mut ElementMatrices<T>) -> Result<()> {
        check_shape("qscalar", &self.qscalar_shape(), &[qscalar.nrows(), qscalar.ncols()])?;
        elemmat.check_shape("elemmat", self.elemmat_shape())?;
        elemmat.fill(T::zero());

        let nd = self.ndim;
        for e in 0..self.nelem {
            for q in 0..self.nip {
                let weight = qscalar[(e, q)] * self.vol[(e, q)];
                for m in 0..self.nne {
                    for n in 0..self.nne {
                        let value = self.n[(q, m)] * weight * self.n[(q, n)];
                        for i in 0..nd {
                            elemmat[[e, m * nd + i, n * nd + i]] += value;
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Element vectors of the integral `int dN_m/dx_i qtensor_ij dV`.
    ///
    /// With a stress tensor as `qtensor` this gives the internal forces per element node.
    pub fn int_grad_n_dot_tensor2_dv(&self, qtensor: &QuadratureTensors<T>) -> Result<ElementVectors<T>> {
        let mut elemvec = ElementVectors::zeros(self.elemvec_shape());
        self.int_grad_n_dot_tensor2_dv_into(qtensor, &mut elemvec)?;
        Ok(elemvec)
    }

    pub fn int_grad_n_dot_tensor2_dv_into(
        &self,
        qtensor: &QuadratureTensors<T>,
        elemvec: &mut ElementVectors<T>,
    ) -> Result<()> {
        qtensor.check_shape("qtensor", self.qtensor_shape())?;
        elemvec.check_shape("elemvec", self.elemvec_shape())?;
        elemvec.fill(T::zero());

        let nd = self.ndim;
        for e in 0..self.nelem {
            for q in 0..self.nip {
                let dv = self.vol[(e, q)];
                for m in 0..self.nne {
                    for i in 0..nd {
                        let dn = self.dn_dx[[e, q, m, i]] * dv;
                        for j in 0..nd {
                            elemvec[[e, m, j]] += dn * qtensor[[e, q, i, j]];
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum GradientPart {
    Full,
    Transpose,
    Symmetric,
}

/// Computes global shape function gradients and integration point volumes for positions `x`.
///
/// Fails on the first integration point whose Jacobian determinant is not positive.
fn compute_dn<T: Real>(
    x: &ElementVectors<T>,
    dn_dxi: &DenseArray<T, 3>,
    weights: &[T],
) -> Result<(DenseArray<T, 4>, DMatrix<T>)> {
    let [nelem, nne, nd] = x.shape();
    let nip = weights.len();

    let mut dn_dx = DenseArray::<T, 4>::zeros([nelem, nip, nne, nd]);
    let mut vol = DMatrix::<T>::zeros(nelem, nip);
    let mut jacobian = DMatrix::<T>::zeros(nd, nd);

    for e in 0..nelem {
        for (q, w) in weights.iter().enumerate() {
            // J_ij = sum_m dN_m/dxi_i x_mj
            jacobian.fill(T::zero());
            for m in 0..nne {
                for i in 0..nd {
                    for j in 0..nd {
                        jacobian[(i, j)] += dn_dxi[[q, m, i]] * x[[e, m, j]];
                    }
                }
            }

            let det = jacobian.determinant();
            // Also rejects NaN
            if !(det > T::zero()) {
                debug!("Element {e} has Jacobian determinant {det} at integration point {q}");
                return Err(Error::DegenerateElement { element: e, point: q });
            }
            let jacobian_inv = jacobian
                .clone()
                .try_inverse()
                .ok_or(Error::DegenerateElement { element: e, point: q })?;

            vol[(e, q)] = det * *w;
            for m in 0..nne {
                for i in 0..nd {
                    let mut dn = T::zero();
                    for j in 0..nd {
                        dn += jacobian_inv[(i, j)] * dn_dxi[[q, m, j]];
                    }
                    dn_dx[[e, q, m, i]] = dn;
                }
            }
        }
    }

    Ok((dn_dx, vol))
}
