use crate::{element_coordinates, vector_for_mesh};
use femcore::array::ElementVectors;
use femcore::element::{Quad4, ReferenceElement};
use femcore::integrate::Quadrature;
use femcore::matrix_diagonal::{DiagonalSolution, DiagonalSolveOptions, MatrixDiagonal};
use femcore::Error;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{dvector, DMatrix, DVector};
use util::quad_grid;

/// Lumped mass of a 2 x 3 grid with cell width 0.5, i.e. area 1.5, and density 2.
fn lumped_mass(iip: &[usize]) -> eyre::Result<MatrixDiagonal<f64>> {
    let mesh = quad_grid(2, 3, 0.5);
    let vector = vector_for_mesh(&mesh, iip);
    let rule = ReferenceElement::<f64>::nodal_quadrature(&Quad4);
    let quadrature = Quadrature::with_rule(Quad4, element_coordinates(&mesh), rule)?;
    let density = DMatrix::from_element(quadrature.nelem(), quadrature.nip(), 2.0);
    let elemmat = quadrature.int_n_scalar_nt_dv(&density)?;

    let mut mass = MatrixDiagonal::new(&vector);
    mass.assemble(&elemmat)?;
    Ok(mass)
}

#[test]
fn lumped_mass_total_equals_ndim_density_area() -> eyre::Result<()> {
    let mass = lumped_mass(&[])?;
    assert_eq!(mass.ndof(), 24);
    assert_scalar_eq!(mass.values().sum(), 2.0 * 2.0 * 1.5, comp = abs, tol = 1e-12);
    // A corner node carries a quarter of one cell, an interior node a full cell
    let cell_mass = 2.0 * 0.25;
    assert_scalar_eq!(mass.values()[0], 0.25 * cell_mass, comp = abs, tol = 1e-14);
    assert_scalar_eq!(mass.values()[2 * 4], cell_mass, comp = abs, tol = 1e-14);
    Ok(())
}

#[test]
fn assembling_again_replaces_the_diagonal() -> eyre::Result<()> {
    let mesh = quad_grid(2, 1, 1.0);
    let vector = vector_for_mesh(&mesh, &[]);
    let mut diagonal = MatrixDiagonal::new(&vector);
    let elemvec = ElementVectors::from_element([2, 4, 2], 1.0);
    diagonal.assemble_element_vectors(&elemvec)?;
    diagonal.assemble_element_vectors(&elemvec)?;
    assert_eq!(diagonal.values(), &vector.assemble_dofs_from_element(&elemvec)?);
    Ok(())
}

#[test]
fn consistent_mass_is_rejected() -> eyre::Result<()> {
    let mesh = quad_grid(2, 1, 1.0);
    let vector = vector_for_mesh(&mesh, &[]);
    let quadrature = Quadrature::new(Quad4, element_coordinates(&mesh))?;
    let elemmat = quadrature.int_n_scalar_nt_dv(&DMatrix::from_element(2, 4, 1.0))?;

    let mut mass = MatrixDiagonal::new(&vector);
    mass.set(&DVector::from_element(12, 1.0))?;
    assert_eq!(mass.assemble(&elemmat), Err(Error::NonDiagonalElementMatrix { element: 0 }));
    assert_eq!(mass.values(), &DVector::from_element(12, 1.0));
    Ok(())
}

#[test]
fn solve_inverts_dot() -> eyre::Result<()> {
    let mass = lumped_mass(&[0, 1, 13])?;
    let x = DVector::from_fn(24, |i, _| (i as f64 - 7.0) * 0.3);
    let b = mass.dot(&x)?;
    assert_matrix_eq!(mass.solve(&b)?, x, comp = abs, tol = 1e-12);

    let vector = mass.vector();
    let x_u = vector.as_dofs_u_from_node(&vector.as_node_from_dofs(&x)?)?;
    let x_p = vector.as_dofs_p_from_node(&vector.as_node_from_dofs(&x)?)?;
    let b_u = mass.dot_u(&x_u, &x_p)?;
    let b_p = mass.dot_p(&x_u, &x_p)?;
    assert_eq!(vector.as_dofs_from_parts(&b_u, &b_p)?, b);
    assert_matrix_eq!(mass.solve_u(&b_u)?, x_u, comp = abs, tol = 1e-12);
    Ok(())
}

#[test]
fn partitioned_values_follow_iiu_and_iip() -> eyre::Result<()> {
    let vector = vector_for_mesh(&quad_grid(1, 1, 1.0), &[7, 2]);
    let mut diagonal = MatrixDiagonal::new(&vector);
    diagonal.set_partitioned(&dvector![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &dvector![70.0, 20.0])?;
    assert_eq!(diagonal.values(), &dvector![1.0, 2.0, 20.0, 3.0, 4.0, 5.0, 6.0, 70.0]);
    assert_eq!(diagonal.values_u(), dvector![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(diagonal.values_p(), dvector![70.0, 20.0]);
    Ok(())
}

#[test]
fn zero_diagonal_is_singular() -> eyre::Result<()> {
    let vector = vector_for_mesh(&quad_grid(1, 1, 1.0), &[3]);
    let mut diagonal = MatrixDiagonal::new(&vector);
    let mut values = DVector::from_element(8, 2.0);
    values[3] = 0.0;
    diagonal.set(&values)?;

    let rhs = DVector::from_element(8, 1.0);
    assert_eq!(diagonal.solve(&rhs), Err(Error::SingularDiagonal { dof: 3 }));
    // The zero entry belongs to a prescribed DOF, which solve_u does not touch
    assert_eq!(diagonal.solve_u(&DVector::from_element(7, 1.0))?, DVector::from_element(7, 0.5));
    Ok(())
}

#[test]
fn solve_with_options() -> eyre::Result<()> {
    let vector = vector_for_mesh(&quad_grid(1, 1, 1.0), &[6, 1]);
    let mut diagonal = MatrixDiagonal::new(&vector);
    diagonal.set(&DVector::from_fn(8, |i, _| i as f64 + 1.0))?;
    let rhs = DVector::from_fn(8, |i, _| 2.0 * (i as f64 + 1.0));

    let full = diagonal.solve_with(&rhs, &DiagonalSolveOptions::default())?;
    assert_eq!(full, DiagonalSolution::Full(DVector::from_element(8, 2.0)));

    let options = DiagonalSolveOptions {
        partitioned: true,
        ..Default::default()
    };
    let DiagonalSolution::Partitioned { u, p } = diagonal.solve_with(&rhs, &options)? else {
        panic!("expected partitioned solution");
    };
    assert_eq!(u.len(), 6);
    assert_eq!(p, dvector![2.0, 2.0]);

    let mut small = DVector::from_element(8, 1.0);
    small[5] = 1e-14;
    diagonal.set(&small)?;
    let tolerant = DiagonalSolveOptions {
        zero_tolerance: 1e-12,
        ..Default::default()
    };
    assert_eq!(diagonal.solve_with(&rhs, &tolerant), Err(Error::SingularDiagonal { dof: 5 }));
    assert!(diagonal.solve(&rhs).is_ok());
    Ok(())
}

#[test]
fn zero_diagonal_is_singular_for_any_tolerance() -> eyre::Result<()> {
    let vector = vector_for_mesh(&quad_grid(1, 1, 1.0), &[]);
    let mut diagonal = MatrixDiagonal::new(&vector);
    let mut values = DVector::from_element(8, 2.0);
    values[3] = 0.0;
    diagonal.set(&values)?;
    let rhs = DVector::from_element(8, 1.0);

    let negative: DiagonalSolveOptions = serde_json::from_str(r#"{ "zero_tolerance": -1.0 }"#)?;
    assert_eq!(diagonal.solve_with(&rhs, &negative), Err(Error::SingularDiagonal { dof: 3 }));

    let nan = DiagonalSolveOptions {
        zero_tolerance: f64::NAN,
        ..Default::default()
    };
    assert_eq!(diagonal.solve_with(&rhs, &nan), Err(Error::SingularDiagonal { dof: 3 }));

    // Non-zero entries are still divided
    values[3] = 4.0;
    diagonal.set(&values)?;
    let DiagonalSolution::Full(x) = diagonal.solve_with(&rhs, &nan)? else {
        panic!("expected full solution");
    };
    assert_eq!(x[3], 0.25);
    assert_eq!(x[0], 0.5);
    Ok(())
}

#[test]
fn solve_options_deserialize_with_defaults() -> eyre::Result<()> {
    let options: DiagonalSolveOptions = serde_json::from_str(r#"{ "partitioned": true }"#)?;
    assert_eq!(
        options,
        DiagonalSolveOptions {
            partitioned: true,
            zero_tolerance: 0.0
        }
    );
    let json = serde_json::to_string(&options)?;
    assert_eq!(serde_json::from_str::<DiagonalSolveOptions>(&json)?, options);
    Ok(())
}

#[test]
fn mismatched_shapes_are_rejected() {
    let vector = vector_for_mesh(&quad_grid(1, 1, 1.0), &[]);
    let mut diagonal = MatrixDiagonal::<f64>::new(&vector);
    assert!(matches!(
        diagonal.set(&DVector::zeros(7)),
        Err(Error::DimensionMismatch { name: "dofval", .. })
    ));
    assert!(diagonal.dot(&DVector::zeros(9)).is_err());
    assert!(diagonal.solve(&DVector::zeros(9)).is_err());
    assert!(diagonal
        .assemble(&femcore::array::ElementMatrices::zeros([1, 4, 4]))
        .is_err());
}
