use femcore::element::{Quad4, ReferenceElement};
use femcore::quadrature::{nodal, tensor, QuadratureRule};
use femcore::Error;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::{dmatrix, dvector};

#[test]
fn gauss_rules_integrate_reference_volume() {
    for n in 1..=4 {
        let quad: QuadratureRule<f64> = tensor::quadrilateral_gauss(n);
        let hex: QuadratureRule<f64> = tensor::hexahedron_gauss(n);
        assert_eq!(quad.dim(), 2);
        assert_eq!(hex.num_points(), n * n * n);
        assert_scalar_eq!(quad.integrate(|_| 1.0), 4.0, comp = abs, tol = 1e-14);
        assert_scalar_eq!(hex.integrate(|_| 1.0), 8.0, comp = abs, tol = 1e-14);
    }
}

#[test]
fn two_point_gauss_rule_integrates_bicubic_polynomials() {
    let rule: QuadratureRule<f64> = tensor::quadrilateral_gauss(2);
    // int x^2 y^2 over [-1, 1]^2 = 4 / 9
    let integral = rule.integrate(|xi| xi[0].powi(2) * xi[1].powi(2) + xi[0].powi(3) * xi[1]);
    assert_scalar_eq!(integral, 4.0 / 9.0, comp = abs, tol = 1e-14);
}

#[test]
fn rules_convert_to_single_precision() {
    let rule: QuadratureRule<f32> = tensor::quadrilateral_gauss(3);
    let sum: f32 = rule.weights().iter().sum();
    assert_scalar_eq!(sum, 4.0, comp = abs, tol = 1e-6);
}

#[test]
fn nodal_rule_places_points_at_element_nodes() {
    let rule: QuadratureRule<f64> = nodal::quadrilateral();
    let expected = dmatrix![-1.0, -1.0;
                             1.0, -1.0;
                             1.0,  1.0;
                            -1.0,  1.0];
    assert_matrix_eq!(rule.points_matrix(), expected);
    assert_eq!(rule.weights(), &[1.0; 4]);
    assert_eq!(ReferenceElement::<f64>::nodal_quadrature(&Quad4), rule);
    assert_eq!(nodal::hexahedron::<f64>().num_points(), 8);
}

#[test]
fn rule_from_matrix_keeps_point_order() -> eyre::Result<()> {
    let xi = dmatrix![0.5, -0.25;
                      0.0,  0.75;
                      -0.5, 0.1];
    let w = dvector![1.0, 2.0, 1.0];
    let rule = QuadratureRule::from_matrix(&xi, &w)?;
    assert_eq!(rule.num_points(), 3);
    assert_eq!(rule.point(1), &[0.0, 0.75]);
    assert_matrix_eq!(rule.points_matrix(), xi);
    Ok(())
}

#[test]
fn invalid_rules_are_rejected() {
    let is_invalid = |result: femcore::Result<QuadratureRule<f64>>| matches!(result, Err(Error::InvalidQuadratureRule { .. }));
    assert!(is_invalid(QuadratureRule::try_new(2, vec![], vec![])));
    assert!(is_invalid(QuadratureRule::try_new(0, vec![1.0], vec![])));
    assert!(is_invalid(QuadratureRule::try_new(2, vec![1.0, 1.0], vec![0.0, 0.0, 0.0])));
    assert!(is_invalid(QuadratureRule::from_matrix(&dmatrix![0.0, 0.0], &dvector![1.0, 1.0])));
}

#[test]
fn rules_round_trip_through_json() -> eyre::Result<()> {
    let rule: QuadratureRule<f64> = nodal::quadrilateral();
    let json = serde_json::to_string(&rule)?;
    let deserialized: QuadratureRule<f64> = serde_json::from_str(&json)?;
    assert_eq!(deserialized, rule);
    Ok(())
}
