use crate::vector_for_mesh;
use femcore::array::ElementVectors;
use femcore::field::{Field, Representation};
use femcore::Error;
use nalgebra::{DMatrix, DVector};
use util::quad_grid;

#[test]
fn conversions_match_named_operations() -> eyre::Result<()> {
    let vector = vector_for_mesh(&quad_grid(2, 2, 1.0), &[0, 1, 5]);
    let elemvec = ElementVectors::from_fn([4, 4, 2], |[e, m, i]| (e * 8 + m * 2 + i) as f64);
    let element = Field::Element(elemvec.clone());
    assert_eq!(element.representation(), Representation::Element);

    let node = vector.convert(&element, Representation::Node)?;
    assert_eq!(node, Field::Node(vector.as_node_from_element(&elemvec)?));

    let assembled = vector.assemble(&element, Representation::Node)?;
    assert_eq!(assembled, Field::Node(vector.assemble_node_from_element(&elemvec)?));

    let Field::Dof { u, p } = vector.assemble(&element, Representation::Dof)? else {
        panic!("expected DOF representation");
    };
    assert_eq!(u, vector.assemble_dofs_u_from_element(&elemvec)?);
    assert_eq!(p, vector.assemble_dofs_p_from_element(&elemvec)?);
    Ok(())
}

#[test]
fn single_valued_fields_round_trip() -> eyre::Result<()> {
    let vector = vector_for_mesh(&quad_grid(3, 1, 0.5), &[2, 9, 4]);
    let u = DVector::from_fn(vector.nnu(), |k, _| k as f64 + 0.5);
    let p = DVector::from_fn(vector.nnp(), |k, _| -(k as f64));
    let dof = Field::Dof { u, p };

    for target in [Representation::Node, Representation::Element] {
        let converted = vector.convert(&dof, target)?;
        assert_eq!(converted.representation(), target);
        assert_eq!(vector.convert(&converted, Representation::Dof)?, dof);
    }

    // Without shared destinations, assembling is the same as converting
    let element = vector.assemble(&dof, Representation::Element)?;
    assert_eq!(element, vector.convert(&dof, Representation::Element)?);
    assert_eq!(vector.assemble(&element, Representation::Element)?, element);
    Ok(())
}

#[test]
fn identity_conversion_validates_shape() {
    let vector = vector_for_mesh(&quad_grid(1, 1, 1.0), &[]);
    let node = Field::Node(DMatrix::<f64>::zeros(3, 2));
    assert!(matches!(
        vector.convert(&node, Representation::Node),
        Err(Error::DimensionMismatch { name: "nodevec", .. })
    ));

    let dof = Field::Dof {
        u: DVector::<f64>::zeros(8),
        p: DVector::zeros(1),
    };
    assert!(vector.convert(&dof, Representation::Dof).is_err());
    assert!(vector.assemble(&dof, Representation::Node).is_err());
}

#[test]
fn representation_round_trips_through_json() -> eyre::Result<()> {
    let json = serde_json::to_string(&Representation::Element)?;
    assert_eq!(json, "\"Element\"");
    let representation: Representation = serde_json::from_str("\"Dof\"")?;
    assert_eq!(representation, Representation::Dof);
    Ok(())
}
