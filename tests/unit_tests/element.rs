use fenopt::element::mapping::determinant_and_inverse;
use fenopt::element::{FiniteElementFamily, GeometricMapping, ReferenceFace, ReferenceTables};
use fenopt::nalgebra::{Matrix3, Vector3};
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use proptest::prelude::*;

fn reference_point(dim: usize) -> impl Strategy<Value = Vector3<f64>> {
    let coord = -1.0..=1.0;
    [coord.clone(), coord.clone(), coord].prop_map(move |[x, y, z]| {
        let mut xi = Vector3::new(x, y, z);
        for d in dim..3 {
            xi[d] = 0.0;
        }
        xi
    })
}

fn evaluate(family: FiniteElementFamily, dim: usize, xi: &Vector3<f64>) -> (Vec<f64>, Vec<Vector3<f64>>) {
    let n = family.num_nodes(dim);
    let mut values = vec![0.0; n];
    let mut gradients = vec![Vector3::zeros(); n];
    family.populate_basis(dim, xi, &mut values, &mut gradients);
    (values, gradients)
}

/// Reference coordinates of the local nodes of a continuous family.
fn node_positions(family: FiniteElementFamily, dim: usize) -> Vec<Vector3<f64>> {
    let per_axis = family.degree() + 1;
    (0..family.num_nodes(dim))
        .map(|node| {
            let mut xi = Vector3::zeros();
            let mut rem = node;
            for d in 0..dim {
                xi[d] = -1.0 + 2.0 * (rem % per_axis) as f64 / family.degree() as f64;
                rem /= per_axis;
            }
            xi
        })
        .collect()
}

#[test]
fn node_counts() {
    use FiniteElementFamily::*;
    assert_eq!(Constant.num_nodes(3), 1);
    assert_eq!(Linear.num_nodes(2), 4);
    assert_eq!(Linear.num_nodes(3), 8);
    assert_eq!(Quadratic.num_nodes(2), 9);
    assert_eq!(Quadratic.num_nodes(3), 27);
    assert!(!Constant.is_continuous());
    assert!(Quadratic.is_continuous());
}

#[test]
fn basis_functions_are_nodal() {
    for dim in 1..=3 {
        for family in [FiniteElementFamily::Linear, FiniteElementFamily::Quadratic] {
            for (a, xi) in node_positions(family, dim).iter().enumerate() {
                let (values, _) = evaluate(family, dim, xi);
                for (b, &value) in values.iter().enumerate() {
                    let expected = if a == b { 1.0 } else { 0.0 };
                    assert_scalar_eq!(value, expected, comp = abs, tol = 1e-14);
                }
            }
        }
    }
}

#[test]
fn quadratic_face_nodes_in_2d() {
    use FiniteElementFamily::*;
    let face = |index| ReferenceFace::from_local_index(2, index);
    assert_eq!(face(0).nodes(2, Quadratic), vec![0, 3, 6]);
    assert_eq!(face(1).nodes(2, Quadratic), vec![2, 5, 8]);
    assert_eq!(face(2).nodes(2, Quadratic), vec![0, 1, 2]);
    assert_eq!(face(3).nodes(2, Quadratic), vec![6, 7, 8]);
    assert_eq!(face(3).nodes(2, Linear), vec![2, 3]);
    assert!(face(3).nodes(2, Constant).is_empty());
    assert_eq!(face(3).local_index(), 3);
    assert_eq!(face(3).outward_sign(), 1.0);
    assert_eq!(face(2).outward_sign(), -1.0);
}

#[test]
fn face_nodes_lie_on_face() {
    for dim in 2..=3 {
        for local_face in 0..2 * dim {
            let face = ReferenceFace::from_local_index(dim, local_face);
            let positions = node_positions(FiniteElementFamily::Quadratic, dim);
            let nodes = face.nodes(dim, FiniteElementFamily::Quadratic);
            assert_eq!(nodes.len(), 3usize.pow(dim as u32 - 1));
            for node in nodes {
                assert_eq!(positions[node][face.axis], face.outward_sign());
            }
        }
    }
}

#[test]
fn reference_tables_have_one_row_per_point() {
    let tables = ReferenceTables::new(3, 2).unwrap();
    assert_eq!(tables.cell_rule().len(), 8);
    assert_eq!(tables.face_rule().len(), 4);
    let face_table = tables.face(5, FiniteElementFamily::Linear);
    assert_eq!(face_table.num_nodes(), 8);
    // On the face z = 1 the basis functions of the opposite face vanish
    for q in 0..tables.face_rule().len() {
        let values = face_table.values(q);
        assert!(values[..4].iter().all(|&v| v.abs() < 1e-14));
        assert_scalar_eq!(values[4..].iter().sum::<f64>(), 1.0, comp = abs, tol = 1e-14);
    }
    assert!(ReferenceTables::new(4, 2).is_err());
}

#[test]
fn affine_mapping_of_scaled_cell() {
    // The cell [1, 3] x [0, 0.5], with nodes given in lexicographic order
    let dim = 2;
    let positions = node_positions(FiniteElementFamily::Quadratic, dim);
    let coordinates: Vec<_> = positions
        .iter()
        .map(|xi| Vector3::new(2.0 + xi[0], 0.25 + 0.25 * xi[1], 0.0))
        .collect();
    let (_, gradients) = evaluate(FiniteElementFamily::Quadratic, dim, &Vector3::new(0.3, -0.2, 0.0));
    let mapping = GeometricMapping::from_nodes(dim, &coordinates, &gradients).unwrap();
    assert_matrix_eq!(
        *mapping.jacobian(),
        Matrix3::from_diagonal(&Vector3::new(1.0, 0.25, 1.0)),
        comp = abs,
        tol = 1e-14
    );
    assert_scalar_eq!(mapping.determinant(), 0.25, comp = abs, tol = 1e-14);
    assert_matrix_eq!(
        mapping.physical_gradient(&Vector3::new(1.0, 1.0, 0.0)),
        Vector3::new(1.0, 4.0, 0.0),
        comp = abs,
        tol = 1e-13
    );

    let top = ReferenceFace::from_local_index(dim, 3);
    let (normal, measure) = mapping.face_normal_and_measure(dim, &top);
    assert_matrix_eq!(normal, Vector3::new(0.0, 1.0, 0.0), comp = abs, tol = 1e-14);
    // The top edge has length 2 and the reference edge has length 2
    assert_scalar_eq!(measure, 1.0, comp = abs, tol = 1e-14);
    assert!(mapping.is_face_axis_aligned(dim, &top, 1e-10));

    let left = ReferenceFace::from_local_index(dim, 0);
    let (normal, measure) = mapping.face_normal_and_measure(dim, &left);
    assert_matrix_eq!(normal, Vector3::new(-1.0, 0.0, 0.0), comp = abs, tol = 1e-14);
    assert_scalar_eq!(measure, 0.25, comp = abs, tol = 1e-14);
}

#[test]
fn inverted_cell_is_rejected() {
    let dim = 2;
    let coordinates: Vec<_> = node_positions(FiniteElementFamily::Quadratic, dim)
        .iter()
        .map(|xi| Vector3::new(-xi[0], xi[1], 0.0))
        .collect();
    let (_, gradients) = evaluate(FiniteElementFamily::Quadratic, dim, &Vector3::zeros());
    assert!(GeometricMapping::from_nodes(dim, &coordinates, &gradients).is_err());
}

#[test]
fn determinant_and_inverse_of_general_matrix() {
    #[rustfmt::skip]
    let m = Matrix3::new(2.0, 1.0, 0.0,
                         0.5, 3.0, 1.0,
                         1.0, 0.0, 4.0);
    let (det, inverse) = determinant_and_inverse(&m);
    assert_scalar_eq!(det, m.determinant(), comp = abs, tol = 1e-12);
    assert_matrix_eq!(inverse * m, Matrix3::<f64>::identity(), comp = abs, tol = 1e-14);
}

proptest! {
    #[test]
    fn basis_is_partition_of_unity(dim in 1..=3usize, xi in reference_point(3)) {
        let mut xi = xi;
        for d in dim..3 {
            xi[d] = 0.0;
        }
        for family in FiniteElementFamily::ALL {
            let (values, gradients) = evaluate(family, dim, &xi);
            let sum: f64 = values.iter().sum();
            let gradient_sum: Vector3<f64> = gradients.iter().sum();
            prop_assert!((sum - 1.0).abs() < 1e-13);
            prop_assert!(gradient_sum.norm() < 1e-12);
        }
    }

    #[test]
    fn quadratic_basis_reproduces_quadratics(xi in reference_point(2)) {
        let dim = 2;
        let f = |p: &Vector3<f64>| 1.0 + 2.0 * p[0] - p[1] + 0.5 * p[0] * p[1] + p[0] * p[0] - 3.0 * p[1] * p[1];
        let df = |p: &Vector3<f64>| Vector3::new(2.0 + 0.5 * p[1] + 2.0 * p[0], -1.0 + 0.5 * p[0] - 6.0 * p[1], 0.0);
        let nodal: Vec<f64> = node_positions(FiniteElementFamily::Quadratic, dim).iter().map(f).collect();
        let (values, gradients) = evaluate(FiniteElementFamily::Quadratic, dim, &xi);
        let interpolated: f64 = values.iter().zip(&nodal).map(|(phi, u)| phi * u).sum();
        let gradient: Vector3<f64> = gradients.iter().zip(&nodal).map(|(g, &u)| g * u).sum();
        prop_assert!((interpolated - f(&xi)).abs() < 1e-12);
        prop_assert!((gradient - df(&xi)).norm() < 1e-12);
    }
}
