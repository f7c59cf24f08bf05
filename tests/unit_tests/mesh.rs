use fenopt::element::FiniteElementFamily;
use fenopt::mesh::procedural::{box_face_id, create_box_mesh, create_unit_cube_mesh, create_unit_square_mesh};
use fenopt::nalgebra::Point3;
use fenopt::proptest::box_mesh;
use itertools::Itertools;
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;
use std::collections::BTreeMap;

#[test]
fn box_face_ids() {
    assert_eq!(box_face_id(1, 0), 1);
    assert_eq!(box_face_id(0, 1), 2);
    assert_eq!(box_face_id(1, 1), 3);
    assert_eq!(box_face_id(0, 0), 4);
    assert_eq!(box_face_id(2, 0), 5);
    assert_eq!(box_face_id(2, 1), 6);
}

#[test]
fn unit_square_counts() {
    let mesh = create_unit_square_mesh(3).unwrap();
    assert_eq!(mesh.dim(), 2);
    assert_eq!(mesh.num_cells(), 9);
    assert_eq!(mesh.num_nodes(), 49);
    assert_eq!(mesh.num_vertices(), 16);
    assert_eq!(mesh.num_dofs(FiniteElementFamily::Constant), 9);
    assert_eq!(mesh.num_dofs(FiniteElementFamily::Linear), 16);
    assert_eq!(mesh.num_dofs(FiniteElementFamily::Quadratic), 49);
    assert_eq!(mesh.boundary_faces().count(), 12);
}

#[test]
fn unit_cube_counts() {
    let mesh = create_unit_cube_mesh(2).unwrap();
    assert_eq!(mesh.num_cells(), 8);
    assert_eq!(mesh.num_nodes(), 125);
    assert_eq!(mesh.num_vertices(), 27);

    let faces_per_id = mesh
        .boundary_faces()
        .map(|(_, _, id)| id)
        .counts()
        .into_iter()
        .collect::<BTreeMap<_, _>>();
    let expected: BTreeMap<_, _> = (1..=6).map(|id| (id, 4)).collect();
    assert_eq!(faces_per_id, expected);
}

#[test]
fn face_ids_match_face_positions() {
    let mesh = create_box_mesh(2, 2, &Point3::new(-1.0, 0.0, 0.0), &Point3::new(1.0, 3.0, 0.0)).unwrap();
    for (cell, local_face, id) in mesh.boundary_faces() {
        for node in mesh.face_nodes(cell, local_face, FiniteElementFamily::Quadratic) {
            let x = mesh.nodes()[node];
            let on_face = match id {
                1 => x.y == 0.0,
                2 => x.x == 1.0,
                3 => x.y == 3.0,
                4 => x.x == -1.0,
                _ => false,
            };
            assert!(on_face, "node {x} is not on face {id}");
        }
    }
}

#[test]
fn cell_dofs_of_each_family() {
    let mesh = create_unit_square_mesh(2).unwrap();
    // Cell 1 is the lower right cell, nodes are numbered on a 5 x 5 grid
    assert_eq!(mesh.cell_dofs(1, FiniteElementFamily::Constant), &[1]);
    assert_eq!(mesh.cell_dofs(1, FiniteElementFamily::Linear), &[1, 2, 4, 5]);
    assert_eq!(
        mesh.cell_dofs(1, FiniteElementFamily::Quadratic),
        &[2, 3, 4, 7, 8, 9, 12, 13, 14]
    );
    assert_eq!(mesh.face_nodes(1, 1, FiniteElementFamily::Quadratic), vec![4, 9, 14]);
    assert_eq!(mesh.cells()[1].face_ids, vec![None, Some(2), Some(1), None]);

    let center = mesh.cell_center(1);
    assert_eq!(center, Point3::new(0.75, 0.25, 0.0));
    assert_eq!(mesh.dof_position(FiniteElementFamily::Constant, 1), center);
    assert_eq!(mesh.dof_position(FiniteElementFamily::Linear, 5), Point3::new(1.0, 0.5, 0.0));
    assert_eq!(mesh.dof_position(FiniteElementFamily::Quadratic, 13), Point3::new(0.75, 0.5, 0.0));
}

#[test]
fn node_multiplicity() {
    let mesh = create_unit_square_mesh(2).unwrap();
    let multiplicity = mesh.node_cell_multiplicity();
    // Corner, edge midpoint, shared edge node and the center vertex
    assert_eq!(multiplicity[0], 1);
    assert_eq!(multiplicity[1], 1);
    assert_eq!(multiplicity[2], 2);
    assert_eq!(multiplicity[12], 4);
}

#[test]
fn invalid_boxes_are_rejected() {
    let min = Point3::origin();
    let max = Point3::new(1.0, 1.0, 1.0);
    assert!(create_box_mesh(1, 2, &min, &max).is_err());
    assert!(create_box_mesh(4, 2, &min, &max).is_err());
    assert!(create_box_mesh(2, 0, &min, &max).is_err());
    assert!(create_box_mesh(2, 2, &min, &Point3::new(1.0, 0.0, 0.0)).is_err());
    // The third extent is irrelevant in 2D
    assert!(create_box_mesh(2, 2, &min, &Point3::new(1.0, 1.0, 0.0)).is_ok());
}

proptest! {
    #[test]
    fn cell_centers_lie_inside_box(mesh in (2..=3usize).prop_flat_map(|dim| box_mesh(dim, 3))) {
        let dim = mesh.dim();
        let nodes = mesh.nodes();
        let mut min = nodes[0];
        let mut max = nodes[0];
        for x in nodes {
            for d in 0..dim {
                min[d] = min[d].min(x[d]);
                max[d] = max[d].max(x[d]);
            }
        }
        for cell in 0..mesh.num_cells() {
            let center = mesh.cell_center(cell);
            for d in 0..dim {
                prop_assert!(center[d] > min[d] && center[d] < max[d]);
            }
        }
        // Every boundary face of the box is covered by exactly one cell face
        let cells_per_dim = (mesh.num_cells() as f64).powf(1.0 / dim as f64).round() as usize;
        let faces_per_side = cells_per_dim.pow(dim as u32 - 1);
        prop_assert_eq!(mesh.boundary_faces().count(), 2 * dim * faces_per_side);
        assert_scalar_eq!(
            mesh.node_cell_multiplicity().iter().sum::<usize>() as f64,
            (mesh.num_cells() * 3usize.pow(dim as u32)) as f64,
            comp = float
        );
    }
}
