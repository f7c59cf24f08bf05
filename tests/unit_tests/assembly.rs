use fenopt::assembly::{ElementPartition, GlobalSystem, LocalSystem, ScalarConstraint, VolumePoint};
use fenopt::dofs::{ElementDofs, SystemDofMap};
use fenopt::element::{FiniteElementFamily, ReferenceTables};
use fenopt::fields::FieldRegistry;
use fenopt::mesh::procedural::create_unit_square_mesh;
use fenopt::nalgebra::{DMatrix, DVector};
use fenopt::proptest::box_mesh;
use fenopt::solution::Solution;
use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use proptest::prelude::*;

#[test]
fn close_sums_duplicates_and_stores_diagonal() {
    let mut system = GlobalSystem::new(3);
    system.add_jacobian_entry(0, 1, 2.0);
    system.add_jacobian_entry(0, 1, 3.0);
    system.add_residual(&[2, 0], &[1.0, -1.0]);
    system.add_residual_entry(2, 0.5);
    assert_eq!(system.num_triplets(), 2);

    let closed = system.close();
    assert_eq!(closed.residual, DVector::from_column_slice(&[-1.0, 0.0, 1.5]));
    assert_eq!(closed.jacobian_entry(0, 1), 5.0);
    assert_eq!(closed.jacobian_entry(1, 0), 0.0);
    // Every diagonal entry is in the pattern, even without contributions
    for i in 0..3 {
        assert!(closed.jacobian.get_entry(i, i).is_some());
    }
    assert_eq!(closed.jacobian.nnz(), 4);
}

#[test]
fn add_block_skips_exact_zeros() {
    let mut system = GlobalSystem::new(4);
    let block = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 2.0]);
    system.add_block(&[3, 1], &[3, 1], &block);
    assert_eq!(system.num_triplets(), 2);

    let mut other = GlobalSystem::new(4);
    other.add_jacobian_entry(1, 1, 1.0);
    other.add_residual_entry(1, 4.0);
    system.merge(other);

    let closed = system.close();
    assert_eq!(closed.jacobian_entry(3, 3), 1.0);
    assert_eq!(closed.jacobian_entry(1, 1), 3.0);
    assert_eq!(closed.residual[1], 4.0);
}

#[test]
fn uniform_partition() {
    let partition = ElementPartition::uniform(10, 4);
    assert_eq!(partition.num_workers(), 4);
    assert_eq!(partition.ranges(), &[0..3, 3..6, 6..8, 8..10]);
    assert_eq!(partition.first_cell(), Some(0));

    let sparse = ElementPartition::uniform(2, 4);
    assert_eq!(sparse.ranges(), &[0..1, 1..2, 2..2, 2..2]);
    assert_eq!(ElementPartition::uniform(0, 2).first_cell(), None);
}

#[test]
#[should_panic]
fn partition_needs_a_worker() {
    ElementPartition::uniform(4, 0);
}

#[test]
fn parallel_assembly_merges_in_worker_order() {
    let partition = ElementPartition::uniform(7, 3);
    let system = partition
        .assemble(7, |range, system| {
            for cell in range {
                system.add_residual_entry(cell, cell as f64);
                system.add_jacobian_entry(cell, (cell + 1) % 7, 1.0);
            }
            Ok(())
        })
        .unwrap();
    assert_eq!(system.residual, DVector::from_fn(7, |i, _| i as f64));
    assert_eq!(system.jacobian_entry(6, 0), 1.0);
    assert_eq!(system.jacobian.nnz(), 14);

    let failure = partition.assemble(7, |range, _| {
        if range.contains(&5) {
            eyre::bail!("cell 5 is broken")
        }
        Ok(())
    });
    assert!(failure.is_err());
}

#[test]
fn local_system_scatters_constraint_contributions() {
    let mesh = create_unit_square_mesh(1).unwrap();
    let registry = FieldRegistry::navier_stokes_control(2);
    let fields = registry.resolve(&["P", "THETA"]).unwrap();
    let families = fields.families.clone();
    let dof_map = SystemDofMap::new(&mesh, fields);
    let solution = Solution::zeros(&mesh, &registry);
    let mut dofs = ElementDofs::default();
    dof_map.gather(&mesh, 0, &solution, &mut dofs);

    let mut local = LocalSystem::new(2, &families);
    assert_eq!(local.len(), 5);
    assert!(local.is_zero());
    local.add_residual(0, 2, 1.0);
    local.add_jacobian(0, 2, 1, 0, 3.0);
    local.add_constraint_residual(0.25);
    local.add_constraint_row(0, 1, 2.0);
    local.add_constraint_column(0, 3, -1.0);
    assert!(!local.is_zero());
    assert_eq!(local.index(1, 0), 4);

    let constraint = ScalarConstraint::new("THETA", 4);
    assert_eq!(constraint.name(), "THETA");
    assert!(constraint.is_designated(4));
    let mut global = GlobalSystem::new(dof_map.num_dofs());
    local.scatter(&dofs, Some(&constraint), &mut global);
    let closed = global.close();

    assert_eq!(closed.residual[2], 1.0);
    assert_eq!(closed.residual[4], 0.25);
    assert_eq!(closed.jacobian_entry(2, 4), 3.0);
    assert_eq!(closed.jacobian_entry(4, 1), 2.0);
    assert_eq!(closed.jacobian_entry(3, 4), -1.0);

    local.reset();
    assert!(local.is_zero());
}

proptest! {
    #[test]
    fn volume_weights_sum_to_mesh_measure(mesh in box_mesh(2, 3)) {
        let tables = ReferenceTables::new(2, 3).unwrap();
        let mut point = VolumePoint::new(2);
        let mut measure = 0.0;
        let mut first_moment = 0.0;
        for cell in 0..mesh.num_cells() {
            let coordinates = mesh.cell_coordinates(cell);
            for q in 0..tables.cell_rule().len() {
                point.update(&tables, &coordinates, q).unwrap();
                measure += point.weight;
                first_moment += point.weight * point.position.x;
                let phi = point.basis(FiniteElementFamily::Quadratic);
                let sum: f64 = phi.values.iter().sum();
                prop_assert!((sum - 1.0).abs() < 1e-12);
            }
        }
        let nodes = mesh.nodes();
        let (x0, x1) = (nodes[0].x, nodes[nodes.len() - 1].x);
        let (y0, y1) = (nodes[0].y, nodes[nodes.len() - 1].y);
        let expected = (x1 - x0) * (y1 - y0);
        assert_scalar_eq!(measure, expected, comp = abs, tol = 1e-10 * expected.max(1.0));
        assert_scalar_eq!(
            first_moment,
            0.5 * (x1 * x1 - x0 * x0) * (y1 - y0),
            comp = abs,
            tol = 1e-10 * expected.max(1.0) * 10.0
        );
    }
}

#[test]
fn interpolated_gradient_of_linear_field() {
    let mesh = create_unit_square_mesh(2).unwrap();
    let tables = ReferenceTables::new(2, 2).unwrap();
    let mut point = VolumePoint::new(2);
    let coordinates = mesh.cell_coordinates(3);
    let dofs: Vec<f64> = mesh
        .cell_dofs(3, FiniteElementFamily::Linear)
        .iter()
        .map(|&v| 2.0 * mesh.vertex(v).x - mesh.vertex(v).y)
        .collect();
    for q in 0..tables.cell_rule().len() {
        point.update(&tables, &coordinates, q).unwrap();
        let basis = point.basis(FiniteElementFamily::Linear);
        let expected = 2.0 * point.position.x - point.position.y;
        assert_scalar_eq!(basis.interpolate(&dofs), expected, comp = abs, tol = 1e-14);
        assert_matrix_eq!(
            basis.interpolate_gradient(&dofs),
            fenopt::nalgebra::Vector3::new(2.0, -1.0, 0.0),
            comp = abs,
            tol = 1e-13
        );
    }
}
