//! Proptest strategies for meshes, solutions and cell orderings.
use crate::fields::FieldRegistry;
use crate::mesh::procedural::create_box_mesh;
use crate::mesh::Mesh;
use crate::solution::Solution;
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use nalgebra::{DVector, Point3};

pub fn point3() -> impl Strategy<Value = Point3<f64>> {
    // Keep coordinates small, so that products of coordinates stay well within f64 range
    let range = -10.0..10.0;
    [range.clone(), range.clone(), range].prop_map(|[x, y, z]| Point3::new(x, y, z))
}

/// Box meshes of the given dimension with `1..=max_cells` cells per axis, on boxes with random
/// positive extents.
pub fn box_mesh(dim: usize, max_cells: usize) -> impl Strategy<Value = Mesh> {
    let extent = 0.1..5.0;
    let offset = -2.0..2.0;
    (
        1..=max_cells,
        [offset.clone(), offset.clone(), offset],
        [extent.clone(), extent.clone(), extent],
    )
        .prop_map(move |(cells, min, extent)| {
            let mut max = min;
            for d in 0..dim {
                max[d] += extent[d];
            }
            create_box_mesh(dim, cells, &Point3::from(min), &Point3::from(max))
                .expect("parameters are always valid")
        })
}

/// A random permutation of `0..n`.
pub fn permutation(n: usize) -> impl Strategy<Value = Vec<usize>> {
    Just((0..n).collect::<Vec<_>>()).prop_shuffle()
}

/// Solutions with every value drawn from `-1..1`.
pub fn solution(mesh: Mesh, registry: FieldRegistry) -> impl Strategy<Value = Solution> {
    let sizes: Vec<_> = registry
        .fields()
        .iter()
        .map(|field| mesh.num_dofs(field.family))
        .collect();
    let total: usize = sizes.iter().sum();
    vec(-1.0..1.0, total).prop_map(move |values| {
        let mut solution = Solution::zeros(&mesh, &registry);
        let mut offset = 0;
        for (index, &size) in sizes.iter().enumerate() {
            *solution.field_by_index_mut(index) = DVector::from_column_slice(&values[offset..offset + size]);
            offset += size;
        }
        solution
    })
}
