//! Procedural generation of structured meshes.
use crate::element::{FiniteElementFamily, ReferenceFace};
use crate::mesh::{Cell, Mesh};
use crate::FaceId;
use eyre::bail;
use nalgebra::Point3;

/// Boundary tag of a face of the box, given the normal axis and the side (0 = min, 1 = max).
///
/// The numbering is 1 = bottom (`y` min), 2 = right (`x` max), 3 = top (`y` max),
/// 4 = left (`x` min), 5 = `z` min, 6 = `z` max.
pub fn box_face_id(axis: usize, side: usize) -> FaceId {
    match (axis, side) {
        (0, 0) => 4,
        (0, _) => 2,
        (1, 0) => 1,
        (1, _) => 3,
        (2, 0) => 5,
        (2, _) => 6,
        _ => panic!("box faces exist only for axes 0, 1 and 2"),
    }
}

/// Creates a uniform mesh of the box `[min, max]` with `cells_per_dim` cells along each axis.
///
/// Cells carry quadratic geometry: the mesh has `(2n + 1)^dim` nodes and `(n + 1)^dim`
/// vertices, both numbered lexicographically with the `x` axis varying fastest. Boundary
/// faces are tagged according to [`box_face_id`].
pub fn create_box_mesh(dim: usize, cells_per_dim: usize, min: &Point3<f64>, max: &Point3<f64>) -> eyre::Result<Mesh> {
    if !(2..=3).contains(&dim) {
        bail!("Box meshes are only available in 2 and 3 dimensions, got {dim}");
    }
    if cells_per_dim == 0 {
        bail!("Box mesh needs at least one cell per dimension");
    }
    for d in 0..dim {
        if !(max[d] > min[d]) {
            bail!("Box extent along axis {d} is not positive ({} to {})", min[d], max[d]);
        }
    }

    let n = cells_per_dim;
    let node_stride = 2 * n + 1;
    let vertex_stride = n + 1;

    let node_index = |grid: [usize; 3]| (0..dim).rev().fold(0, |acc, d| acc * node_stride + grid[d]);
    let vertex_index = |grid: [usize; 3]| (0..dim).rev().fold(0, |acc, d| acc * vertex_stride + grid[d]);

    let num_nodes = node_stride.pow(dim as u32);
    let mut nodes = Vec::with_capacity(num_nodes);
    for index in 0..num_nodes {
        let mut point = Point3::origin();
        let mut rem = index;
        for d in 0..dim {
            let i = rem % node_stride;
            rem /= node_stride;
            let t = i as f64 / (2 * n) as f64;
            point[d] = min[d] + t * (max[d] - min[d]);
        }
        nodes.push(point);
    }

    let num_vertices = vertex_stride.pow(dim as u32);
    let vertex_nodes = (0..num_vertices)
        .map(|index| {
            let mut grid = [0; 3];
            let mut rem = index;
            for g in grid.iter_mut().take(dim) {
                *g = 2 * (rem % vertex_stride);
                rem /= vertex_stride;
            }
            node_index(grid)
        })
        .collect();

    let num_cells = n.pow(dim as u32);
    let quadratic_nodes = FiniteElementFamily::Quadratic.num_nodes(dim);
    let linear_nodes = FiniteElementFamily::Linear.num_nodes(dim);
    let mut cells = Vec::with_capacity(num_cells);
    for index in 0..num_cells {
        let mut cell_grid = [0; 3];
        let mut rem = index;
        for c in cell_grid.iter_mut().take(dim) {
            *c = rem % n;
            rem /= n;
        }

        let cell_nodes = (0..quadratic_nodes)
            .map(|local| {
                let mut grid = [0; 3];
                let mut rem = local;
                for d in 0..dim {
                    grid[d] = 2 * cell_grid[d] + rem % 3;
                    rem /= 3;
                }
                node_index(grid)
            })
            .collect();

        let cell_vertices = (0..linear_nodes)
            .map(|local| {
                let mut grid = [0; 3];
                let mut rem = local;
                for d in 0..dim {
                    grid[d] = cell_grid[d] + rem % 2;
                    rem /= 2;
                }
                vertex_index(grid)
            })
            .collect();

        let face_ids = (0..2 * dim)
            .map(|local_face| {
                let face = ReferenceFace::from_local_index(dim, local_face);
                let on_boundary = match face.side {
                    0 => cell_grid[face.axis] == 0,
                    _ => cell_grid[face.axis] == n - 1,
                };
                on_boundary.then(|| box_face_id(face.axis, face.side))
            })
            .collect();

        cells.push(Cell {
            nodes: cell_nodes,
            vertices: cell_vertices,
            face_ids,
        });
    }

    Ok(Mesh::from_parts(dim, nodes, vertex_nodes, cells))
}

/// Unit square `[0, 1]^2` with `cells_per_dim` cells along each axis.
pub fn create_unit_square_mesh(cells_per_dim: usize) -> eyre::Result<Mesh> {
    create_box_mesh(2, cells_per_dim, &Point3::origin(), &Point3::new(1.0, 1.0, 0.0))
}

/// Unit cube `[0, 1]^3` with `cells_per_dim` cells along each axis.
pub fn create_unit_cube_mesh(cells_per_dim: usize) -> eyre::Result<Mesh> {
    create_box_mesh(3, cells_per_dim, &Point3::origin(), &Point3::new(1.0, 1.0, 1.0))
}
