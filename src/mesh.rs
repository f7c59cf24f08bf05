//! Meshes of tensor-product cells with tagged boundary faces.
use crate::element::{FiniteElementFamily, ReferenceFace};
use crate::FaceId;
use nalgebra::{Point3, Vector3};

pub mod procedural;

/// A quadrilateral (2D) or hexahedral (3D) cell with quadratic geometry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Global indices of the `3^dim` geometry nodes, in lexicographic order.
    pub nodes: Vec<usize>,
    /// Global vertex indices of the `2^dim` corners, in lexicographic order.
    pub vertices: Vec<usize>,
    /// Boundary tag of each of the `2 dim` faces, indexed by local face index.
    /// `None` marks interior faces.
    pub face_ids: Vec<Option<FaceId>>,
}

/// A mesh of tensor-product cells.
///
/// Node coordinates are stored as 3D points; components beyond `dim` are zero. Vertices are
/// numbered separately from nodes so that linear fields get a compact DOF numbering.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    dim: usize,
    nodes: Vec<Point3<f64>>,
    vertex_nodes: Vec<usize>,
    cells: Vec<Cell>,
    // Each cell is its own constant DOF
    cell_indices: Vec<usize>,
}

impl Mesh {
    /// Creates a mesh from its parts.
    ///
    /// `vertex_nodes[v]` is the node located at vertex `v`.
    ///
    /// # Panics
    ///
    /// Panics if a cell has the wrong number of nodes, vertices or faces for `dim`, or refers to
    /// nodes or vertices out of bounds.
    pub fn from_parts(dim: usize, nodes: Vec<Point3<f64>>, vertex_nodes: Vec<usize>, cells: Vec<Cell>) -> Self {
        for cell in &cells {
            assert_eq!(cell.nodes.len(), FiniteElementFamily::Quadratic.num_nodes(dim));
            assert_eq!(cell.vertices.len(), FiniteElementFamily::Linear.num_nodes(dim));
            assert_eq!(cell.face_ids.len(), 2 * dim);
            assert!(cell.nodes.iter().all(|&n| n < nodes.len()), "cell node out of bounds");
            assert!(cell.vertices.iter().all(|&v| v < vertex_nodes.len()), "cell vertex out of bounds");
        }
        Self {
            dim,
            nodes,
            vertex_nodes,
            cell_indices: (0..cells.len()).collect(),
            cells,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn nodes(&self) -> &[Point3<f64>] {
        &self.nodes
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertex_nodes.len()
    }

    /// Position of vertex `v`.
    pub fn vertex(&self, v: usize) -> &Point3<f64> {
        &self.nodes[self.vertex_nodes[v]]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Number of DOFs a field of the given family has on this mesh.
    pub fn num_dofs(&self, family: FiniteElementFamily) -> usize {
        match family {
            FiniteElementFamily::Constant => self.num_cells(),
            FiniteElementFamily::Linear => self.num_vertices(),
            FiniteElementFamily::Quadratic => self.num_nodes(),
        }
    }

    /// Global DOF indices of `family` on a cell, in local node order.
    pub fn cell_dofs(&self, cell_index: usize, family: FiniteElementFamily) -> &[usize] {
        let cell = &self.cells[cell_index];
        match family {
            FiniteElementFamily::Constant => std::slice::from_ref(&self.cell_indices[cell_index]),
            FiniteElementFamily::Linear => &cell.vertices,
            FiniteElementFamily::Quadratic => &cell.nodes,
        }
    }

    /// Position of DOF `dof` of `family`: node, vertex or cell center.
    pub fn dof_position(&self, family: FiniteElementFamily, dof: usize) -> Point3<f64> {
        match family {
            FiniteElementFamily::Constant => self.cell_center(dof),
            FiniteElementFamily::Linear => *self.vertex(dof),
            FiniteElementFamily::Quadratic => self.nodes[dof],
        }
    }

    /// Node coordinates of a cell as vectors, in local node order.
    pub fn cell_coordinates(&self, cell_index: usize) -> Vec<Vector3<f64>> {
        self.cells[cell_index]
            .nodes
            .iter()
            .map(|&n| self.nodes[n].coords)
            .collect()
    }

    /// Average of the cell's vertex positions.
    pub fn cell_center(&self, cell_index: usize) -> Point3<f64> {
        let vertices = &self.cells[cell_index].vertices;
        let sum: Vector3<f64> = vertices.iter().map(|&v| self.vertex(v).coords).sum();
        Point3::from(sum / vertices.len() as f64)
    }

    /// All tagged boundary faces as `(cell, local face, face id)`.
    pub fn boundary_faces(&self) -> impl Iterator<Item = (usize, usize, FaceId)> + '_ {
        self.cells.iter().enumerate().flat_map(|(cell_index, cell)| {
            cell.face_ids
                .iter()
                .enumerate()
                .filter_map(move |(local_face, id)| id.map(|id| (cell_index, local_face, id)))
        })
    }

    /// Global DOF indices of `family` on a face of a cell.
    pub fn face_nodes(&self, cell_index: usize, local_face: usize, family: FiniteElementFamily) -> Vec<usize> {
        let face = ReferenceFace::from_local_index(self.dim, local_face);
        let cell_dofs = self.cell_dofs(cell_index, family);
        face.nodes(self.dim, family)
            .into_iter()
            .map(|local| cell_dofs[local])
            .collect()
    }

    /// Number of cells sharing each node.
    pub fn node_cell_multiplicity(&self) -> Vec<usize> {
        let mut multiplicity = vec![0; self.num_nodes()];
        for cell in &self.cells {
            for &n in &cell.nodes {
                multiplicity[n] += 1;
            }
        }
        multiplicity
    }
}
