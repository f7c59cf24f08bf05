//! Tensor-product Lagrange reference elements.
//!
//! Reference cells are `[-1, 1]^dim`. Local nodes of every family are ordered lexicographically
//! with the first axis varying fastest: for the quadratic family in 2D, local node `a + 3 b`
//! sits at reference coordinates `(alpha_a, alpha_b)` with `alpha = [-1, 0, 1]`.
use crate::quadrature::QuadratureRule;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

mod lagrange;
pub mod mapping;

pub use lagrange::{lagrange_1d, tensor_lagrange};
pub use mapping::GeometricMapping;

/// Finite element families supported on tensor-product cells.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FiniteElementFamily {
    /// Discontinuous piecewise constant, one DOF per cell.
    Constant,
    /// Continuous tensor-product linear (Q1), DOFs on cell vertices.
    Linear,
    /// Continuous tensor-product quadratic (Q2), DOFs on all `3^dim` cell nodes.
    Quadratic,
}

impl FiniteElementFamily {
    pub const ALL: [FiniteElementFamily; 3] = [Self::Constant, Self::Linear, Self::Quadratic];

    /// Position of the family in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Constant => 0,
            Self::Linear => 1,
            Self::Quadratic => 2,
        }
    }

    /// Polynomial degree along each axis.
    pub fn degree(self) -> usize {
        self.index()
    }

    pub fn num_nodes(self, dim: usize) -> usize {
        match self {
            Self::Constant => 1,
            Self::Linear => 2usize.pow(dim as u32),
            Self::Quadratic => 3usize.pow(dim as u32),
        }
    }

    /// Whether DOFs of this family are shared between neighboring cells.
    pub fn is_continuous(self) -> bool {
        !matches!(self, Self::Constant)
    }

    /// Evaluates all basis functions and their reference gradients at `xi`.
    ///
    /// # Panics
    ///
    /// Panics if the output buffers do not have length [`Self::num_nodes`].
    pub fn populate_basis(self, dim: usize, xi: &Vector3<f64>, values: &mut [f64], gradients: &mut [Vector3<f64>]) {
        tensor_lagrange(self.degree(), dim, xi, values, gradients)
    }
}

/// A face of the reference cell: `xi[axis] = -1` for `side == 0`, `xi[axis] = 1` for `side == 1`.
///
/// The local index of the face is `2 * axis + side`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ReferenceFace {
    pub axis: usize,
    pub side: usize,
}

impl ReferenceFace {
    pub fn from_local_index(dim: usize, local_index: usize) -> Self {
        assert!(local_index < 2 * dim, "local face index out of bounds");
        Self {
            axis: local_index / 2,
            side: local_index % 2,
        }
    }

    pub fn local_index(&self) -> usize {
        2 * self.axis + self.side
    }

    /// `+1` if the outward normal points along the positive axis, `-1` otherwise.
    pub fn outward_sign(&self) -> f64 {
        if self.side == 1 {
            1.0
        } else {
            -1.0
        }
    }

    /// Reference axes spanning the face, in increasing order.
    pub fn tangential_axes(&self, dim: usize) -> impl Iterator<Item = usize> + '_ {
        (0..dim).filter(move |&d| d != self.axis)
    }

    /// Maps a point of the `(dim - 1)`-dimensional face rule into the reference cell.
    pub fn to_cell_point(&self, dim: usize, face_point: &Vector3<f64>) -> Vector3<f64> {
        let mut xi = Vector3::zeros();
        for (k, d) in self.tangential_axes(dim).enumerate() {
            xi[d] = face_point[k];
        }
        xi[self.axis] = self.outward_sign();
        xi
    }

    /// Local cell node indices of `family` lying on this face, in lexicographic order.
    ///
    /// Empty for the discontinuous constant family.
    pub fn nodes(&self, dim: usize, family: FiniteElementFamily) -> Vec<usize> {
        if !family.is_continuous() {
            return Vec::new();
        }
        let per_axis = family.degree() + 1;
        let fixed = self.side * (per_axis - 1);
        let stride = per_axis.pow(self.axis as u32);
        (0..family.num_nodes(dim))
            .filter(|&node| (node / stride) % per_axis == fixed)
            .collect()
    }
}

/// Basis values and reference gradients of one family at every point of a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct BasisTable {
    num_nodes: usize,
    values: Vec<f64>,
    gradients: Vec<Vector3<f64>>,
}

impl BasisTable {
    pub fn new(family: FiniteElementFamily, dim: usize, points: impl IntoIterator<Item = Vector3<f64>>) -> Self {
        let num_nodes = family.num_nodes(dim);
        let mut values = Vec::new();
        let mut gradients = Vec::new();
        for xi in points {
            let offset = values.len();
            values.resize(offset + num_nodes, 0.0);
            gradients.resize(offset + num_nodes, Vector3::zeros());
            family.populate_basis(dim, &xi, &mut values[offset..], &mut gradients[offset..]);
        }
        Self {
            num_nodes,
            values,
            gradients,
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    pub fn values(&self, point: usize) -> &[f64] {
        let n = self.num_nodes;
        &self.values[n * point..n * (point + 1)]
    }

    pub fn gradients(&self, point: usize) -> &[Vector3<f64>] {
        let n = self.num_nodes;
        &self.gradients[n * point..n * (point + 1)]
    }
}

/// Basis tables for all families, on the cell rule and on every face rule.
///
/// Built once per problem: every cell shares the same reference element.
#[derive(Debug, Clone)]
pub struct ReferenceTables {
    dim: usize,
    cell_rule: QuadratureRule,
    face_rule: QuadratureRule,
    cell: Vec<BasisTable>,
    faces: Vec<Vec<BasisTable>>,
}

impl ReferenceTables {
    /// Builds Gauss tables with `points_per_dim` points along every reference axis.
    pub fn new(dim: usize, points_per_dim: usize) -> eyre::Result<Self> {
        if !(1..=3).contains(&dim) {
            eyre::bail!("Unsupported cell dimension {dim}");
        }
        let cell_rule = QuadratureRule::gauss(dim, points_per_dim)?;
        let face_rule = QuadratureRule::gauss(dim - 1, points_per_dim)?;

        let cell = FiniteElementFamily::ALL
            .iter()
            .map(|&family| BasisTable::new(family, dim, cell_rule.points().iter().copied()))
            .collect();

        let faces = (0..2 * dim)
            .map(|local_face| {
                let face = ReferenceFace::from_local_index(dim, local_face);
                FiniteElementFamily::ALL
                    .iter()
                    .map(|&family| {
                        let points = face_rule.points().iter().map(|p| face.to_cell_point(dim, p));
                        BasisTable::new(family, dim, points)
                    })
                    .collect()
            })
            .collect();

        Ok(Self {
            dim,
            cell_rule,
            face_rule,
            cell,
            faces,
        })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn cell_rule(&self) -> &QuadratureRule {
        &self.cell_rule
    }

    pub fn face_rule(&self) -> &QuadratureRule {
        &self.face_rule
    }

    pub fn cell(&self, family: FiniteElementFamily) -> &BasisTable {
        &self.cell[family.index()]
    }

    pub fn face(&self, local_face: usize, family: FiniteElementFamily) -> &BasisTable {
        &self.faces[local_face][family.index()]
    }
}
