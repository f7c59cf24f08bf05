use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Accumulates residual entries and Jacobian triplets.
///
/// Contributions are purely additive: duplicate triplets are summed when the system is closed,
/// so the order in which elements are added does not matter beyond floating-point round-off.
#[derive(Debug, Clone)]
pub struct GlobalSystem {
    residual: DVector<f64>,
    jacobian: CooMatrix<f64>,
}

/// A closed system: residual `F(x)` and Jacobian `dF/dx`.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledSystem {
    pub residual: DVector<f64>,
    pub jacobian: CsrMatrix<f64>,
}

impl GlobalSystem {
    pub fn new(num_dofs: usize) -> Self {
        Self {
            residual: DVector::zeros(num_dofs),
            jacobian: CooMatrix::new(num_dofs, num_dofs),
        }
    }

    pub fn num_dofs(&self) -> usize {
        self.residual.len()
    }

    pub fn residual(&self) -> &DVector<f64> {
        &self.residual
    }

    /// Number of accumulated Jacobian triplets, duplicates included.
    pub fn num_triplets(&self) -> usize {
        self.jacobian.nnz()
    }

    pub fn add_residual_entry(&mut self, row: usize, value: f64) {
        self.residual[row] += value;
    }

    pub fn add_residual(&mut self, rows: &[usize], values: &[f64]) {
        assert_eq!(rows.len(), values.len());
        for (&row, &value) in rows.iter().zip(values) {
            self.residual[row] += value;
        }
    }

    pub fn add_jacobian_entry(&mut self, row: usize, col: usize, value: f64) {
        self.jacobian.push(row, col, value);
    }

    /// Adds `block[(a, b)]` to the entry `(rows[a], cols[b])`. Exact zeros are skipped.
    pub fn add_block(&mut self, rows: &[usize], cols: &[usize], block: &DMatrix<f64>) {
        assert_eq!(block.nrows(), rows.len());
        assert_eq!(block.ncols(), cols.len());
        for (b, &col) in cols.iter().enumerate() {
            for (a, &row) in rows.iter().enumerate() {
                let value = block[(a, b)];
                if value != 0.0 {
                    self.jacobian.push(row, col, value);
                }
            }
        }
    }

    /// Moves all contributions of `other` into `self`.
    pub fn merge(&mut self, other: GlobalSystem) {
        assert_eq!(self.num_dofs(), other.num_dofs());
        self.residual += other.residual;
        for (i, j, &v) in other.jacobian.triplet_iter() {
            self.jacobian.push(i, j, v);
        }
    }

    /// Converts the accumulated triplets into CSR form.
    ///
    /// An explicit zero is added on every diagonal entry so that rows without contributions
    /// (Dirichlet rows, the designated constraint row) are part of the sparsity pattern.
    pub fn close(mut self) -> AssembledSystem {
        for i in 0..self.num_dofs() {
            self.jacobian.push(i, i, 0.0);
        }
        AssembledSystem {
            residual: self.residual,
            jacobian: CsrMatrix::from(&self.jacobian),
        }
    }
}

impl AssembledSystem {
    /// Value of the Jacobian entry `(row, col)`, zero if it is not stored.
    pub fn jacobian_entry(&self, row: usize, col: usize) -> f64 {
        self.jacobian
            .get_entry(row, col)
            .map(|entry| entry.into_value())
            .unwrap_or(0.0)
    }

    pub fn dense_jacobian(&self) -> DMatrix<f64> {
        DMatrix::from(&self.jacobian)
    }
}
