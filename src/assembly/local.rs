use crate::assembly::{GlobalSystem, ScalarConstraint};
use crate::dofs::ElementDofs;
use crate::element::FiniteElementFamily;
use nalgebra::{DMatrix, DVector};

/// Dense element residual and Jacobian, indexed by (field, local node) pairs.
///
/// Unknowns are laid out field by field in pde order, matching [`ElementDofs`]. The block
/// of the field pair `(r, c)` is the submatrix starting at `(offset(r), offset(c))`.
///
/// Contributions to a global [`ScalarConstraint`] are kept apart from the element unknowns:
/// `constraint_residual` and `constraint_row` belong to the designated row, and
/// `constraint_column` is the column of the designated unknown.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalSystem {
    offsets: Vec<usize>,
    residual: DVector<f64>,
    jacobian: DMatrix<f64>,
    constraint_residual: f64,
    constraint_row: DVector<f64>,
    constraint_column: DVector<f64>,
}

impl LocalSystem {
    pub fn new(dim: usize, families: &[FiniteElementFamily]) -> Self {
        let mut offsets = Vec::with_capacity(families.len());
        let mut size = 0;
        for family in families {
            offsets.push(size);
            size += family.num_nodes(dim);
        }
        Self {
            offsets,
            residual: DVector::zeros(size),
            jacobian: DMatrix::zeros(size, size),
            constraint_residual: 0.0,
            constraint_row: DVector::zeros(size),
            constraint_column: DVector::zeros(size),
        }
    }

    pub fn len(&self) -> usize {
        self.residual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residual.is_empty()
    }

    /// Zeroes all buffers. Must be called before each element.
    pub fn reset(&mut self) {
        self.residual.fill(0.0);
        self.jacobian.fill(0.0);
        self.constraint_residual = 0.0;
        self.constraint_row.fill(0.0);
        self.constraint_column.fill(0.0);
    }

    /// Local index of node `i` of the field with pde index `field`.
    #[inline]
    pub fn index(&self, field: usize, i: usize) -> usize {
        self.offsets[field] + i
    }

    #[inline]
    pub fn add_residual(&mut self, field: usize, i: usize, value: f64) {
        let a = self.index(field, i);
        self.residual[a] += value;
    }

    #[inline]
    pub fn add_jacobian(&mut self, row_field: usize, i: usize, col_field: usize, j: usize, value: f64) {
        let a = self.index(row_field, i);
        let b = self.index(col_field, j);
        self.jacobian[(a, b)] += value;
    }

    #[inline]
    pub fn add_constraint_residual(&mut self, value: f64) {
        self.constraint_residual += value;
    }

    /// Adds to the derivative of the constraint equation with respect to a local unknown.
    #[inline]
    pub fn add_constraint_row(&mut self, field: usize, j: usize, value: f64) {
        let b = self.index(field, j);
        self.constraint_row[b] += value;
    }

    /// Adds to the derivative of a local equation with respect to the constraint unknown.
    #[inline]
    pub fn add_constraint_column(&mut self, field: usize, i: usize, value: f64) {
        let a = self.index(field, i);
        self.constraint_column[a] += value;
    }

    pub fn residual(&self) -> &DVector<f64> {
        &self.residual
    }

    pub fn jacobian(&self) -> &DMatrix<f64> {
        &self.jacobian
    }

    pub fn constraint_residual(&self) -> f64 {
        self.constraint_residual
    }

    pub fn constraint_row(&self) -> &DVector<f64> {
        &self.constraint_row
    }

    pub fn constraint_column(&self) -> &DVector<f64> {
        &self.constraint_column
    }

    /// Whether every buffer, constraint contributions included, is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.constraint_residual == 0.0
            && self.residual.iter().all(|&v| v == 0.0)
            && self.jacobian.iter().all(|&v| v == 0.0)
            && self.constraint_row.iter().all(|&v| v == 0.0)
            && self.constraint_column.iter().all(|&v| v == 0.0)
    }

    /// Adds the element contributions to the global system, using the rows gathered in `dofs`.
    pub fn scatter(&self, dofs: &ElementDofs, constraint: Option<&ScalarConstraint>, global: &mut GlobalSystem) {
        assert_eq!(dofs.len(), self.len(), "local system and element DOFs disagree in size");
        let rows = dofs.rows();
        global.add_residual(rows, self.residual.as_slice());
        global.add_block(rows, rows, &self.jacobian);
        if let Some(constraint) = constraint {
            constraint.scatter(
                self.constraint_residual,
                &self.constraint_row,
                &self.constraint_column,
                rows,
                global,
            );
        }
    }
}
