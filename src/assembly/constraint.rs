use crate::assembly::GlobalSystem;
use nalgebra::DVector;

/// A single global equation shared by all elements.
///
/// The constraint is registered once with the global row that carries it. Elements add their
/// contributions to the equation through [`LocalSystem`](crate::assembly::LocalSystem), and the
/// constraint scatters them into its row. Every other element-local copy of the constraint
/// unknown is a placeholder, recognized with [`Self::is_designated`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarConstraint {
    name: String,
    row: usize,
}

impl ScalarConstraint {
    pub fn new(name: impl Into<String>, row: usize) -> Self {
        Self { name: name.into(), row }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The designated global row.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn is_designated(&self, row: usize) -> bool {
        row == self.row
    }

    /// Adds an element's contributions to the constraint.
    ///
    /// `residual` is added to the designated row, `row_derivatives[a]` to the entry
    /// `(row, rows[a])` and `column_derivatives[a]` to the entry `(rows[a], row)`.
    pub fn scatter(
        &self,
        residual: f64,
        row_derivatives: &DVector<f64>,
        column_derivatives: &DVector<f64>,
        rows: &[usize],
        global: &mut GlobalSystem,
    ) {
        assert_eq!(row_derivatives.len(), rows.len());
        assert_eq!(column_derivatives.len(), rows.len());
        global.add_residual_entry(self.row, residual);
        for ((&r, &d_row), &d_col) in rows.iter().zip(row_derivatives).zip(column_derivatives) {
            if d_row != 0.0 {
                global.add_jacobian_entry(self.row, r, d_row);
            }
            if d_col != 0.0 {
                global.add_jacobian_entry(r, self.row, d_col);
            }
        }
    }
}
