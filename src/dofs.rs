//! Global numbering of the system unknowns and per-element gathering.
use crate::element::FiniteElementFamily;
use crate::fields::ResolvedFields;
use crate::mesh::Mesh;
use crate::solution::Solution;
use nalgebra::DVector;

/// Maps (field, field DOF) pairs to rows of the global system.
///
/// Fields are laid out contiguously in pde order: the row of DOF `d` of the field with pde
/// index `k` is `field_offset(k) + d`. Field DOFs are quadratic node indices, vertex indices
/// or cell indices depending on the family.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemDofMap {
    fields: ResolvedFields,
    offsets: Vec<usize>,
    field_sizes: Vec<usize>,
}

impl SystemDofMap {
    pub fn new(mesh: &Mesh, fields: ResolvedFields) -> Self {
        let field_sizes: Vec<_> = fields
            .families
            .iter()
            .map(|&family| mesh.num_dofs(family))
            .collect();
        let mut offsets = Vec::with_capacity(field_sizes.len());
        let mut offset = 0;
        for size in &field_sizes {
            offsets.push(offset);
            offset += size;
        }
        Self {
            fields,
            offsets,
            field_sizes,
        }
    }

    pub fn fields(&self) -> &ResolvedFields {
        &self.fields
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    /// Total number of unknowns.
    pub fn num_dofs(&self) -> usize {
        self.offsets.last().copied().unwrap_or(0) + self.field_sizes.last().copied().unwrap_or(0)
    }

    pub fn field_offset(&self, pde_index: usize) -> usize {
        self.offsets[pde_index]
    }

    pub fn field_size(&self, pde_index: usize) -> usize {
        self.field_sizes[pde_index]
    }

    pub fn global_row(&self, pde_index: usize, field_dof: usize) -> usize {
        debug_assert!(field_dof < self.field_sizes[pde_index]);
        self.offsets[pde_index] + field_dof
    }

    /// Inverse of [`Self::global_row`]: the pde index and field DOF of a row.
    pub fn field_of_row(&self, row: usize) -> (usize, usize) {
        assert!(row < self.num_dofs(), "row out of bounds");
        let pde_index = self.offsets.partition_point(|&offset| offset <= row) - 1;
        (pde_index, row - self.offsets[pde_index])
    }

    /// Number of local unknowns of a cell, summed over all fields.
    pub fn local_size(&self, dim: usize) -> usize {
        self.fields.families.iter().map(|f| f.num_nodes(dim)).sum()
    }

    /// Reads the values and global rows of every field on `cell`.
    pub fn gather(&self, mesh: &Mesh, cell: usize, solution: &Solution, dofs: &mut ElementDofs) {
        dofs.resize(mesh.dim(), &self.fields.families);
        for (k, &family) in self.fields.families.iter().enumerate() {
            let values = solution.field_by_index(self.fields.solution_indices[k]);
            let start = dofs.offsets[k];
            for (i, &field_dof) in mesh.cell_dofs(cell, family).iter().enumerate() {
                dofs.rows[start + i] = self.global_row(k, field_dof);
                dofs.values[start + i] = values[field_dof];
            }
        }
    }

    /// Flattens the resolved fields of `solution` into a system vector.
    pub fn system_vector(&self, solution: &Solution) -> DVector<f64> {
        let mut x = DVector::zeros(self.num_dofs());
        for k in 0..self.num_fields() {
            let values = solution.field_by_index(self.fields.solution_indices[k]);
            x.rows_mut(self.offsets[k], self.field_sizes[k]).copy_from(values);
        }
        x
    }

    /// Writes a system vector back into the resolved fields of `solution`.
    pub fn update_solution(&self, x: &DVector<f64>, solution: &mut Solution) {
        assert_eq!(x.len(), self.num_dofs());
        for k in 0..self.num_fields() {
            let values = solution.field_by_index_mut(self.fields.solution_indices[k]);
            values.copy_from(&x.rows(self.offsets[k], self.field_sizes[k]));
        }
    }
}

/// Local unknowns of one cell: values and global rows, laid out field by field in pde order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementDofs {
    offsets: Vec<usize>,
    rows: Vec<usize>,
    values: Vec<f64>,
}

impl ElementDofs {
    fn resize(&mut self, dim: usize, families: &[FiniteElementFamily]) {
        self.offsets.clear();
        let mut offset = 0;
        for family in families {
            self.offsets.push(offset);
            offset += family.num_nodes(dim);
        }
        self.rows.resize(offset, 0);
        self.values.resize(offset, 0.0);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Local index of the first DOF of a field.
    pub fn field_offset(&self, pde_index: usize) -> usize {
        self.offsets[pde_index]
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn field_rows(&self, pde_index: usize) -> &[usize] {
        &self.rows[self.field_range(pde_index)]
    }

    pub fn field_values(&self, pde_index: usize) -> &[f64] {
        &self.values[self.field_range(pde_index)]
    }

    fn field_range(&self, pde_index: usize) -> std::ops::Range<usize> {
        let end = self
            .offsets
            .get(pde_index + 1)
            .copied()
            .unwrap_or(self.rows.len());
        self.offsets[pde_index]..end
    }
}
