//! Boundary conditions and their application to assembled systems.
use crate::assembly::AssembledSystem;
use crate::dofs::SystemDofMap;
use crate::mesh::Mesh;
use crate::FaceId;
use nalgebra::{DVector, Point3};
use std::collections::BTreeMap;

/// The condition imposed on a field at a boundary DOF.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DofCondition {
    Dirichlet(f64),
    Natural,
}

/// Source of boundary conditions, queried per field and boundary DOF.
pub trait BoundaryConditions {
    fn condition(&self, position: &Point3<f64>, field: &str, face: FaceId, time: f64) -> DofCondition;
}

impl<F> BoundaryConditions for F
where
    F: Fn(&Point3<f64>, &str, FaceId, f64) -> DofCondition,
{
    fn condition(&self, position: &Point3<f64>, field: &str, face: FaceId, time: f64) -> DofCondition {
        self(position, field, face, time)
    }
}

/// Global rows with prescribed values, sorted by row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirichletDofs {
    rows: Vec<usize>,
    values: Vec<f64>,
}

impl DirichletDofs {
    /// Queries `conditions` for every field of `dof_map` at every DOF of every tagged boundary
    /// face.
    ///
    /// A DOF is constrained if any adjacent face prescribes a value; the first value in
    /// cell/face order is kept. Discontinuous (constant) fields have no face DOFs and are never
    /// constrained.
    pub fn from_conditions(
        mesh: &Mesh,
        dof_map: &SystemDofMap,
        conditions: &impl BoundaryConditions,
        time: f64,
    ) -> Self {
        let fields = dof_map.fields();
        let mut prescribed = BTreeMap::new();
        for (cell, local_face, face_id) in mesh.boundary_faces() {
            for k in 0..fields.len() {
                let family = fields.families[k];
                for field_dof in mesh.face_nodes(cell, local_face, family) {
                    let row = dof_map.global_row(k, field_dof);
                    if prescribed.contains_key(&row) {
                        continue;
                    }
                    let position = mesh.dof_position(family, field_dof);
                    if let DofCondition::Dirichlet(value) =
                        conditions.condition(&position, &fields.names[k], face_id, time)
                    {
                        prescribed.insert(row, value);
                    }
                }
            }
        }
        let (rows, values) = prescribed.into_iter().unzip();
        Self { rows, values }
    }

    /// Rows may be given in any order. For repeated rows the first value is kept.
    pub fn from_rows_and_values(rows: Vec<usize>, values: Vec<f64>) -> Self {
        assert_eq!(rows.len(), values.len());
        let mut prescribed = BTreeMap::new();
        for (row, value) in rows.into_iter().zip(values) {
            prescribed.entry(row).or_insert(value);
        }
        let (rows, values) = prescribed.into_iter().unzip();
        Self { rows, values }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn contains(&self, row: usize) -> bool {
        self.rows.binary_search(&row).is_ok()
    }

    /// Writes the prescribed values into `x`.
    pub fn enforce(&self, x: &mut DVector<f64>) {
        for (&row, &value) in self.rows.iter().zip(&self.values) {
            x[row] = value;
        }
    }

    /// Replaces every Dirichlet equation of `system` by `x_r - value_r = 0`.
    ///
    /// The row is zeroed, the diagonal set to one and the residual set to `x_r - value_r`.
    /// The diagonal must be part of the sparsity pattern, which
    /// [`GlobalSystem::close`](crate::assembly::GlobalSystem::close) guarantees.
    pub fn apply(&self, system: &mut AssembledSystem, x: &DVector<f64>) {
        for (&row, &value) in self.rows.iter().zip(&self.values) {
            let mut csr_row = system.jacobian.row_mut(row);
            let (cols, entries) = csr_row.cols_and_values_mut();
            let mut has_diagonal = false;
            for (&col, entry) in cols.iter().zip(entries) {
                if col == row {
                    *entry = 1.0;
                    has_diagonal = true;
                } else {
                    *entry = 0.0;
                }
            }
            assert!(has_diagonal, "Dirichlet row {row} has no diagonal entry");
            system.residual[row] = x[row] - value;
        }
    }
}
