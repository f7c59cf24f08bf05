//! Persistent storage of field values, keyed by field name.
use crate::fields::FieldRegistry;
use crate::mesh::Mesh;
use eyre::eyre;
use nalgebra::{DVector, Point3};

/// Values of every registered field, one vector per field.
///
/// Field `i` of the registry has one value per DOF of its family on the mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    names: Vec<String>,
    values: Vec<DVector<f64>>,
}

impl Solution {
    pub fn zeros(mesh: &Mesh, registry: &FieldRegistry) -> Self {
        Self::initialize_with(mesh, registry, |_, _| 0.0)
    }

    /// Evaluates `initial_condition(position, field name)` at every DOF location of every
    /// field: quadratic nodes, vertices or cell centers.
    pub fn initialize_with<F>(mesh: &Mesh, registry: &FieldRegistry, initial_condition: F) -> Self
    where
        F: Fn(&Point3<f64>, &str) -> f64,
    {
        let names = registry.fields().iter().map(|f| f.name.clone()).collect();
        let values = registry
            .fields()
            .iter()
            .map(|field| {
                DVector::from_fn(mesh.num_dofs(field.family), |dof, _| {
                    initial_condition(&mesh.dof_position(field.family, dof), &field.name)
                })
            })
            .collect();
        Self { names, values }
    }

    pub fn num_fields(&self) -> usize {
        self.values.len()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn field(&self, name: &str) -> eyre::Result<&DVector<f64>> {
        let index = self.index_of(name)?;
        Ok(&self.values[index])
    }

    pub fn field_mut(&mut self, name: &str) -> eyre::Result<&mut DVector<f64>> {
        let index = self.index_of(name)?;
        Ok(&mut self.values[index])
    }

    pub fn field_by_index(&self, index: usize) -> &DVector<f64> {
        &self.values[index]
    }

    pub fn field_by_index_mut(&mut self, index: usize) -> &mut DVector<f64> {
        &mut self.values[index]
    }

    fn index_of(&self, name: &str) -> eyre::Result<usize> {
        self.names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| eyre!("No stored values for field {name}"))
    }
}
