use crate::element::{FiniteElementFamily, GeometricMapping, ReferenceFace, ReferenceTables};
use nalgebra::Vector3;

/// Physical basis values and gradients of one family at one point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBasis {
    pub values: Vec<f64>,
    pub gradients: Vec<Vector3<f64>>,
}

impl PointBasis {
    /// `sum_i phi_i dofs_i`.
    pub fn interpolate(&self, dofs: &[f64]) -> f64 {
        assert_eq!(dofs.len(), self.values.len());
        self.values.iter().zip(dofs).map(|(phi, u)| phi * u).sum()
    }

    /// `sum_i grad(phi_i) dofs_i`.
    pub fn interpolate_gradient(&self, dofs: &[f64]) -> Vector3<f64> {
        assert_eq!(dofs.len(), self.gradients.len());
        self.gradients
            .iter()
            .zip(dofs)
            .map(|(grad, &u)| grad * u)
            .sum()
    }
}

/// Basis data of every family at one volume quadrature point of a cell.
///
/// The buffers are reused between points: call [`Self::update`] for each point.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumePoint {
    dim: usize,
    /// Quadrature weight times the Jacobian determinant.
    pub weight: f64,
    pub position: Vector3<f64>,
    bases: Vec<PointBasis>,
}

impl VolumePoint {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            weight: 0.0,
            position: Vector3::zeros(),
            bases: vec![PointBasis::default(); FiniteElementFamily::ALL.len()],
        }
    }

    /// Evaluates geometry and basis functions at volume point `q` of a cell with the given
    /// (quadratic) node coordinates.
    pub fn update(&mut self, tables: &ReferenceTables, coordinates: &[Vector3<f64>], q: usize) -> eyre::Result<()> {
        let geometry = tables.cell(FiniteElementFamily::Quadratic);
        let mapping = GeometricMapping::from_nodes(self.dim, coordinates, geometry.gradients(q))?;
        self.weight = tables.cell_rule().weights()[q] * mapping.determinant();
        self.position = interpolate_position(geometry.values(q), coordinates);
        for family in FiniteElementFamily::ALL {
            let table = tables.cell(family);
            fill_basis(&mut self.bases[family.index()], &mapping, table.values(q), table.gradients(q));
        }
        Ok(())
    }

    pub fn basis(&self, family: FiniteElementFamily) -> &PointBasis {
        &self.bases[family.index()]
    }
}

/// Basis data of every family at one quadrature point of a cell face.
#[derive(Debug, Clone, PartialEq)]
pub struct FacePoint {
    dim: usize,
    /// Face quadrature weight times the surface measure ratio.
    pub weight: f64,
    pub position: Vector3<f64>,
    /// Outward unit normal.
    pub normal: Vector3<f64>,
    /// Whether the face tangents are aligned with the coordinate axes at this point.
    pub axis_aligned: bool,
    bases: Vec<PointBasis>,
    surface_gradients: Vec<Vec<Vector3<f64>>>,
}

impl FacePoint {
    const ALIGNMENT_TOLERANCE: f64 = 1e-10;

    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            weight: 0.0,
            position: Vector3::zeros(),
            normal: Vector3::zeros(),
            axis_aligned: true,
            bases: vec![PointBasis::default(); FiniteElementFamily::ALL.len()],
            surface_gradients: vec![Vec::new(); FiniteElementFamily::ALL.len()],
        }
    }

    /// Evaluates geometry and basis functions at point `q` of the face rule on `local_face`.
    ///
    /// Basis functions are those of the cell, evaluated on the face; gradients are full volume
    /// gradients. Surface gradients use the axis-aligned approximation, see
    /// [`GeometricMapping::axis_aligned_surface_gradient`].
    pub fn update(
        &mut self,
        tables: &ReferenceTables,
        coordinates: &[Vector3<f64>],
        local_face: usize,
        q: usize,
    ) -> eyre::Result<()> {
        let face = ReferenceFace::from_local_index(self.dim, local_face);
        let geometry = tables.face(local_face, FiniteElementFamily::Quadratic);
        let mapping = GeometricMapping::from_nodes(self.dim, coordinates, geometry.gradients(q))?;
        let (normal, measure) = mapping.face_normal_and_measure(self.dim, &face);
        self.weight = tables.face_rule().weights()[q] * measure;
        self.normal = normal;
        self.position = interpolate_position(geometry.values(q), coordinates);
        self.axis_aligned = mapping.is_face_axis_aligned(self.dim, &face, Self::ALIGNMENT_TOLERANCE);
        for family in FiniteElementFamily::ALL {
            let table = tables.face(local_face, family);
            fill_basis(&mut self.bases[family.index()], &mapping, table.values(q), table.gradients(q));
            let surface = &mut self.surface_gradients[family.index()];
            surface.clear();
            surface.extend(
                table
                    .gradients(q)
                    .iter()
                    .map(|g| mapping.axis_aligned_surface_gradient(self.dim, &face, g)),
            );
        }
        Ok(())
    }

    pub fn basis(&self, family: FiniteElementFamily) -> &PointBasis {
        &self.bases[family.index()]
    }

    pub fn surface_gradients(&self, family: FiniteElementFamily) -> &[Vector3<f64>] {
        &self.surface_gradients[family.index()]
    }

    /// `sum_i grad_s(phi_i) dofs_i`.
    pub fn interpolate_surface_gradient(&self, family: FiniteElementFamily, dofs: &[f64]) -> Vector3<f64> {
        let gradients = self.surface_gradients(family);
        assert_eq!(dofs.len(), gradients.len());
        gradients.iter().zip(dofs).map(|(grad, &u)| grad * u).sum()
    }
}

fn fill_basis(basis: &mut PointBasis, mapping: &GeometricMapping<f64>, values: &[f64], gradients: &[Vector3<f64>]) {
    basis.values.clear();
    basis.values.extend_from_slice(values);
    basis.gradients.clear();
    basis
        .gradients
        .extend(gradients.iter().map(|g| mapping.physical_gradient(g)));
}

fn interpolate_position(geometry_values: &[f64], coordinates: &[Vector3<f64>]) -> Vector3<f64> {
    geometry_values
        .iter()
        .zip(coordinates)
        .map(|(phi, x)| x * *phi)
        .sum()
}
