//! Geometric maps from reference cells to physical cells.
//!
//! Everything here is generic over [`DiffScalar`] so that residuals posed on the deformed
//! configuration can be differentiated with respect to the nodal coordinates.
use crate::element::ReferenceFace;
use eyre::bail;
use fenopt_traits::DiffScalar;
use nalgebra::{Matrix3, Vector3};

/// The Jacobian $\vec J = \pd{\vec x}{\vec \xi}$ of the geometric map at a single reference point.
///
/// For cells of dimension less than 3 the unused block is the identity, so determinants and
/// inverses can be computed uniformly on 3x3 matrices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometricMapping<T: DiffScalar> {
    jacobian: Matrix3<T>,
    inverse_transpose: Matrix3<T>,
    determinant: T,
}

impl<T: DiffScalar> GeometricMapping<T> {
    /// Computes the map from nodal coordinates and the reference gradients of the geometric basis.
    ///
    /// Fails if the determinant is not positive (degenerate or inverted cell).
    pub fn from_nodes(dim: usize, coordinates: &[Vector3<T>], reference_gradients: &[Vector3<f64>]) -> eyre::Result<Self> {
        assert_eq!(coordinates.len(), reference_gradients.len());
        let mut jacobian = Matrix3::identity();
        for i in 0..dim {
            jacobian[(i, i)] = T::zero();
        }
        for (x, grad) in coordinates.iter().zip(reference_gradients) {
            for i in 0..dim {
                for j in 0..dim {
                    jacobian[(i, j)] += x[i] * grad[j];
                }
            }
        }

        let (determinant, inverse) = determinant_and_inverse(&jacobian);
        if determinant.value() <= 0.0 {
            bail!("Geometric map has non-positive Jacobian determinant {}", determinant.value());
        }

        Ok(Self {
            jacobian,
            inverse_transpose: inverse.transpose(),
            determinant,
        })
    }

    pub fn jacobian(&self) -> &Matrix3<T> {
        &self.jacobian
    }

    pub fn determinant(&self) -> T {
        self.determinant
    }

    /// $\nabla_x \phi = \vec J^{-T} \nabla_\xi \phi$.
    pub fn physical_gradient(&self, reference_gradient: &Vector3<f64>) -> Vector3<T> {
        self.inverse_transpose * reference_gradient.map(T::from_value)
    }

    /// Outward unit normal and surface measure ratio of a reference face at this point.
    ///
    /// Uses Nanson's relation $\d a\, \vec n = \det(\vec J)\, \vec J^{-T} \vec N\, \d A$, with
    /// $\vec N$ the outward reference normal.
    pub fn face_normal_and_measure(&self, dim: usize, face: &ReferenceFace) -> (Vector3<T>, T) {
        let sign = face.outward_sign();
        let mut scaled = Vector3::zeros();
        for i in 0..dim {
            scaled[i] = self.inverse_transpose[(i, face.axis)] * sign;
        }
        let norm = scaled.dot(&scaled).sqrt();
        (scaled / norm, self.determinant * norm)
    }

    /// Gradient along a face of an axis-aligned cell.
    ///
    /// Each tangential reference axis `d` is assumed to map onto the physical axis `d`, so
    /// component `d` is `(dphi/dxi_d) / (dx_d/dxi_d)` and the normal component is zero. Only
    /// valid when [`Self::is_face_axis_aligned`] holds.
    pub fn axis_aligned_surface_gradient(
        &self,
        dim: usize,
        face: &ReferenceFace,
        reference_gradient: &Vector3<f64>,
    ) -> Vector3<T> {
        let mut gradient = Vector3::zeros();
        for d in face.tangential_axes(dim) {
            gradient[d] = T::from_value(reference_gradient[d]) / self.jacobian[(d, d)];
        }
        gradient
    }

    /// Whether every tangent vector of the face points along its own coordinate axis.
    pub fn is_face_axis_aligned(&self, dim: usize, face: &ReferenceFace, tolerance: f64) -> bool {
        face.tangential_axes(dim).all(|d| {
            let diagonal = self.jacobian[(d, d)].value().abs();
            (0..dim)
                .filter(|&i| i != d)
                .all(|i| self.jacobian[(i, d)].value().abs() <= tolerance * diagonal)
        })
    }
}

/// Determinant and inverse of a 3x3 matrix by cofactor expansion.
///
/// The inverse is meaningless if the determinant is zero.
pub fn determinant_and_inverse<T: DiffScalar>(m: &Matrix3<T>) -> (T, Matrix3<T>) {
    let c00 = m[(1, 1)] * m[(2, 2)] - m[(1, 2)] * m[(2, 1)];
    let c01 = m[(1, 2)] * m[(2, 0)] - m[(1, 0)] * m[(2, 2)];
    let c02 = m[(1, 0)] * m[(2, 1)] - m[(1, 1)] * m[(2, 0)];
    let det = m[(0, 0)] * c00 + m[(0, 1)] * c01 + m[(0, 2)] * c02;

    #[rustfmt::skip]
    let adjugate = Matrix3::new(
        c00, m[(0, 2)] * m[(2, 1)] - m[(0, 1)] * m[(2, 2)], m[(0, 1)] * m[(1, 2)] - m[(0, 2)] * m[(1, 1)],
        c01, m[(0, 0)] * m[(2, 2)] - m[(0, 2)] * m[(2, 0)], m[(0, 2)] * m[(1, 0)] - m[(0, 0)] * m[(1, 2)],
        c02, m[(0, 1)] * m[(2, 0)] - m[(0, 0)] * m[(2, 1)], m[(0, 0)] * m[(1, 1)] - m[(0, 1)] * m[(1, 0)],
    );
    (det, adjugate / det)
}

/// Determinant of a 3x3 matrix.
pub fn determinant<T: DiffScalar>(m: &Matrix3<T>) -> T {
    determinant_and_inverse(m).0
}
