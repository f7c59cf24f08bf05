//! Quadrature rules on reference cells and reference faces.
use eyre::bail;
use fenopt_quadrature::tensor::tensor_gauss;
use fenopt_quadrature::Rule;
use nalgebra::Vector3;

/// A quadrature rule with points embedded in 3D reference coordinates.
///
/// Coordinates beyond the rule's dimension are zero.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadratureRule {
    weights: Vec<f64>,
    points: Vec<Vector3<f64>>,
}

impl QuadratureRule {
    /// Tensor-product Gauss rule on `[-1, 1]^dim` for `dim` in `0..=3`.
    ///
    /// The zero-dimensional rule is the single point with unit weight, used for the
    /// "faces" of one-dimensional cells.
    pub fn gauss(dim: usize, points_per_dim: usize) -> eyre::Result<Self> {
        if points_per_dim == 0 {
            bail!("Gauss rules need at least one point per dimension");
        }
        let rule = match dim {
            0 => embed(tensor_gauss::<0>(points_per_dim)),
            1 => embed(tensor_gauss::<1>(points_per_dim)),
            2 => embed(tensor_gauss::<2>(points_per_dim)),
            3 => embed(tensor_gauss::<3>(points_per_dim)),
            _ => bail!("No Gauss rule for reference dimension {dim}"),
        };
        Ok(rule)
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn points(&self) -> &[Vector3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

fn embed<const D: usize>((weights, points): Rule<D>) -> QuadratureRule {
    let points = points
        .into_iter()
        .map(|p| {
            let mut xi = Vector3::zeros();
            for (i, coord) in p.into_iter().enumerate() {
                xi[i] = coord;
            }
            xi
        })
        .collect();
    QuadratureRule { weights, points }
}
