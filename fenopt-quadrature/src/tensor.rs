//! Gauss rules on `[-1, 1]^D` formed as tensor products of univariate rules.
//!
//! Points are ordered lexicographically with the *first* coordinate varying fastest, matching
//! the node ordering of tensor-product Lagrange elements.

use crate::univariate::gauss;
use crate::Rule;

/// A tensor-product Gauss rule on `[-1, 1]^D` with `num_points_per_dim` points along each axis.
///
/// Integrates polynomials of degree `2 n - 1` in each variable exactly. `D = 0` yields the
/// single-point rule with unit weight.
pub fn tensor_gauss<const D: usize>(num_points_per_dim: usize) -> Rule<D> {
    let (weights_1d, points_1d) = gauss(num_points_per_dim);
    let n = weights_1d.len();
    let total = n.pow(D as u32);

    let mut weights = Vec::with_capacity(total);
    let mut points = Vec::with_capacity(total);
    for flat in 0..total {
        let mut w = 1.0;
        let mut point = [0.0; D];
        let mut rem = flat;
        for coord in point.iter_mut() {
            let i = rem % n;
            rem /= n;
            w *= weights_1d[i];
            *coord = points_1d[i][0];
        }
        weights.push(w);
        points.push(point);
    }

    (weights, points)
}

/// A Gauss quadrature rule for the reference quadrilateral `[-1, 1]^2`.
pub fn quadrilateral_gauss(num_points_per_dim: usize) -> Rule<2> {
    tensor_gauss(num_points_per_dim)
}

/// A Gauss quadrature rule for the reference hexahedron `[-1, 1]^3`.
pub fn hexahedron_gauss(num_points_per_dim: usize) -> Rule<3> {
    tensor_gauss(num_points_per_dim)
}
