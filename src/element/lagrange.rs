use nalgebra::Vector3;

/// Value and derivative of the 1D Lagrange basis function of the given degree associated with
/// the node `alpha` (one of the equispaced nodes in `[-1, 1]`), evaluated at `xi`.
fn phi_1d(degree: usize, alpha: f64, xi: f64) -> (f64, f64) {
    match degree {
        0 => (1.0, 0.0),
        1 => (0.5 * (1.0 + alpha * xi), 0.5 * alpha),
        2 => {
            // Written as a xi^2 + b xi + c, valid for alpha in {-1, 0, 1}
            let alpha2 = alpha * alpha;
            let a = 1.5 * alpha2 - 1.0;
            let b = 0.5 * alpha;
            let c = 1.0 - alpha2;
            (a * xi * xi + b * xi + c, 2.0 * a * xi + b)
        }
        _ => panic!("Lagrange basis of degree {degree} is not supported"),
    }
}

fn node_coordinate(degree: usize, local_index: usize) -> f64 {
    match degree {
        0 => 0.0,
        _ => -1.0 + 2.0 * local_index as f64 / degree as f64,
    }
}

/// Evaluates the 1D Lagrange basis of the given degree (nodes ordered from -1 to 1).
///
/// # Panics
///
/// Panics if the buffers do not hold exactly `degree + 1` entries.
pub fn lagrange_1d(degree: usize, xi: f64, values: &mut [f64], derivatives: &mut [f64]) {
    assert_eq!(values.len(), degree + 1);
    assert_eq!(derivatives.len(), degree + 1);
    for (i, (value, derivative)) in values.iter_mut().zip(derivatives.iter_mut()).enumerate() {
        let (phi, dphi) = phi_1d(degree, node_coordinate(degree, i), xi);
        *value = phi;
        *derivative = dphi;
    }
}

/// Evaluates the tensor-product Lagrange basis on `[-1, 1]^dim` at `xi`.
///
/// Gradient components beyond `dim` are zero.
///
/// # Panics
///
/// Panics if the buffers do not hold exactly `(degree + 1)^dim` entries.
pub fn tensor_lagrange(degree: usize, dim: usize, xi: &Vector3<f64>, values: &mut [f64], gradients: &mut [Vector3<f64>]) {
    let per_axis = degree + 1;
    let n = per_axis.pow(dim as u32);
    assert_eq!(values.len(), n);
    assert_eq!(gradients.len(), n);

    let mut phi = [[0.0; 3]; 3];
    let mut dphi = [[0.0; 3]; 3];
    for d in 0..dim {
        lagrange_1d(degree, xi[d], &mut phi[d][..per_axis], &mut dphi[d][..per_axis]);
    }

    for node in 0..n {
        let mut index = [0; 3];
        let mut rem = node;
        for d in 0..dim {
            index[d] = rem % per_axis;
            rem /= per_axis;
        }

        let mut value = 1.0;
        let mut gradient = Vector3::zeros();
        for d in 0..dim {
            value *= phi[d][index[d]];
        }
        for g in 0..dim {
            let mut component = 1.0;
            for d in 0..dim {
                component *= if d == g { dphi[d][index[d]] } else { phi[d][index[d]] };
            }
            gradient[g] = component;
        }
        values[node] = value;
        gradients[node] = gradient;
    }
}
