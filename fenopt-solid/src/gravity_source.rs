use fenopt::nalgebra::Vector3;

/// A constant body force per unit mass.
///
/// In the weak form this is the term
/// <div>$$
///  -\int_{\Omega_t} \vec g \cdot \vec w \, \d{\vec x},
/// $$</div>
/// of the momentum residual, where $\vec w$ is a test function.
#[derive(Debug, Clone, PartialEq)]
pub struct GravitySource {
    acceleration: Vector3<f64>,
}

impl GravitySource {
    pub fn from_acceleration(acceleration: Vector3<f64>) -> Self {
        Self { acceleration }
    }

    /// The acceleration restricted to the first `dim` components.
    pub fn acceleration(&self, dim: usize) -> Vector3<f64> {
        let mut g = Vector3::zeros();
        for k in 0..dim.min(3) {
            g[k] = self.acceleration[k];
        }
        g
    }
}
