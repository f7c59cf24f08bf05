use fenopt::config::{SolidConfig, StressModel};
use fenopt::element::mapping::{determinant, determinant_and_inverse};
use fenopt::nalgebra::Matrix3;
use fenopt::DiffScalar;
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LameParameters<T> {
    pub mu: T,
    pub lambda: T,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YoungPoisson<T> {
    pub young: T,
    pub poisson: T,
}

impl<T> From<YoungPoisson<T>> for LameParameters<T>
where
    T: DiffScalar,
{
    /// For `poisson = 0.5` the second Lamé parameter is infinite.
    #[replace_float_literals(T::from_value(literal))]
    fn from(params: YoungPoisson<T>) -> Self {
        let YoungPoisson { young, poisson } = params;
        let mu = 0.5 * young / (1.0 + poisson);
        let lambda = 2.0 * mu * poisson / (1.0 - 2.0 * poisson);
        Self { mu, lambda }
    }
}

impl LameParameters<f64> {
    /// Lamé parameters per unit density, `(mu / density, lambda / density)`.
    pub fn per_unit_density(&self, density: f64) -> Self {
        Self {
            mu: self.mu / density,
            lambda: self.lambda / density,
        }
    }
}

/// A Cauchy stress model, without the pressure contribution.
///
/// Implementors are stress-free at $\vec F = \vec I$.
pub trait CauchyStressModel {
    /// Computes the Cauchy stress from the deformation gradient $\vec F = \vec I + \nabla_X \vec u$.
    ///
    /// In 2D the gradient is padded with $F_{33} = 1$.
    fn compute_stress<T: DiffScalar>(
        &self,
        deformation_gradient: &Matrix3<T>,
        parameters: &LameParameters<f64>,
    ) -> Matrix3<T>;
}

/// Small-strain elasticity, $\vec \sigma = 2 \mu \vec \epsilon$ with
/// $\vec \epsilon = \frac{1}{2}(\vec F + \vec F^T) - \vec I$.
///
/// The volumetric response is carried entirely by the pressure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearElasticMaterial;

#[allow(non_snake_case)]
fn infinitesimal_strain_tensor<T: DiffScalar>(deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
    let F = deformation_gradient;
    let mut eps = Matrix3::zeros();
    for i in 0..3 {
        for j in 0..3 {
            eps[(i, j)] = (F[(i, j)] + F[(j, i)]) * 0.5;
        }
        eps[(i, i)] -= T::one();
    }
    eps
}

impl CauchyStressModel for LinearElasticMaterial {
    fn compute_stress<T: DiffScalar>(
        &self,
        deformation_gradient: &Matrix3<T>,
        parameters: &LameParameters<f64>,
    ) -> Matrix3<T> {
        infinitesimal_strain_tensor(deformation_gradient) * T::from_value(2.0 * parameters.mu)
    }
}

/// Compressible Neo-Hookean model, $\vec \sigma = \frac{\mu}{J} (\vec B - \vec I)$, where
/// $\vec B = \vec F \vec F^T$ is the left Cauchy-Green tensor and $J = \det \vec F$.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NeoHookeanMaterial;

fn left_cauchy_green<T: DiffScalar>(deformation_gradient: &Matrix3<T>) -> Matrix3<T> {
    deformation_gradient * deformation_gradient.transpose()
}

impl CauchyStressModel for NeoHookeanMaterial {
    #[allow(non_snake_case)]
    fn compute_stress<T: DiffScalar>(
        &self,
        deformation_gradient: &Matrix3<T>,
        parameters: &LameParameters<f64>,
    ) -> Matrix3<T> {
        let J = determinant(deformation_gradient);
        let B = left_cauchy_green(deformation_gradient);
        (B - Matrix3::identity()) * (T::from_value(parameters.mu) / J)
    }
}

/// Two-parameter Mooney-Rivlin model,
/// $$
/// \vec \sigma = \frac{2}{J} \left( C_1 (\vec B - \vec I) - C_2 (\vec B^{-1} - \vec I) \right),
/// $$
/// with $C_1 = \mu / 3$ and $C_2 = C_1 / 2$.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MooneyRivlinMaterial;

impl CauchyStressModel for MooneyRivlinMaterial {
    #[allow(non_snake_case)]
    #[replace_float_literals(T::from_value(literal))]
    fn compute_stress<T: DiffScalar>(
        &self,
        deformation_gradient: &Matrix3<T>,
        parameters: &LameParameters<f64>,
    ) -> Matrix3<T> {
        let c1 = T::from_value(parameters.mu) / 3.0;
        let c2 = c1 * 0.5;
        let J = determinant(deformation_gradient);
        let B = left_cauchy_green(deformation_gradient);
        let (_, B_inv) = determinant_and_inverse(&B);
        let I = Matrix3::identity();
        ((B - I) * c1 - (B_inv - I) * c2) * (2.0 / J)
    }
}

impl CauchyStressModel for StressModel {
    fn compute_stress<T: DiffScalar>(
        &self,
        deformation_gradient: &Matrix3<T>,
        parameters: &LameParameters<f64>,
    ) -> Matrix3<T> {
        match self {
            StressModel::LinearElastic => LinearElasticMaterial.compute_stress(deformation_gradient, parameters),
            StressModel::NeoHookean => NeoHookeanMaterial.compute_stress(deformation_gradient, parameters),
            StressModel::MooneyRivlin => MooneyRivlinMaterial.compute_stress(deformation_gradient, parameters),
        }
    }
}

/// The pressure equation.
///
/// With a volume change measure `vol`, the pointwise residual is `vol` for the exactly
/// incompressible formulation and `vol + p / lambda` otherwise, where `lambda` is the penalty
/// parameter for incompressible materials and the second Lamé parameter for compressible ones.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MassBalance {
    pub incompressible: bool,
    pub use_penalty: bool,
    pub lambda: f64,
}

impl MassBalance {
    /// `parameters` are the Lamé parameters per unit density.
    pub fn from_config(config: &SolidConfig, parameters: &LameParameters<f64>) -> Self {
        let incompressible = config.is_incompressible();
        Self {
            incompressible,
            use_penalty: config.use_penalty,
            lambda: if incompressible {
                config.penalty_lambda
            } else {
                parameters.lambda
            },
        }
    }

    pub fn residual<T: DiffScalar>(&self, volume_change: T, pressure: T) -> T {
        if self.incompressible && !self.use_penalty {
            volume_change
        } else {
            volume_change + pressure / self.lambda
        }
    }
}
