//! Run configuration, read from JSON.
//!
//! Every struct implements [`Default`] and is deserialized with `#[serde(default)]`, so a
//! configuration file only needs to list the values that differ from the defaults.
use crate::optimize::newton::{ConvergenceCriterion, NewtonSettings};
use crate::FaceId;
use eyre::WrapErr;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub mesh: MeshConfig,
    pub quadrature: QuadratureConfig,
    pub newton: NewtonConfig,
    pub assembly: AssemblyConfig,
    pub navier_stokes: NavierStokesControlConfig,
    pub solid: SolidConfig,
}

/// Reads a JSON configuration file. Missing keys take their default values.
pub fn load_config(path: impl AsRef<Path>) -> eyre::Result<Config> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).wrap_err_with(|| format!("Failed to read config file {}", path.display()))?;
    parse_config(&json).wrap_err_with(|| format!("Failed to parse config file {}", path.display()))
}

/// Parses a JSON configuration string. Missing keys take their default values.
pub fn parse_config(json: &str) -> eyre::Result<Config> {
    Ok(serde_json::from_str(json)?)
}

/// Box mesh `[min, max]` with `cells_per_dim` cells along each axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    pub dim: usize,
    pub cells_per_dim: usize,
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            dim: 2,
            cells_per_dim: 4,
            min: [0.0; 3],
            max: [1.0; 3],
        }
    }
}

impl MeshConfig {
    pub fn min_point(&self) -> Point3<f64> {
        Point3::from(self.min)
    }

    pub fn max_point(&self) -> Point3<f64> {
        Point3::from(self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuadratureConfig {
    /// Gauss points along each reference axis.
    pub points_per_dim: usize,
}

impl Default for QuadratureConfig {
    fn default() -> Self {
        Self { points_per_dim: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewtonConfig {
    pub max_iterations: usize,
    pub tolerance: f64,
    pub criterion: ConvergenceCriterion,
    /// Keep the last iterate when `max_iterations` is reached without convergence, instead of
    /// failing. With this set, `max_iterations` acts as a fixed iteration budget.
    pub accept_unconverged: bool,
}

impl Default for NewtonConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            tolerance: 1e-10,
            criterion: ConvergenceCriterion::IncrementNorm,
            accept_unconverged: true,
        }
    }
}

impl NewtonConfig {
    pub fn settings(&self) -> NewtonSettings<f64> {
        NewtonSettings {
            max_iterations: Some(self.max_iterations),
            tolerance: self.tolerance,
            criterion: self.criterion,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Number of contiguous cell ranges assembled in parallel.
    pub num_workers: usize,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self { num_workers: 1 }
    }
}

/// Axis-aligned box selecting the cells where the velocity is tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetRegion {
    pub min: [f64; 3],
    pub max: [f64; 3],
    pub tolerance: f64,
}

impl Default for TargetRegion {
    fn default() -> Self {
        Self {
            min: [0.25; 3],
            max: [0.75; 3],
            tolerance: 1e-5,
        }
    }
}

impl TargetRegion {
    /// Whether the first `dim` coordinates of `point` lie in the box, enlarged by the tolerance.
    pub fn contains(&self, dim: usize, point: &Point3<f64>) -> bool {
        (0..dim).all(|d| point[d] >= self.min[d] - self.tolerance && point[d] <= self.max[d] + self.tolerance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavierStokesControlConfig {
    /// Boundary faces with this id carry the control.
    pub control_face_id: FaceId,
    /// Weight of the velocity tracking term.
    pub alpha: f64,
    /// Weight of the L2 control cost.
    pub beta: f64,
    /// Weight of the H1 (surface gradient) control cost.
    pub gamma: f64,
    pub advection: bool,
    pub desired_velocity: [f64; 3],
    pub force: [f64; 3],
    pub viscosity: f64,
    pub density: f64,
    pub reference_length: f64,
    pub reference_velocity: f64,
    /// Penalty matching the state velocity to the control on control nodes.
    pub control_penalty: f64,
    /// Penalty pinning the control to zero away from the control boundary.
    pub outside_control_penalty: f64,
    /// Value of the placeholder multiplier unknowns.
    pub multiplier_fixed_value: f64,
    pub target_region: TargetRegion,
}

impl Default for NavierStokesControlConfig {
    fn default() -> Self {
        Self {
            control_face_id: 3,
            alpha: 1.0,
            beta: 1e-2,
            gamma: 1e-2,
            advection: true,
            desired_velocity: [1.0, 0.0, 0.0],
            force: [0.0; 3],
            viscosity: 1.0,
            density: 1.0,
            reference_length: 1.0,
            reference_velocity: 1.0,
            control_penalty: 1e10,
            outside_control_penalty: 1e50,
            multiplier_fixed_value: 0.0,
            target_region: TargetRegion::default(),
        }
    }
}

impl NavierStokesControlConfig {
    /// Inverse Reynolds number `viscosity / (density L U)`.
    pub fn inverse_reynolds(&self) -> f64 {
        self.viscosity / (self.density * self.reference_length * self.reference_velocity)
    }

    pub fn desired_velocity(&self) -> Vector3<f64> {
        Vector3::from(self.desired_velocity)
    }

    pub fn force(&self) -> Vector3<f64> {
        Vector3::from(self.force)
    }
}

/// Cauchy stress models of the solid problem.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StressModel {
    LinearElastic,
    NeoHookean,
    MooneyRivlin,
}

impl StressModel {
    pub fn is_hyperelastic(&self) -> bool {
        !matches!(self, Self::LinearElastic)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolidConfig {
    pub young: f64,
    pub poisson: f64,
    pub density: f64,
    pub model: StressModel,
    /// Use the penalty formulation of the mass balance even for incompressible materials.
    pub use_penalty: bool,
    /// Bulk parameter of the penalty formulation for incompressible materials.
    pub penalty_lambda: f64,
    pub gravity: [f64; 3],
}

impl Default for SolidConfig {
    fn default() -> Self {
        Self {
            young: 1.5e6,
            poisson: 0.5,
            density: 1000.0,
            model: StressModel::NeoHookean,
            use_penalty: false,
            penalty_lambda: 1e10,
            gravity: [0.0, 1.0, 0.0],
        }
    }
}

impl SolidConfig {
    pub fn is_incompressible(&self) -> bool {
        self.poisson == 0.5
    }

    pub fn gravity(&self) -> Vector3<f64> {
        Vector3::from(self.gravity)
    }
}
