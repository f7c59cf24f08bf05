//! Mixed displacement/pressure solid mechanics for `fenopt`.
//!
//! The momentum balance is posed on the current configuration `x = X + u` with Cauchy stress
//! `σ(u, p) = σ_dev(F) - p I`, and is closed by a mass balance (incompressibility or penalty)
//! equation for the pressure. Element Jacobians are obtained by forward-mode automatic
//! differentiation of the element residual.
pub mod gravity_source;
pub mod materials;
pub mod problem;

pub use gravity_source::GravitySource;
pub use materials::{CauchyStressModel, LameParameters, MassBalance, YoungPoisson};
pub use problem::{clamped_boundary_conditions, SolidElementResidual, SolidProblem};
