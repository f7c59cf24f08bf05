//! Weak forms assembled on box meshes.
//!
//! The solid mechanics problem lives in the `fenopt-solid` crate, which builds on the same
//! assembly infrastructure.
pub mod navier_stokes_control;
