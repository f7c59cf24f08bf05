//! Finite element assembly for Navier–Stokes optimal boundary control and nonlinear solid
//! mechanics on tensor-product Lagrange meshes.
//!
//! The crate is organized bottom-up:
//!
//! - [`quadrature`] and [`element`] provide reference rules, Lagrange bases and geometric maps,
//! - [`mesh`] provides box meshes of quadrilaterals/hexahedra with tagged boundary faces,
//! - [`fields`], [`solution`] and [`dofs`] name the unknowns, store their values and number them,
//! - [`assembly`] gathers element data and scatters into a global sparse system,
//! - [`problems`] contains the weak forms,
//! - [`solver`] drives Newton iterations over an assembled problem,
//! - [`config`] reads JSON configuration.

pub mod assembly;
pub mod boundary;
pub mod config;
pub mod dofs;
pub mod element;
pub mod fields;
pub mod mesh;
pub mod problems;
pub mod quadrature;
pub mod solution;
pub mod solver;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;
pub extern crate nalgebra_sparse;

pub mod autodiff {
    pub use fenopt_autodiff::*;
}

pub mod optimize {
    pub use fenopt_optimize::*;
}

pub use fenopt_traits::{DiffScalar, Real};

/// Identifier of a tagged boundary face.
///
/// Box meshes use 1 = bottom (`y` min), 2 = right (`x` max), 3 = top (`y` max), 4 = left
/// (`x` min), and in 3D 5 = `z` min and 6 = `z` max.
pub type FaceId = u32;
