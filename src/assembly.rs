//! Element-wise assembly of residuals and Jacobians into global sparse systems.
//!
//! Assembly proceeds in three stages:
//!
//! 1. [`SystemDofMap::gather`](crate::dofs::SystemDofMap::gather) reads the local unknowns of a cell,
//! 2. a problem accumulates quadrature contributions into a [`LocalSystem`],
//! 3. the local system is scattered into a [`GlobalSystem`], which is finally closed into an
//!    [`AssembledSystem`] with a CSR Jacobian.
//!
//! Cells are split into contiguous ranges by an [`ElementPartition`]; each range is assembled
//! into its own [`GlobalSystem`] and the buffers are merged when closing.
mod constraint;
mod global;
mod local;
mod partition;
mod quadrature_point;

pub use constraint::*;
pub use global::*;
pub use local::*;
pub use partition::*;
pub use quadrature_point::*;
