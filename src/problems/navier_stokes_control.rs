//! Optimal boundary control of the stationary Navier–Stokes equations.
//!
//! The unknowns are the state velocity `u` and pressure `p`, the adjoint velocity `λ` and
//! pressure `q`, the control velocity `g` on the control boundary `Γc` and a scalar multiplier
//! `θ` enforcing `∫_Γc g·n = 0`. The assembled residual is the first-order optimality system
//! of the tracking functional
//!
//! ```text
//! J(u, g) = α/2 ∫_target |u - ud|² + β/2 ∫_Γc |g|² + γ/2 ∫_Γc |∇s g|²,
//! ```
//!
//! where the state velocity is tied to the control on `Γc` by a nodal penalty and the control
//! is pinned to zero away from `Γc` by a second penalty.
//!
//! The multiplier field is piecewise constant, so every cell carries its own copy. Only the
//! copy of the first cell of worker 0 is the real unknown; every other copy satisfies
//! `θ_e = θ_fixed`.
use crate::assembly::{
    AssembledSystem, ElementPartition, FacePoint, GlobalSystem, LocalSystem, ScalarConstraint, VolumePoint,
};
use crate::boundary::{BoundaryConditions, DofCondition};
use crate::config::{AssemblyConfig, NavierStokesControlConfig, QuadratureConfig};
use crate::dofs::{ElementDofs, SystemDofMap};
use crate::element::{FiniteElementFamily, ReferenceFace, ReferenceTables};
use crate::fields::{FieldRegistry, NavierStokesFields, CONTROL_NAMES, MULTIPLIER_NAME, VELOCITY_NAMES};
use crate::mesh::Mesh;
use crate::solution::Solution;
use crate::solver::NonlinearProblem;
use crate::FaceId;
use eyre::{bail, eyre};
use log::{info, warn};
use nalgebra::{Point3, Vector3};
use std::ops::Range;

mod boundary;
mod cost;
mod volume;

pub use cost::{compute_cost_functional, CostFunctional};

/// Scalar coefficients of the weak form.
#[derive(Debug, Clone, PartialEq)]
struct Coefficients {
    dim: usize,
    inverse_reynolds: f64,
    advection: f64,
    alpha: f64,
    beta: f64,
    gamma: f64,
    desired_velocity: Vector3<f64>,
    force: Vector3<f64>,
    control_penalty: f64,
    outside_control_penalty: f64,
    multiplier_fixed_value: f64,
}

/// Buffers reused across the cells assembled by one worker.
#[derive(Debug, Clone)]
struct ElementWorkspace {
    dofs: ElementDofs,
    local: LocalSystem,
    coordinates: Vec<Vector3<f64>>,
    volume_point: VolumePoint,
    face_point: FacePoint,
}

/// The assembled optimality system on a fixed mesh.
#[derive(Debug, Clone)]
pub struct NavierStokesControlProblem {
    mesh: Mesh,
    config: NavierStokesControlConfig,
    coefficients: Coefficients,
    tables: ReferenceTables,
    fields: NavierStokesFields,
    dof_map: SystemDofMap,
    partition: ElementPartition,
    constraint: ScalarConstraint,
    designated_cell: usize,
    /// Local quadratic nodes of each reference face.
    face_nodes: Vec<Vec<usize>>,
    /// Per quadratic node: whether it lies on a control face.
    control_nodes: Vec<bool>,
    /// Per quadratic node: number of control faces containing it.
    control_face_multiplicity: Vec<usize>,
    /// Per quadratic node: number of cells containing it.
    node_multiplicity: Vec<usize>,
    target_cells: Vec<bool>,
    control_cells: Vec<bool>,
}

impl NavierStokesControlProblem {
    pub fn new(
        mesh: Mesh,
        registry: &FieldRegistry,
        config: &NavierStokesControlConfig,
        quadrature: &QuadratureConfig,
        assembly: &AssemblyConfig,
    ) -> eyre::Result<Self> {
        let dim = mesh.dim();
        if !(2..=3).contains(&dim) {
            bail!("Navier-Stokes control needs a 2D or 3D mesh, got dimension {dim}");
        }
        if assembly.num_workers == 0 {
            bail!("Assembly needs at least one worker");
        }

        let tables = ReferenceTables::new(dim, quadrature.points_per_dim)?;
        let fields = NavierStokesFields::resolve(registry, dim)?;
        let dof_map = SystemDofMap::new(&mesh, fields.resolved.clone());
        let partition = ElementPartition::uniform(mesh.num_cells(), assembly.num_workers);
        let designated_cell = partition
            .first_cell()
            .ok_or_else(|| eyre!("Cannot assemble on a mesh without cells"))?;
        let constraint = ScalarConstraint::new(MULTIPLIER_NAME, dof_map.global_row(fields.multiplier, designated_cell));

        let face_nodes = (0..2 * dim)
            .map(|f| ReferenceFace::from_local_index(dim, f).nodes(dim, FiniteElementFamily::Quadratic))
            .collect();

        let mut control_nodes = vec![false; mesh.num_nodes()];
        let mut control_face_multiplicity = vec![0; mesh.num_nodes()];
        let mut control_cells = vec![false; mesh.num_cells()];
        let mut num_control_faces = 0;
        for (cell, local_face, face_id) in mesh.boundary_faces() {
            if face_id == config.control_face_id {
                num_control_faces += 1;
                control_cells[cell] = true;
                for node in mesh.face_nodes(cell, local_face, FiniteElementFamily::Quadratic) {
                    control_nodes[node] = true;
                    control_face_multiplicity[node] += 1;
                }
            }
        }
        if num_control_faces == 0 {
            warn!(
                "No boundary face has the control face id {}; the control is pinned everywhere",
                config.control_face_id
            );
        }

        let target_cells = (0..mesh.num_cells())
            .map(|cell| config.target_region.contains(dim, &mesh.cell_center(cell)))
            .collect();

        let coefficients = Coefficients {
            dim,
            inverse_reynolds: config.inverse_reynolds(),
            advection: if config.advection { 1.0 } else { 0.0 },
            alpha: config.alpha,
            beta: config.beta,
            gamma: config.gamma,
            desired_velocity: config.desired_velocity(),
            force: config.force(),
            control_penalty: config.control_penalty,
            outside_control_penalty: config.outside_control_penalty,
            multiplier_fixed_value: config.multiplier_fixed_value,
        };

        let problem = Self {
            node_multiplicity: mesh.node_cell_multiplicity(),
            mesh,
            config: config.clone(),
            coefficients,
            tables,
            fields,
            dof_map,
            partition,
            constraint,
            designated_cell,
            face_nodes,
            control_nodes,
            control_face_multiplicity,
            target_cells,
            control_cells,
        };
        problem.check_control_face_alignment()?;

        info!(
            "Navier-Stokes control problem: {} cells, {} unknowns, {} control faces, {} target cells",
            problem.mesh.num_cells(),
            problem.dof_map.num_dofs(),
            num_control_faces,
            problem.target_cells.iter().filter(|&&t| t).count()
        );
        Ok(problem)
    }

    // The surface gradient is only exact on axis-aligned faces.
    fn check_control_face_alignment(&self) -> eyre::Result<()> {
        let mut point = FacePoint::new(self.dim());
        for (cell, local_face) in self.control_faces() {
            let coordinates = self.mesh.cell_coordinates(cell);
            for q in 0..self.tables.face_rule().len() {
                point.update(&self.tables, &coordinates, local_face, q)?;
                if !point.axis_aligned {
                    warn!(
                        "Control face {local_face} of cell {cell} is not aligned with the coordinate axes; \
                         surface gradients are approximate"
                    );
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    pub fn dim(&self) -> usize {
        self.mesh.dim()
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn config(&self) -> &NavierStokesControlConfig {
        &self.config
    }

    pub fn fields(&self) -> &NavierStokesFields {
        &self.fields
    }

    pub fn dof_map(&self) -> &SystemDofMap {
        &self.dof_map
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn constraint(&self) -> &ScalarConstraint {
        &self.constraint
    }

    pub fn partition(&self) -> &ElementPartition {
        &self.partition
    }

    /// Whether the quadratic node lies on a control face.
    pub fn is_control_node(&self, node: usize) -> bool {
        self.control_nodes[node]
    }

    pub fn is_control_cell(&self, cell: usize) -> bool {
        self.control_cells[cell]
    }

    pub fn is_target_cell(&self, cell: usize) -> bool {
        self.target_cells[cell]
    }

    /// Faces with the control face id, as `(cell, local face)`.
    pub fn control_faces(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let control_id = self.config.control_face_id;
        self.mesh
            .boundary_faces()
            .filter(move |&(_, _, id)| id == control_id)
            .map(|(cell, local_face, _)| (cell, local_face))
    }

    /// Value of the designated multiplier unknown.
    pub fn multiplier(&self, solution: &Solution) -> f64 {
        let index = self.fields.resolved.solution_indices[self.fields.multiplier];
        solution.field_by_index(index)[self.designated_cell]
    }

    fn workspace(&self) -> ElementWorkspace {
        let dim = self.dim();
        ElementWorkspace {
            dofs: ElementDofs::default(),
            local: LocalSystem::new(dim, &self.fields.resolved.families),
            coordinates: Vec::new(),
            volume_point: VolumePoint::new(dim),
            face_point: FacePoint::new(dim),
        }
    }

    /// Assembles the cells of every worker range in parallel.
    pub fn assemble(&self, solution: &Solution) -> eyre::Result<AssembledSystem> {
        self.partition
            .assemble(self.dof_map.num_dofs(), |range: Range<usize>, system: &mut GlobalSystem| {
                self.assemble_cells(solution, range, system)
            })
    }

    /// Assembles the given cells, in the given order, into `system`.
    pub fn assemble_cells(
        &self,
        solution: &Solution,
        cells: impl IntoIterator<Item = usize>,
        system: &mut GlobalSystem,
    ) -> eyre::Result<()> {
        let mut workspace = self.workspace();
        let theta = self.multiplier(solution);
        for cell in cells {
            self.assemble_element_into(cell, solution, theta, &mut workspace)?;
            workspace
                .local
                .scatter(&workspace.dofs, Some(&self.constraint), system);
        }
        Ok(())
    }

    /// The complete local system of one cell, with the gathered DOFs.
    pub fn assemble_element(&self, cell: usize, solution: &Solution) -> eyre::Result<(ElementDofs, LocalSystem)> {
        let mut workspace = self.workspace();
        self.assemble_element_into(cell, solution, self.multiplier(solution), &mut workspace)?;
        Ok((workspace.dofs, workspace.local))
    }

    /// Only the control-boundary contributions of one cell: face integrals and nodal penalties.
    pub fn assemble_element_boundary(&self, cell: usize, solution: &Solution) -> eyre::Result<LocalSystem> {
        let mut workspace = self.workspace();
        self.dof_map
            .gather(&self.mesh, cell, solution, &mut workspace.dofs);
        workspace.coordinates = self.mesh.cell_coordinates(cell);
        workspace.local.reset();
        self.accumulate_boundary(cell, self.multiplier(solution), &mut workspace)?;
        Ok(workspace.local)
    }

    fn assemble_element_into(
        &self,
        cell: usize,
        solution: &Solution,
        theta: f64,
        workspace: &mut ElementWorkspace,
    ) -> eyre::Result<()> {
        self.dof_map
            .gather(&self.mesh, cell, solution, &mut workspace.dofs);
        workspace.coordinates = self.mesh.cell_coordinates(cell);
        workspace.local.reset();

        let tracking = self.target_cells[cell];
        for q in 0..self.tables.cell_rule().len() {
            workspace
                .volume_point
                .update(&self.tables, &workspace.coordinates, q)?;
            volume::accumulate_point(
                &self.coefficients,
                &self.fields,
                tracking,
                &workspace.volume_point,
                &workspace.dofs,
                &mut workspace.local,
            );
        }
        self.accumulate_outside_control_penalty(cell, workspace);
        self.accumulate_boundary(cell, theta, workspace)?;
        self.accumulate_multiplier_placeholder(workspace);
        Ok(())
    }

    /// Pins the control to zero at nodes away from the control boundary.
    ///
    /// Every cell sharing a node adds `1 / m` of the penalty, so the assembled diagonal is the
    /// configured penalty.
    fn accumulate_outside_control_penalty(&self, cell: usize, workspace: &mut ElementWorkspace) {
        let penalty = self.coefficients.outside_control_penalty;
        for (i, &node) in self.mesh.cells()[cell].nodes.iter().enumerate() {
            if self.control_nodes[node] {
                continue;
            }
            let scaled = penalty / self.node_multiplicity[node] as f64;
            for &g in &self.fields.control {
                let value = workspace.dofs.field_values(g)[i];
                workspace.local.add_residual(g, i, scaled * value);
                workspace.local.add_jacobian(g, i, g, i, scaled);
            }
        }
    }

    fn accumulate_boundary(&self, cell: usize, theta: f64, workspace: &mut ElementWorkspace) -> eyre::Result<()> {
        let control_id = self.config.control_face_id;
        let face_ids = &self.mesh.cells()[cell].face_ids;
        for (local_face, id) in face_ids.iter().enumerate() {
            if *id != Some(control_id) {
                continue;
            }
            let face_nodes = &self.face_nodes[local_face];
            let control_flags = self.control_flags(cell, face_nodes);
            for q in 0..self.tables.face_rule().len() {
                workspace
                    .face_point
                    .update(&self.tables, &workspace.coordinates, local_face, q)?;
                boundary::accumulate_point(
                    &self.coefficients,
                    &self.fields,
                    face_nodes,
                    &control_flags,
                    theta,
                    &workspace.face_point,
                    &workspace.dofs,
                    &mut workspace.local,
                );
            }
            let penalties: Vec<f64> = face_nodes
                .iter()
                .map(|&i| {
                    let node = self.mesh.cells()[cell].nodes[i];
                    if self.control_nodes[node] {
                        self.coefficients.control_penalty / self.control_face_multiplicity[node] as f64
                    } else {
                        0.0
                    }
                })
                .collect();
            boundary::accumulate_state_control_penalty(
                &self.fields,
                face_nodes,
                &penalties,
                &workspace.dofs,
                &mut workspace.local,
            );
        }
        Ok(())
    }

    fn control_flags(&self, cell: usize, local_nodes: &[usize]) -> Vec<f64> {
        let nodes = &self.mesh.cells()[cell].nodes;
        local_nodes
            .iter()
            .map(|&i| if self.control_nodes[nodes[i]] { 1.0 } else { 0.0 })
            .collect()
    }

    /// `θ_e - θ_fixed = 0` for every copy of the multiplier but the designated one.
    fn accumulate_multiplier_placeholder(&self, workspace: &mut ElementWorkspace) {
        let m = self.fields.multiplier;
        let row = workspace.dofs.field_rows(m)[0];
        if !self.constraint.is_designated(row) {
            let theta_e = workspace.dofs.field_values(m)[0];
            workspace
                .local
                .add_residual(m, 0, theta_e - self.coefficients.multiplier_fixed_value);
            workspace.local.add_jacobian(m, 0, m, 0, 1.0);
        }
    }
}

impl NonlinearProblem for NavierStokesControlProblem {
    fn dof_map(&self) -> &SystemDofMap {
        &self.dof_map
    }

    fn assemble(&self, solution: &Solution) -> eyre::Result<AssembledSystem> {
        NavierStokesControlProblem::assemble(self, solution)
    }
}

/// Boundary conditions of the control problem: every field is zero on the boundary, except
/// the state and control velocities on the control face, which are left free, and the
/// multiplier, which has no face DOFs.
pub fn control_boundary_conditions(control_face_id: FaceId) -> impl BoundaryConditions + Clone {
    move |_: &Point3<f64>, field: &str, face: FaceId, _: f64| {
        let free_on_control_face = VELOCITY_NAMES
            .iter()
            .chain(&CONTROL_NAMES)
            .any(|&name| name == field);
        if field == MULTIPLIER_NAME || (face == control_face_id && free_on_control_face) {
            DofCondition::Natural
        } else {
            DofCondition::Dirichlet(0.0)
        }
    }
}
