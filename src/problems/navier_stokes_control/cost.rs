//! Evaluation of the tracking functional.
use super::NavierStokesControlProblem;
use crate::assembly::{FacePoint, VolumePoint};
use crate::dofs::ElementDofs;
use crate::element::FiniteElementFamily;
use crate::solution::Solution;
use log::info;

/// The terms of the cost functional.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CostFunctional {
    /// `∫_target |u - ud|²`.
    pub tracking: f64,
    /// `∫_Γc |g|²`.
    pub control_l2: f64,
    /// `∫_Γc |∇s g|²`.
    pub control_h1: f64,
    /// `∫_Γc g·n`, zero when the constraint holds.
    pub control_flux: f64,
    /// `α/2 tracking + β/2 control_l2 + γ/2 control_h1`.
    pub total: f64,
}

/// Integrates the cost functional of the stored solution, cell by cell in mesh order.
pub fn compute_cost_functional(problem: &NavierStokesControlProblem, solution: &Solution) -> eyre::Result<CostFunctional> {
    let dim = problem.dim();
    let mesh = problem.mesh();
    let tables = problem.tables();
    let fields = problem.fields();
    let config = problem.config();
    let desired = config.desired_velocity();

    let mut dofs = ElementDofs::default();
    let mut volume_point = VolumePoint::new(dim);
    let mut face_point = FacePoint::new(dim);
    let (mut tracking, mut control_l2, mut control_h1, mut control_flux) = (0.0, 0.0, 0.0, 0.0);

    for cell in 0..mesh.num_cells() {
        let is_target = problem.is_target_cell(cell);
        let is_control = problem.is_control_cell(cell);
        if !is_target && !is_control {
            continue;
        }
        problem
            .dof_map
            .gather(mesh, cell, solution, &mut dofs);
        let coordinates = mesh.cell_coordinates(cell);

        if is_target {
            for q in 0..tables.cell_rule().len() {
                volume_point.update(tables, &coordinates, q)?;
                let phi = volume_point.basis(FiniteElementFamily::Quadratic);
                let squared_error: f64 = (0..dim)
                    .map(|k| {
                        let u_k = phi.interpolate(dofs.field_values(fields.velocity[k]));
                        (u_k - desired[k]).powi(2)
                    })
                    .sum();
                tracking += squared_error * volume_point.weight;
            }
        }

        for (local_face, id) in mesh.cells()[cell].face_ids.iter().enumerate() {
            if *id != Some(config.control_face_id) {
                continue;
            }
            for q in 0..tables.face_rule().len() {
                face_point.update(tables, &coordinates, local_face, q)?;
                let phi = face_point.basis(FiniteElementFamily::Quadratic);
                let w = face_point.weight;
                for k in 0..dim {
                    let g_dofs = dofs.field_values(fields.control[k]);
                    let g_k = phi.interpolate(g_dofs);
                    let grad_s_g_k = face_point.interpolate_surface_gradient(FiniteElementFamily::Quadratic, g_dofs);
                    control_l2 += g_k * g_k * w;
                    control_h1 += grad_s_g_k.norm_squared() * w;
                    control_flux += g_k * face_point.normal[k] * w;
                }
            }
        }
    }

    let total = 0.5 * (config.alpha * tracking + config.beta * control_l2 + config.gamma * control_h1);
    let cost = CostFunctional {
        tracking,
        control_l2,
        control_h1,
        control_flux,
        total,
    };
    info!(
        "Cost functional: tracking {:.10e} (alpha {:e}), control L2 {:.10e} (beta {:e}), \
         control H1 {:.10e} (gamma {:e}), flux {:.10e}, total {:.10e}",
        tracking, config.alpha, control_l2, config.beta, control_h1, config.gamma, control_flux, total
    );
    Ok(cost)
}
