//! Volume terms of the state and adjoint equations.
use super::Coefficients;
use crate::assembly::{LocalSystem, VolumePoint};
use crate::dofs::ElementDofs;
use crate::element::FiniteElementFamily;
use crate::fields::NavierStokesFields;
use nalgebra::Vector3;

/// Interpolated state and adjoint quantities at a quadrature point.
struct PointState {
    u: Vector3<f64>,
    grad_u: [Vector3<f64>; 3],
    div_u: f64,
    p: f64,
    lambda: Vector3<f64>,
    grad_lambda: [Vector3<f64>; 3],
    div_lambda: f64,
    q: f64,
}

impl PointState {
    fn interpolate(dim: usize, fields: &NavierStokesFields, point: &VolumePoint, dofs: &ElementDofs) -> Self {
        let phi = point.basis(FiniteElementFamily::Quadratic);
        let psi = point.basis(FiniteElementFamily::Linear);
        let mut state = Self {
            u: Vector3::zeros(),
            grad_u: [Vector3::zeros(); 3],
            div_u: 0.0,
            p: psi.interpolate(dofs.field_values(fields.pressure)),
            lambda: Vector3::zeros(),
            grad_lambda: [Vector3::zeros(); 3],
            div_lambda: 0.0,
            q: psi.interpolate(dofs.field_values(fields.adjoint_pressure)),
        };
        for k in 0..dim {
            let u_k = dofs.field_values(fields.velocity[k]);
            let lambda_k = dofs.field_values(fields.adjoint_velocity[k]);
            state.u[k] = phi.interpolate(u_k);
            state.grad_u[k] = phi.interpolate_gradient(u_k);
            state.lambda[k] = phi.interpolate(lambda_k);
            state.grad_lambda[k] = phi.interpolate_gradient(lambda_k);
            state.div_u += state.grad_u[k][k];
            state.div_lambda += state.grad_lambda[k][k];
        }
        state
    }
}

/// Adds the contributions of one volume quadrature point.
///
/// Advective couplings between different velocity components are only assembled for the
/// component pair `(k, (k + 1) % dim)`. This is the complete coupling in 2D.
pub(super) fn accumulate_point(
    c: &Coefficients,
    fields: &NavierStokesFields,
    tracking: bool,
    point: &VolumePoint,
    dofs: &ElementDofs,
    local: &mut LocalSystem,
) {
    let dim = c.dim;
    let s = PointState::interpolate(dim, fields, point, dofs);
    let phi = point.basis(FiniteElementFamily::Quadratic);
    let psi = point.basis(FiniteElementFamily::Linear);
    let w = point.weight;
    let ire = c.inverse_reynolds;
    let a = c.advection;
    let t = if tracking { c.alpha } else { 0.0 };
    let (p_field, q_field) = (fields.pressure, fields.adjoint_pressure);

    for k in 0..dim {
        let off = (k + 1) % dim;
        let (u_field, l_field) = (fields.velocity[k], fields.adjoint_velocity[k]);
        let (u_off, l_off) = (fields.velocity[off], fields.adjoint_velocity[off]);
        let adjoint_coupling: f64 = (0..dim).map(|j| s.grad_u[j][k] * s.lambda[j]).sum();

        for (i, (&phi_i, dphi_i)) in phi.values.iter().zip(&phi.gradients).enumerate() {
            let u_dot_dphi_i = s.u.dot(dphi_i);

            let momentum = ire * s.grad_u[k].dot(dphi_i) + a * s.u.dot(&s.grad_u[k]) * phi_i
                - s.p * dphi_i[k]
                - c.force[k] * phi_i;
            local.add_residual(u_field, i, w * momentum);

            let adjoint = t * (c.desired_velocity[k] - s.u[k]) * phi_i
                + ire * s.grad_lambda[k].dot(dphi_i)
                + a * phi_i * adjoint_coupling
                + a * u_dot_dphi_i * s.lambda[k]
                - s.q * dphi_i[k];
            local.add_residual(l_field, i, w * adjoint);

            for (j, (&phi_j, dphi_j)) in phi.values.iter().zip(&phi.gradients).enumerate() {
                let diffusion = ire * dphi_i.dot(dphi_j);

                let du_k = diffusion + a * s.u.dot(dphi_j) * phi_i + a * phi_j * s.grad_u[k][k] * phi_i;
                local.add_jacobian(u_field, i, u_field, j, w * du_k);

                let dl_du_k = -t * phi_j * phi_i + a * (phi_i * dphi_j[k] + phi_j * dphi_i[k]) * s.lambda[k];
                local.add_jacobian(l_field, i, u_field, j, w * dl_du_k);

                let dl_dl_k = diffusion + a * phi_i * s.grad_u[k][k] * phi_j + a * u_dot_dphi_i * phi_j;
                local.add_jacobian(l_field, i, l_field, j, w * dl_dl_k);

                if off != k {
                    local.add_jacobian(u_field, i, u_off, j, w * a * phi_j * s.grad_u[k][off] * phi_i);

                    let dl_du_off = a * (phi_i * dphi_j[k] * s.lambda[off] + phi_j * dphi_i[off] * s.lambda[k]);
                    local.add_jacobian(l_field, i, u_off, j, w * dl_du_off);

                    local.add_jacobian(l_field, i, l_off, j, w * a * phi_i * s.grad_u[off][k] * phi_j);
                }
            }

            for (j, &psi_j) in psi.values.iter().enumerate() {
                local.add_jacobian(u_field, i, p_field, j, -w * psi_j * dphi_i[k]);
                local.add_jacobian(l_field, i, q_field, j, -w * psi_j * dphi_i[k]);
            }
        }

        for (i, &psi_i) in psi.values.iter().enumerate() {
            for (j, dphi_j) in phi.gradients.iter().enumerate() {
                local.add_jacobian(p_field, i, u_field, j, -w * psi_i * dphi_j[k]);
                local.add_jacobian(q_field, i, l_field, j, -w * psi_i * dphi_j[k]);
            }
        }
    }

    for (i, &psi_i) in psi.values.iter().enumerate() {
        local.add_residual(p_field, i, -w * s.div_u * psi_i);
        local.add_residual(q_field, i, -w * s.div_lambda * psi_i);
    }
}
