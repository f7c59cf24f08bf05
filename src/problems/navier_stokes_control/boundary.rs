//! Terms on the control boundary.
use super::Coefficients;
use crate::assembly::{FacePoint, LocalSystem};
use crate::dofs::ElementDofs;
use crate::element::FiniteElementFamily;
use crate::fields::NavierStokesFields;

/// Adds the contributions of one quadrature point of a control face.
///
/// `face_nodes` are the local quadratic nodes on the face and `control_flags[a]` is one if
/// `face_nodes[a]` is a control node and zero otherwise. `theta` is the value of the
/// designated multiplier.
#[allow(clippy::too_many_arguments)]
pub(super) fn accumulate_point(
    c: &Coefficients,
    fields: &NavierStokesFields,
    face_nodes: &[usize],
    control_flags: &[f64],
    theta: f64,
    point: &FacePoint,
    dofs: &ElementDofs,
    local: &mut LocalSystem,
) {
    assert_eq!(face_nodes.len(), control_flags.len());
    let dim = c.dim;
    let phi = point.basis(FiniteElementFamily::Quadratic);
    let grad_s_phi = point.surface_gradients(FiniteElementFamily::Quadratic);
    let n = &point.normal;
    let w = point.weight;
    let ire = c.inverse_reynolds;

    let mut flux = 0.0;
    for k in 0..dim {
        flux += phi.interpolate(dofs.field_values(fields.control[k])) * n[k];
    }
    local.add_constraint_residual(w * flux);

    for k in 0..dim {
        let (g_field, l_field) = (fields.control[k], fields.adjoint_velocity[k]);
        let g_k = phi.interpolate(dofs.field_values(g_field));
        let grad_s_g_k = point.interpolate_surface_gradient(FiniteElementFamily::Quadratic, dofs.field_values(g_field));
        let grad_lambda_k = phi.interpolate_gradient(dofs.field_values(l_field));
        let normal_derivative = grad_lambda_k.dot(n);

        for (&i, &c_i) in face_nodes.iter().zip(control_flags) {
            let phi_i = phi.values[i];
            local.add_constraint_row(g_field, i, w * phi_i * n[k]);

            let control = c.beta * g_k * phi_i + c.gamma * grad_s_g_k.dot(&grad_s_phi[i])
                - ire * normal_derivative * phi_i
                + theta * phi_i * n[k];
            local.add_residual(g_field, i, c_i * w * control);
            local.add_constraint_column(g_field, i, c_i * w * phi_i * n[k]);

            for &j in face_nodes {
                let dg = c.beta * phi_i * phi.values[j] + c.gamma * grad_s_phi[i].dot(&grad_s_phi[j]);
                local.add_jacobian(g_field, i, g_field, j, c_i * w * dg);
            }
            for (j, dphi_j) in phi.gradients.iter().enumerate() {
                local.add_jacobian(g_field, i, l_field, j, -c_i * w * ire * phi_i * dphi_j.dot(n));
            }
        }
    }
}

/// Ties the state velocity to the control at the nodes of one control face.
///
/// `penalties[a]` is the share of the penalty this face contributes at `face_nodes[a]`.
pub(super) fn accumulate_state_control_penalty(
    fields: &NavierStokesFields,
    face_nodes: &[usize],
    penalties: &[f64],
    dofs: &ElementDofs,
    local: &mut LocalSystem,
) {
    for (&u_field, &g_field) in fields.velocity.iter().zip(&fields.control) {
        let u = dofs.field_values(u_field);
        let g = dofs.field_values(g_field);
        for (&i, &penalty) in face_nodes.iter().zip(penalties) {
            if penalty == 0.0 {
                continue;
            }
            local.add_residual(u_field, i, penalty * (u[i] - g[i]));
            local.add_jacobian(u_field, i, u_field, i, penalty);
            local.add_jacobian(u_field, i, g_field, i, -penalty);
        }
    }
}
