use fenopt_autodiff::{residual_and_jacobian, DiffScalar, ForwardJacobian, GenericResidual};
use fenopt_optimize::calculus::approximate_jacobian_fd;
use matrixcompare::assert_matrix_eq;
use nalgebra::{DMatrix, DVector};

/// A small nonlinear "element residual" mixing products, quotients and roots.
struct NonlinearResidual;

impl GenericResidual for NonlinearResidual {
    fn num_inputs(&self) -> usize {
        3
    }

    fn num_outputs(&self) -> usize {
        2
    }

    fn evaluate<T: DiffScalar>(&self, x: &[T], residual: &mut [T]) -> eyre::Result<()> {
        let (a, b, c) = (x[0], x[1], x[2]);
        residual[0] += a * b - c / a;
        residual[1] += (a * a + b * b).sqrt() * c + c.ln() * 2.0;
        Ok(())
    }
}

#[test]
fn forward_jacobian_matches_finite_differences() {
    let x = [1.5, -0.5, 2.0];
    let (residual, jacobian) = residual_and_jacobian(&NonlinearResidual, &x).unwrap();

    let mut out = [0.0; 2];
    NonlinearResidual.evaluate(&x, &mut out).unwrap();
    assert_eq!(residual.as_slice(), &out);

    let jacobian_fd = approximate_jacobian_fd(
        2,
        |x, mut f| {
            let mut r = [0.0; 2];
            NonlinearResidual.evaluate(x.as_slice(), &mut r).unwrap();
            f.copy_from_slice(&r);
        },
        &mut DVector::from_column_slice(&x),
        1e-6,
    );

    assert_matrix_eq!(jacobian, jacobian_fd, comp = abs, tol = 1e-7);
}

#[test]
fn forward_jacobian_workspace_is_reusable() {
    let mut workspace = ForwardJacobian::new();
    let mut residual = [0.0; 2];
    let mut jacobian = DMatrix::zeros(2, 3);

    workspace
        .evaluate_into(&NonlinearResidual, &[1.0, 1.0, 1.0], &mut residual, &mut jacobian)
        .unwrap();
    let first = jacobian.clone();
    workspace
        .evaluate_into(&NonlinearResidual, &[2.0, 0.5, 3.0], &mut residual, &mut jacobian)
        .unwrap();
    workspace
        .evaluate_into(&NonlinearResidual, &[1.0, 1.0, 1.0], &mut residual, &mut jacobian)
        .unwrap();

    assert_eq!(first, jacobian);
    // d r0 / d a = b + c / a^2 = 2 at (1, 1, 1)
    assert_eq!(jacobian[(0, 0)], 2.0);
}

struct FailingResidual;

impl GenericResidual for FailingResidual {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn evaluate<T: DiffScalar>(&self, x: &[T], _residual: &mut [T]) -> eyre::Result<()> {
        if x[0].value() <= 0.0 {
            eyre::bail!("non-positive input");
        }
        Ok(())
    }
}

#[test]
fn forward_jacobian_propagates_residual_errors() {
    assert!(residual_and_jacobian(&FailingResidual, &[-1.0]).is_err());
    assert!(residual_and_jacobian(&FailingResidual, &[1.0]).is_ok());
}
