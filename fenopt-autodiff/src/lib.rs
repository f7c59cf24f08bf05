//! Forward-mode automatic differentiation for element residuals.
//!
//! Element residuals are written once, generically over [`DiffScalar`]. Evaluating them with
//! `f64` gives the residual, evaluating them with [`Dual`] numbers seeded along a single input
//! gives one column of the Jacobian. [`ForwardJacobian`] performs these sweeps for all inputs.
use nalgebra::{DMatrix, DVector};

pub use fenopt_traits::DiffScalar;

mod dual;

pub use dual::Dual;

/// A vector-valued function $\vec r: \mathbb{R}^n \rightarrow \mathbb{R}^m$ that can be evaluated
/// for any [`DiffScalar`].
pub trait GenericResidual {
    fn num_inputs(&self) -> usize;

    fn num_outputs(&self) -> usize;

    /// Evaluates the residual at `x` into `residual`.
    ///
    /// The output buffer is zeroed by the caller.
    fn evaluate<T: DiffScalar>(&self, x: &[T], residual: &mut [T]) -> eyre::Result<()>;
}

impl<R: GenericResidual> GenericResidual for &R {
    fn num_inputs(&self) -> usize {
        R::num_inputs(self)
    }

    fn num_outputs(&self) -> usize {
        R::num_outputs(self)
    }

    fn evaluate<T: DiffScalar>(&self, x: &[T], residual: &mut [T]) -> eyre::Result<()> {
        R::evaluate(self, x, residual)
    }
}

/// Buffers for computing dense Jacobians of [`GenericResidual`]s by forward sweeps.
///
/// One workspace is meant to be created per assembly pass and reused for every element.
#[derive(Debug, Clone, Default)]
pub struct ForwardJacobian {
    input: Vec<Dual>,
    output: Vec<Dual>,
}

impl ForwardJacobian {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates the residual and its Jacobian at `x`.
    ///
    /// # Panics
    ///
    /// Panics if the dimensions of `x`, `residual` or `jacobian` do not match the function.
    pub fn evaluate_into<F>(
        &mut self,
        function: &F,
        x: &[f64],
        residual: &mut [f64],
        jacobian: &mut DMatrix<f64>,
    ) -> eyre::Result<()>
    where
        F: GenericResidual,
    {
        let n = function.num_inputs();
        let m = function.num_outputs();
        assert_eq!(x.len(), n, "input dimension mismatch");
        assert_eq!(residual.len(), m, "residual dimension mismatch");
        assert_eq!(jacobian.shape(), (m, n), "jacobian dimension mismatch");

        residual.fill(0.0);
        function.evaluate(x, residual)?;

        self.input.clear();
        self.input.extend(x.iter().copied().map(Dual::constant));
        self.output.resize(m, Dual::constant(0.0));

        for j in 0..n {
            self.input[j].eps = 1.0;
            self.output.fill(Dual::constant(0.0));
            let result = function.evaluate(&self.input, &mut self.output);
            self.input[j].eps = 0.0;
            result?;

            for (entry, output) in jacobian.column_mut(j).iter_mut().zip(&self.output) {
                *entry = output.eps;
            }
        }

        Ok(())
    }
}

/// Convenience function returning the residual and Jacobian of `function` at `x`.
pub fn residual_and_jacobian<F>(function: &F, x: &[f64]) -> eyre::Result<(DVector<f64>, DMatrix<f64>)>
where
    F: GenericResidual,
{
    let m = function.num_outputs();
    let mut residual = DVector::zeros(m);
    let mut jacobian = DMatrix::zeros(m, function.num_inputs());
    ForwardJacobian::new().evaluate_into(function, x, residual.as_mut_slice(), &mut jacobian)?;
    Ok((residual, jacobian))
}
