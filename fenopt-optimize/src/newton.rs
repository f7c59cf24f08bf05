use crate::calculus::{DifferentiableVectorFunction, SolveError, VectorFunction};
use fenopt_traits::Real;
use itertools::iterate;
use log::debug;
use nalgebra::{DVectorView, DVectorViewMut, Scalar};
use numeric_literals::replace_float_literals;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::fmt::Display;

/// Determines when Newton iterations are considered converged.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceCriterion {
    /// `|F(x)|_2 <= tolerance`.
    ResidualNorm,
    /// `|dx|_2 <= tolerance` for the last increment `dx`.
    IncrementNorm,
    /// `|dx|_2 <= tolerance * |x|_2` for the last increment `dx`.
    RelativeIncrementNorm,
}

impl Default for ConvergenceCriterion {
    fn default() -> Self {
        Self::IncrementNorm
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NewtonSettings<T> {
    pub max_iterations: Option<usize>,
    pub tolerance: T,
    pub criterion: ConvergenceCriterion,
}

/// Norms recorded during a Newton solve.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonStatistics<T: Scalar> {
    pub iterations: usize,
    /// Whether the convergence criterion was met.
    pub converged: bool,
    /// Residual norm before each iteration, and after the final one.
    pub residual_norms: Vec<T>,
    /// Norm of the (line-search scaled) increment of each iteration.
    pub increment_norms: Vec<T>,
}

impl<T: Scalar> Default for NewtonStatistics<T> {
    fn default() -> Self {
        Self {
            iterations: 0,
            converged: false,
            residual_norms: Vec::new(),
            increment_norms: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub enum NewtonError {
    /// The procedure failed because the maximum number of iterations was reached.
    MaximumIterationsReached(usize),
    /// Evaluating the function failed.
    FunctionError(SolveError),
    /// The procedure failed because solving the Jacobian system failed.
    JacobianError(SolveError),
    /// The line search failed to produce a valid step direction.
    LineSearchError(SolveError),
}

impl Display for NewtonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            NewtonError::MaximumIterationsReached(maxit) => {
                write!(f, "Failed to converge within maximum number of iterations ({}).", maxit)
            }
            NewtonError::FunctionError(err) => {
                write!(f, "Failed to evaluate function. Error: {}", err)
            }
            NewtonError::JacobianError(err) => {
                write!(f, "Failed to solve Jacobian system. Error: {}", err)
            }
            NewtonError::LineSearchError(err) => {
                write!(f, "Line search failed to produce valid step direction. Error: {}", err)
            }
        }
    }
}

impl Error for NewtonError {}

/// Attempts to solve the non-linear equation F(u) = 0.
///
/// `x` holds the initial guess on entry and the solution on exit. `f` and `dx` are
/// workspace vectors of the same dimension. Convergence is decided by
/// [`NewtonSettings::criterion`].
pub fn newton<'a, T, F>(
    function: F,
    x: impl Into<DVectorViewMut<'a, T>>,
    f: impl Into<DVectorViewMut<'a, T>>,
    dx: impl Into<DVectorViewMut<'a, T>>,
    settings: NewtonSettings<T>,
) -> Result<NewtonStatistics<T>, NewtonError>
where
    T: Real,
    F: DifferentiableVectorFunction<T>,
{
    newton_line_search(function, x, f, dx, settings, &mut NoLineSearch {})
}

/// Same as `newton`, but allows specifying a line search.
pub fn newton_line_search<'a, T, F>(
    function: F,
    x: impl Into<DVectorViewMut<'a, T>>,
    f: impl Into<DVectorViewMut<'a, T>>,
    dx: impl Into<DVectorViewMut<'a, T>>,
    settings: NewtonSettings<T>,
    line_search: &mut impl LineSearch<T, F>,
) -> Result<NewtonStatistics<T>, NewtonError>
where
    T: Real,
    F: DifferentiableVectorFunction<T>,
{
    let mut stats = NewtonStatistics::default();
    newton_line_search_into(function, x, f, dx, settings, line_search, &mut stats)?;
    Ok(stats)
}

/// Same as `newton_line_search`, but records into `stats`, which stay available when the
/// iterations fail.
///
/// On error, `x` holds the last accepted iterate and `f` the residual there.
#[replace_float_literals(T::from_f64(literal).unwrap())]
pub fn newton_line_search_into<'a, T, F>(
    mut function: F,
    x: impl Into<DVectorViewMut<'a, T>>,
    f: impl Into<DVectorViewMut<'a, T>>,
    dx: impl Into<DVectorViewMut<'a, T>>,
    settings: NewtonSettings<T>,
    line_search: &mut impl LineSearch<T, F>,
    stats: &mut NewtonStatistics<T>,
) -> Result<(), NewtonError>
where
    T: Real,
    F: DifferentiableVectorFunction<T>,
{
    let mut x = x.into();
    let mut f = f.into();
    let mut minus_dx = dx.into();

    assert_eq!(x.nrows(), f.nrows());
    assert_eq!(minus_dx.nrows(), f.nrows());

    function
        .eval_into(&mut f, &DVectorView::from(&x))
        .map_err(NewtonError::FunctionError)?;

    *stats = NewtonStatistics {
        iterations: 0,
        converged: false,
        residual_norms: vec![f.norm()],
        increment_norms: Vec::new(),
    };

    loop {
        let converged = match settings.criterion {
            ConvergenceCriterion::ResidualNorm => f.norm() <= settings.tolerance,
            ConvergenceCriterion::IncrementNorm => stats
                .increment_norms
                .last()
                .map(|&dx_norm| dx_norm <= settings.tolerance)
                .unwrap_or(false),
            ConvergenceCriterion::RelativeIncrementNorm => stats
                .increment_norms
                .last()
                .map(|&dx_norm| dx_norm <= settings.tolerance * x.norm())
                .unwrap_or(false),
        };

        if converged {
            stats.converged = true;
            return Ok(());
        }

        if settings
            .max_iterations
            .map(|max_iter| stats.iterations == max_iter)
            .unwrap_or(false)
        {
            return Err(NewtonError::MaximumIterationsReached(stats.iterations));
        }

        // Solve the system J dx = -f   <=>   J (-dx) = f
        function
            .solve_jacobian_system(&mut minus_dx, &DVectorView::from(&x), &DVectorView::from(&f))
            .map_err(NewtonError::JacobianError)?;

        // Flip sign to make it consistent with line search
        minus_dx *= -1.0;
        let dx = &minus_dx;

        let step_length = line_search
            .step(
                &mut function,
                DVectorViewMut::from(&mut f),
                DVectorViewMut::from(&mut x),
                DVectorView::from(dx),
            )
            .map_err(NewtonError::LineSearchError)?;

        let increment_norm = step_length * dx.norm();
        stats.iterations += 1;
        stats.residual_norms.push(f.norm());
        stats.increment_norms.push(increment_norm);
        debug!(
            "Newton iteration {}: step length {}, |dx| = {}, |F| = {}",
            stats.iterations,
            step_length,
            increment_norm,
            f.norm()
        );
    }
}

pub trait LineSearch<T: Scalar, F: VectorFunction<T>> {
    fn step(
        &mut self,
        function: &mut F,
        f: DVectorViewMut<T>,
        x: DVectorViewMut<T>,
        direction: DVectorView<T>,
    ) -> Result<T, SolveError>;
}

/// Trivial implementation of line search. Equivalent to a single, full Newton step.
#[derive(Clone, Debug)]
pub struct NoLineSearch;

impl<T, F> LineSearch<T, F> for NoLineSearch
where
    T: Real,
    F: VectorFunction<T>,
{
    fn step(
        &mut self,
        function: &mut F,
        mut f: DVectorViewMut<T>,
        mut x: DVectorViewMut<T>,
        direction: DVectorView<T>,
    ) -> Result<T, SolveError> {
        x.axpy(T::one(), &direction, T::one());
        function.eval_into(&mut f, &DVectorView::from(&x))?;
        Ok(T::one())
    }
}

/// Backtracking line search on $g(x) = \frac{1}{2} |F(x)|^2$ using the Armijo condition.
///
/// See Jorge & Nocedal (2006), Numerical Optimization, Chapter 3.1.
#[derive(Clone, Debug)]
pub struct BacktrackingLineSearch {
    /// Sufficient decrease parameter in (0, 1).
    pub c: f64,
    /// Smallest step length tried before giving up.
    pub alpha_min: f64,
}

impl Default for BacktrackingLineSearch {
    fn default() -> Self {
        Self {
            c: 1e-4,
            alpha_min: 1e-6,
        }
    }
}

impl<T, F> LineSearch<T, F> for BacktrackingLineSearch
where
    T: Real,
    F: VectorFunction<T>,
{
    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn step(
        &mut self,
        function: &mut F,
        mut f: DVectorViewMut<T>,
        mut x: DVectorViewMut<T>,
        direction: DVectorView<T>,
    ) -> Result<T, SolveError> {
        // With p the Newton direction, grad F^T p ~= -F(x), so the sufficient decrease condition
        //  g(x + alpha p) <= g(x) + c alpha (grad g)^T p
        // becomes
        //  g(x + alpha p) <= (1 - c alpha) g(x).
        let c = T::from_f64(self.c).unwrap();
        let alpha_min = T::from_f64(self.alpha_min).unwrap();

        let p = direction;
        let g_initial = 0.5 * f.magnitude_squared();

        // Decrease slowly at first, then by a factor of four per attempt
        let mut alpha_iter = [1.0, 0.75, 0.5]
            .into_iter()
            .chain(iterate(0.25, |alpha_i| 0.25 * *alpha_i));

        let mut alpha_prev = T::zero();
        loop {
            // Infinite iterator
            let alpha = alpha_iter.next().unwrap_or(T::zero());
            if alpha < alpha_min {
                // Undo the partial step
                x.axpy(-alpha_prev, &p, T::one());
                function.eval_into(&mut f, &DVectorView::from(&x))?;
                return Err(Box::from(format!(
                    "Failed to produce valid step direction. \
                    Alpha {} is smaller than minimum allowed alpha {}.",
                    alpha, alpha_min
                )));
            }

            // x^{k + 1} = x^k + (alpha^k - alpha^{k - 1}) p
            x.axpy(alpha - alpha_prev, &p, T::one());
            function.eval_into(&mut f, &DVectorView::from(&x))?;
            alpha_prev = alpha;

            let g = 0.5 * f.magnitude_squared();
            if g <= (1.0 - c * alpha) * g_initial {
                return Ok(alpha);
            }
        }
    }
}
