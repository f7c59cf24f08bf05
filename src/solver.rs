//! Newton iterations over assembled finite element problems.
use crate::assembly::AssembledSystem;
use crate::boundary::DirichletDofs;
use crate::config::NewtonConfig;
use crate::dofs::SystemDofMap;
use crate::optimize::calculus::{DifferentiableVectorFunction, SolveError, VectorFunction};
use crate::optimize::newton::{newton_line_search_into, NewtonError, NewtonStatistics, NoLineSearch};
use crate::solution::Solution;
use eyre::eyre;
use log::{info, warn};
use nalgebra::{DMatrix, DVector, DVectorView, DVectorViewMut};
use std::time::Instant;

/// A problem that assembles residual and Jacobian from a stored solution.
pub trait NonlinearProblem {
    fn dof_map(&self) -> &SystemDofMap;

    fn assemble(&self, solution: &Solution) -> eyre::Result<AssembledSystem>;
}

impl<P: NonlinearProblem> NonlinearProblem for &P {
    fn dof_map(&self) -> &SystemDofMap {
        P::dof_map(self)
    }

    fn assemble(&self, solution: &Solution) -> eyre::Result<AssembledSystem> {
        P::assemble(self, solution)
    }
}

/// Adapts a [`NonlinearProblem`] with Dirichlet conditions to the Newton interface.
///
/// Every evaluation writes the iterate back into a working copy of the solution, assembles and
/// replaces the Dirichlet equations. The Jacobian of the last evaluation is kept for the
/// following linear solve.
pub struct AssembledFunction<'a, P> {
    problem: P,
    dirichlet: &'a DirichletDofs,
    solution: Solution,
    last: Option<(DVector<f64>, AssembledSystem)>,
}

impl<'a, P: NonlinearProblem> AssembledFunction<'a, P> {
    pub fn new(problem: P, dirichlet: &'a DirichletDofs, solution: Solution) -> Self {
        Self {
            problem,
            dirichlet,
            solution,
            last: None,
        }
    }

    pub fn into_solution(self) -> Solution {
        self.solution
    }

    fn assemble_at(&mut self, x: &DVectorView<f64>) -> eyre::Result<&AssembledSystem> {
        let is_current = matches!(&self.last, Some((x_last, _)) if x_last == x);
        if !is_current {
            let x = x.clone_owned();
            self.problem
                .dof_map()
                .update_solution(&x, &mut self.solution);
            let mut system = self.problem.assemble(&self.solution)?;
            self.dirichlet.apply(&mut system, &x);
            self.last = Some((x, system));
        }
        self.last
            .as_ref()
            .map(|(_, system)| system)
            .ok_or_else(|| eyre!("No assembled system available"))
    }
}

impl<'a, P: NonlinearProblem> VectorFunction<f64> for AssembledFunction<'a, P> {
    fn dimension(&self) -> usize {
        self.problem.dof_map().num_dofs()
    }

    fn eval_into(&mut self, f: &mut DVectorViewMut<f64>, x: &DVectorView<f64>) -> Result<(), SolveError> {
        let system = self.assemble_at(x).map_err(SolveError::from)?;
        f.copy_from(&system.residual);
        Ok(())
    }
}

impl<'a, P: NonlinearProblem> DifferentiableVectorFunction<f64> for AssembledFunction<'a, P> {
    fn solve_jacobian_system(
        &mut self,
        sol: &mut DVectorViewMut<f64>,
        x: &DVectorView<f64>,
        rhs: &DVectorView<f64>,
    ) -> Result<(), SolveError> {
        let system = self.assemble_at(x).map_err(SolveError::from)?;
        let solution = DMatrix::from(&system.jacobian)
            .lu()
            .solve(rhs)
            .ok_or_else(|| SolveError::from("Jacobian is singular"))?;
        sol.copy_from(&solution);
        Ok(())
    }
}

/// Solves `F(x) = 0` with Newton's method, starting from and updating `solution`.
///
/// Dirichlet values are imposed on the initial guess, so every iterate satisfies them. When
/// [`NewtonConfig::accept_unconverged`] is set, running out of iterations is not an error: the
/// last iterate is stored in `solution` and the returned statistics have `converged == false`.
pub fn solve_nonlinear<P: NonlinearProblem>(
    problem: P,
    solution: &mut Solution,
    dirichlet: &DirichletDofs,
    config: &NewtonConfig,
) -> eyre::Result<NewtonStatistics<f64>> {
    let start = Instant::now();
    let mut x = problem.dof_map().system_vector(solution);
    dirichlet.enforce(&mut x);
    let n = x.len();
    let mut f = DVector::zeros(n);
    let mut dx = DVector::zeros(n);

    let mut stats = NewtonStatistics::default();
    let function = AssembledFunction::new(&problem, dirichlet, solution.clone());
    let result = newton_line_search_into(
        function,
        &mut x,
        &mut f,
        &mut dx,
        config.settings(),
        &mut NoLineSearch {},
        &mut stats,
    );
    match result {
        Ok(()) => {}
        Err(NewtonError::MaximumIterationsReached(iterations)) if config.accept_unconverged => {
            warn!(
                "Newton did not converge within {} iterations, keeping the last iterate (|F| = {:e})",
                iterations,
                f.norm()
            );
        }
        Err(err) => return Err(eyre!(err)),
    }
    problem.dof_map().update_solution(&x, solution);

    info!(
        "Newton {} after {} iterations ({} unknowns, {} Dirichlet), final |F| = {:e}, {:.3} s",
        if stats.converged { "converged" } else { "stopped" },
        stats.iterations,
        n,
        dirichlet.len(),
        stats.residual_norms.last().copied().unwrap_or(0.0),
        start.elapsed().as_secs_f64()
    );
    Ok(stats)
}
