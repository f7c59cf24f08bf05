//! Solves the Navier-Stokes boundary control optimality system on a box mesh and reports the
//! cost functional.
//!
//! ```text
//! cargo run --release --example ns_boundary_control -- --cells 8 --workers 4
//! ```
//!
//! Every Newton step solves the linearized system with a dense LU factorization of the
//! assembled Jacobian, so memory grows with the square of the number of unknowns. A 2D mesh
//! with 16 cells per axis has about 7.1k unknowns and needs roughly 400 MB for the matrix
//! alone. Keep `--cells` small, in 3D in particular.
//!
//! Newton runs for at most `newton.max_iterations` steps. By default the last iterate is kept
//! when the tolerance is not reached (`newton.accept_unconverged`). In 3D the advective Jacobian
//! is inexact, so Newton converges linearly there.
use clap::Parser;
use fenopt::boundary::DirichletDofs;
use fenopt::config::{load_config, Config};
use fenopt::fields::FieldRegistry;
use fenopt::mesh::procedural::create_box_mesh;
use fenopt::problems::navier_stokes_control::{
    compute_cost_functional, control_boundary_conditions, NavierStokesControlProblem,
};
use fenopt::solution::Solution;
use fenopt::solver::solve_nonlinear;
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Optimal boundary control of the stationary Navier-Stokes equations")]
struct Args {
    /// JSON configuration file. Missing entries take their default values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Spatial dimension of the box mesh (2 or 3).
    #[arg(long)]
    dim: Option<usize>,

    /// Number of cells along each axis.
    #[arg(long)]
    cells: Option<usize>,

    /// Number of parallel assembly workers.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Maximum number of Newton iterations.
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Fail if Newton does not converge within the maximum number of iterations.
    #[arg(long)]
    require_convergence: bool,

    /// Disable the advection terms (Stokes flow).
    #[arg(long)]
    stokes: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    print_config: bool,
}

fn main() -> eyre::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(dim) = args.dim {
        config.mesh.dim = dim;
    }
    if let Some(cells) = args.cells {
        config.mesh.cells_per_dim = cells;
    }
    if let Some(workers) = args.workers {
        config.assembly.num_workers = workers;
    }
    if let Some(max_iterations) = args.max_iterations {
        config.newton.max_iterations = max_iterations;
    }
    if args.require_convergence {
        config.newton.accept_unconverged = false;
    }
    if args.stokes {
        config.navier_stokes.advection = false;
    }
    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let mesh = create_box_mesh(
        config.mesh.dim,
        config.mesh.cells_per_dim,
        &config.mesh.min_point(),
        &config.mesh.max_point(),
    )?;
    let registry = FieldRegistry::navier_stokes_control(config.mesh.dim);
    let problem = NavierStokesControlProblem::new(
        mesh,
        &registry,
        &config.navier_stokes,
        &config.quadrature,
        &config.assembly,
    )?;

    let bc = control_boundary_conditions(config.navier_stokes.control_face_id);
    let dirichlet = DirichletDofs::from_conditions(problem.mesh(), problem.dof_map(), &bc, 0.0);
    info!("{} Dirichlet DOFs", dirichlet.len());

    let mut solution = Solution::zeros(problem.mesh(), &registry);
    let stats = solve_nonlinear(&problem, &mut solution, &dirichlet, &config.newton)?;
    let cost = compute_cost_functional(&problem, &solution)?;

    println!("Newton iterations:   {} (converged: {})", stats.iterations, stats.converged);
    println!("Multiplier theta:    {:.10e}", problem.multiplier(&solution));
    println!("Tracking term:       {:.10e}", cost.tracking);
    println!("Control L2 term:     {:.10e}", cost.control_l2);
    println!("Control H1 term:     {:.10e}", cost.control_h1);
    println!("Control flux:        {:.10e}", cost.control_flux);
    println!("Cost functional:     {:.10e}", cost.total);
    Ok(())
}
