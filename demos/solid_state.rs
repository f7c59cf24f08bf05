//! Solves the mixed displacement/pressure problem for a block clamped on two sides and loaded
//! by gravity.
//!
//! ```text
//! cargo run --release --example solid_state -- --model neo_hookean --cells 4
//! ```
//!
//! Newton steps use a dense LU factorization of the Jacobian, so memory grows with the square
//! of the number of unknowns.
use clap::{Parser, ValueEnum};
use fenopt::boundary::DirichletDofs;
use fenopt::config::{load_config, Config, StressModel};
use fenopt::fields::FieldRegistry;
use fenopt::mesh::procedural::create_box_mesh;
use fenopt::solution::Solution;
use fenopt::solver::solve_nonlinear;
use fenopt_solid::{clamped_boundary_conditions, SolidProblem};
use log::info;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Model {
    LinearElastic,
    NeoHookean,
    MooneyRivlin,
}

impl From<Model> for StressModel {
    fn from(model: Model) -> Self {
        match model {
            Model::LinearElastic => StressModel::LinearElastic,
            Model::NeoHookean => StressModel::NeoHookean,
            Model::MooneyRivlin => StressModel::MooneyRivlin,
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Mixed displacement/pressure solid under gravity")]
struct Args {
    /// JSON configuration file. Missing entries take their default values.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long)]
    dim: Option<usize>,

    #[arg(long)]
    cells: Option<usize>,

    #[arg(short, long)]
    workers: Option<usize>,

    #[arg(long, value_enum)]
    model: Option<Model>,

    /// Use the penalty formulation of the mass balance.
    #[arg(long)]
    penalty: bool,
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
    if let Some(model) = args.model {
        config.solid.model = model.into();
    }
    config.solid.use_penalty |= args.penalty;

    let mesh = create_box_mesh(
        config.mesh.dim,
        config.mesh.cells_per_dim,
        &config.mesh.min_point(),
        &config.mesh.max_point(),
    )?;
    let registry = FieldRegistry::solid(config.mesh.dim);
    let problem = SolidProblem::new(mesh, &registry, &config.solid, &config.quadrature, &config.assembly)?;
    let dirichlet = DirichletDofs::from_conditions(problem.mesh(), problem.dof_map(), &clamped_boundary_conditions(), 0.0);
    info!("{} Dirichlet DOFs", dirichlet.len());

    let mut solution = Solution::zeros(problem.mesh(), &registry);
    let stats = solve_nonlinear(&problem, &mut solution, &dirichlet, &config.newton)?;

    println!("Newton iterations: {} (converged: {})", stats.iterations, stats.converged);
    for name in registry.fields().iter().map(|field| field.name.as_str()) {
        let values = solution.field(name)?;
        println!("max |{name}| = {:.6e}", values.amax());
    }
    Ok(())
}
