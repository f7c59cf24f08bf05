use crate::gravity_source::GravitySource;
use crate::materials::{CauchyStressModel, LameParameters, MassBalance, YoungPoisson};
use eyre::bail;
use fenopt::assembly::{AssembledSystem, ElementPartition, GlobalSystem};
use fenopt::autodiff::{ForwardJacobian, GenericResidual};
use fenopt::boundary::{BoundaryConditions, DofCondition};
use fenopt::config::{AssemblyConfig, QuadratureConfig, SolidConfig, StressModel};
use fenopt::dofs::{ElementDofs, SystemDofMap};
use fenopt::element::mapping::determinant;
use fenopt::element::{FiniteElementFamily, GeometricMapping, ReferenceTables};
use fenopt::fields::{FieldRegistry, SolidFields, DISPLACEMENT_NAMES};
use fenopt::mesh::Mesh;
use fenopt::nalgebra::{DMatrix, DVector, Matrix3, Point3, Vector3};
use fenopt::solution::Solution;
use fenopt::solver::NonlinearProblem;
use fenopt::{DiffScalar, FaceId};
use log::info;
use std::ops::Range;

/// The mixed displacement/pressure problem on a fixed reference mesh.
#[derive(Debug, Clone)]
pub struct SolidProblem {
    mesh: Mesh,
    model: StressModel,
    parameters: LameParameters<f64>,
    mass_balance: MassBalance,
    gravity: GravitySource,
    tables: ReferenceTables,
    fields: SolidFields,
    dof_map: SystemDofMap,
    partition: ElementPartition,
}

impl SolidProblem {
    pub fn new(
        mesh: Mesh,
        registry: &FieldRegistry,
        config: &SolidConfig,
        quadrature: &QuadratureConfig,
        assembly: &AssemblyConfig,
    ) -> eyre::Result<Self> {
        let dim = mesh.dim();
        if !(2..=3).contains(&dim) {
            bail!("Solid problem needs a 2D or 3D mesh, got dimension {dim}");
        }
        if assembly.num_workers == 0 {
            bail!("Assembly needs at least one worker");
        }
        if config.density <= 0.0 {
            bail!("Density must be positive, got {}", config.density);
        }

        let fields = SolidFields::resolve(registry, dim)?;
        let parameters = LameParameters::from(YoungPoisson {
            young: config.young,
            poisson: config.poisson,
        })
        .per_unit_density(config.density);
        let mass_balance = MassBalance::from_config(config, &parameters);

        info!(
            "Solid problem: {:?}, mu = {:e}, lambda = {:e} per unit density, incompressible: {}, penalty: {}",
            config.model, parameters.mu, parameters.lambda, mass_balance.incompressible, config.use_penalty
        );

        Ok(Self {
            tables: ReferenceTables::new(dim, quadrature.points_per_dim)?,
            dof_map: SystemDofMap::new(&mesh, fields.resolved.clone()),
            partition: ElementPartition::uniform(mesh.num_cells(), assembly.num_workers),
            gravity: GravitySource::from_acceleration(config.gravity()),
            model: config.model,
            parameters,
            mass_balance,
            fields,
            mesh,
        })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn dof_map(&self) -> &SystemDofMap {
        &self.dof_map
    }

    pub fn fields(&self) -> &SolidFields {
        &self.fields
    }

    /// Lamé parameters per unit density.
    pub fn parameters(&self) -> &LameParameters<f64> {
        &self.parameters
    }

    pub fn mass_balance(&self) -> &MassBalance {
        &self.mass_balance
    }

    /// The element residual of `cell`, as a function of the local unknowns.
    pub fn element_residual(&self, cell: usize) -> SolidElementResidual<'_> {
        SolidElementResidual {
            problem: self,
            reference_coordinates: self.mesh.cell_coordinates(cell),
        }
    }

    pub fn assemble(&self, solution: &Solution) -> eyre::Result<AssembledSystem> {
        self.partition
            .assemble(self.dof_map.num_dofs(), |range: Range<usize>, system: &mut GlobalSystem| {
                self.assemble_cells(solution, range, system)
            })
    }

    /// Assembles the given cells into `system`, differentiating each element residual with
    /// forward-mode automatic differentiation.
    pub fn assemble_cells(
        &self,
        solution: &Solution,
        cells: impl IntoIterator<Item = usize>,
        system: &mut GlobalSystem,
    ) -> eyre::Result<()> {
        let local_size = self.dof_map.local_size(self.mesh.dim());
        let mut jacobian_workspace = ForwardJacobian::new();
        let mut dofs = ElementDofs::default();
        let mut residual = DVector::zeros(local_size);
        let mut jacobian = DMatrix::zeros(local_size, local_size);
        for cell in cells {
            self.dof_map
                .gather(&self.mesh, cell, solution, &mut dofs);
            let element = self.element_residual(cell);
            jacobian_workspace.evaluate_into(&element, dofs.values(), residual.as_mut_slice(), &mut jacobian)?;
            system.add_residual(dofs.rows(), residual.as_slice());
            system.add_block(dofs.rows(), dofs.rows(), &jacobian);
        }
        Ok(())
    }
}

impl NonlinearProblem for SolidProblem {
    fn dof_map(&self) -> &SystemDofMap {
        &self.dof_map
    }

    fn assemble(&self, solution: &Solution) -> eyre::Result<AssembledSystem> {
        SolidProblem::assemble(self, solution)
    }
}

/// Residual of one cell as a function of its local unknowns, laid out as
/// `[u_1 nodes, ..., u_dim nodes, p vertices]`.
pub struct SolidElementResidual<'a> {
    problem: &'a SolidProblem,
    reference_coordinates: Vec<Vector3<f64>>,
}

impl<'a> GenericResidual for SolidElementResidual<'a> {
    fn num_inputs(&self) -> usize {
        self.problem.dof_map.local_size(self.problem.mesh.dim())
    }

    fn num_outputs(&self) -> usize {
        self.num_inputs()
    }

    #[allow(non_snake_case)]
    fn evaluate<T: DiffScalar>(&self, x: &[T], residual: &mut [T]) -> eyre::Result<()> {
        let problem = self.problem;
        let dim = problem.mesh.dim();
        let tables = &problem.tables;
        let n_u = FiniteElementFamily::Quadratic.num_nodes(dim);
        let n_p = FiniteElementFamily::Linear.num_nodes(dim);
        assert_eq!(x.len(), dim * n_u + n_p);
        assert_eq!(residual.len(), x.len());

        let (u, p_dofs) = x.split_at(dim * n_u);
        let displacement = |k: usize, a: usize| u[k * n_u + a];
        let g = problem.gravity.acceleration(dim);
        let hyperelastic = problem.model.is_hyperelastic();

        let current_coordinates: Vec<Vector3<T>> = self
            .reference_coordinates
            .iter()
            .enumerate()
            .map(|(a, X)| {
                let mut x_a = X.map(T::from_value);
                for k in 0..dim {
                    x_a[k] += displacement(k, a);
                }
                x_a
            })
            .collect();

        let phi_table = tables.cell(FiniteElementFamily::Quadratic);
        let psi_table = tables.cell(FiniteElementFamily::Linear);
        let mut grad_x_phi = vec![Vector3::<T>::zeros(); n_u];
        for (q, &weight) in tables.cell_rule().weights().iter().enumerate() {
            let phi = phi_table.values(q);
            let psi = psi_table.values(q);
            let reference_gradients = phi_table.gradients(q);

            let reference = GeometricMapping::from_nodes(dim, &self.reference_coordinates, reference_gradients)?;
            let current = GeometricMapping::from_nodes(dim, &current_coordinates, reference_gradients)?;
            let w_X = weight * reference.determinant();
            let w_x = current.determinant() * weight;

            // F = I + grad_X u, padded with the identity
            let mut F = Matrix3::<T>::identity();
            let mut div_x_u = T::zero();
            for (a, grad_ref) in reference_gradients.iter().enumerate() {
                let grad_X = reference.physical_gradient(grad_ref);
                grad_x_phi[a] = current.physical_gradient(grad_ref);
                for k in 0..dim {
                    let u_ka = displacement(k, a);
                    for j in 0..dim {
                        F[(k, j)] += u_ka * grad_X[j];
                    }
                    div_x_u += u_ka * grad_x_phi[a][k];
                }
            }

            let pressure = psi
                .iter()
                .zip(p_dofs)
                .fold(T::zero(), |acc, (&psi_a, &p_a)| acc + p_a * psi_a);
            let mut sigma = problem.model.compute_stress(&F, &problem.parameters);
            for k in 0..3 {
                sigma[(k, k)] -= pressure;
            }

            for (i, (&phi_i, grad_phi_i)) in phi.iter().zip(&grad_x_phi).enumerate() {
                for k in 0..dim {
                    let mut r = T::zero();
                    for j in 0..dim {
                        r += grad_phi_i[j] * sigma[(k, j)];
                    }
                    r -= T::from_value(phi_i * g[k]);
                    residual[k * n_u + i] += r * w_x;
                }
            }

            let (volume_change, w) = if hyperelastic {
                (determinant(&F) - T::one(), T::from_value(w_X))
            } else {
                (div_x_u, w_x)
            };
            let mass = problem.mass_balance.residual(volume_change, pressure);
            for (i, &psi_i) in psi.iter().enumerate() {
                residual[dim * n_u + i] += mass * w * psi_i;
            }
        }
        Ok(())
    }
}

/// Clamps every displacement component on the faces with ids 2 and 4 (the `x` extremes of a box
/// mesh). All other faces and the pressure are free.
pub fn clamped_boundary_conditions() -> impl BoundaryConditions + Clone {
    |_: &Point3<f64>, field: &str, face: FaceId, _: f64| {
        let is_displacement = DISPLACEMENT_NAMES.iter().any(|&name| name == field);
        if is_displacement && (face == 2 || face == 4) {
            DofCondition::Dirichlet(0.0)
        } else {
            DofCondition::Natural
        }
    }
}
