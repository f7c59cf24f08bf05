//! Named scalar fields and their resolution into integer indices.
//!
//! Fields are registered once with a [`FieldRole`] and a [`FiniteElementFamily`]. Problems
//! resolve the names they need into [`ResolvedFields`] at setup time, so that no string
//! comparison takes place during assembly.
use crate::element::FiniteElementFamily;
use eyre::{bail, eyre};

/// Standard names of the Navier–Stokes control fields.
pub const VELOCITY_NAMES: [&str; 3] = ["U", "V", "W"];
pub const PRESSURE_NAME: &str = "P";
pub const ADJOINT_VELOCITY_NAMES: [&str; 3] = ["UADJ", "VADJ", "WADJ"];
pub const ADJOINT_PRESSURE_NAME: &str = "PADJ";
pub const CONTROL_NAMES: [&str; 3] = ["GX", "GY", "GZ"];
pub const MULTIPLIER_NAME: &str = "THETA";

/// Standard names of the solid displacement fields. The solid pressure is [`PRESSURE_NAME`].
pub const DISPLACEMENT_NAMES: [&str; 3] = ["DX", "DY", "DZ"];

/// The physical meaning of a registered field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldRole {
    Velocity(usize),
    Pressure,
    AdjointVelocity(usize),
    AdjointPressure,
    Control(usize),
    Multiplier,
    Displacement(usize),
    SolidPressure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub role: FieldRole,
    pub family: FiniteElementFamily,
}

/// The ordered set of fields stored in a [`Solution`](crate::solution::Solution).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRegistry {
    fields: Vec<FieldDescriptor>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a field and returns its registry index.
    pub fn register(&mut self, name: &str, role: FieldRole, family: FiniteElementFamily) -> eyre::Result<usize> {
        if self.index_of(name).is_some() {
            bail!("Field {name} is already registered");
        }
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            role,
            family,
        });
        Ok(self.fields.len() - 1)
    }

    /// Registry with the standard Navier–Stokes control fields.
    ///
    /// Velocities, adjoint velocities and controls are quadratic, both pressures are linear
    /// and the multiplier is piecewise constant.
    pub fn navier_stokes_control(dim: usize) -> Self {
        use FiniteElementFamily::*;
        let mut fields = Vec::new();
        let mut push = |name: &str, role, family| {
            fields.push(FieldDescriptor {
                name: name.to_string(),
                role,
                family,
            })
        };
        for k in 0..dim {
            push(VELOCITY_NAMES[k], FieldRole::Velocity(k), Quadratic);
        }
        push(PRESSURE_NAME, FieldRole::Pressure, Linear);
        for k in 0..dim {
            push(ADJOINT_VELOCITY_NAMES[k], FieldRole::AdjointVelocity(k), Quadratic);
        }
        push(ADJOINT_PRESSURE_NAME, FieldRole::AdjointPressure, Linear);
        for k in 0..dim {
            push(CONTROL_NAMES[k], FieldRole::Control(k), Quadratic);
        }
        push(MULTIPLIER_NAME, FieldRole::Multiplier, Constant);
        Self { fields }
    }

    /// Registry with quadratic displacements and a linear pressure.
    pub fn solid(dim: usize) -> Self {
        let mut fields: Vec<_> = (0..dim)
            .map(|k| FieldDescriptor {
                name: DISPLACEMENT_NAMES[k].to_string(),
                role: FieldRole::Displacement(k),
                family: FiniteElementFamily::Quadratic,
            })
            .collect();
        fields.push(FieldDescriptor {
            name: PRESSURE_NAME.to_string(),
            role: FieldRole::SolidPressure,
            family: FiniteElementFamily::Linear,
        });
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> &FieldDescriptor {
        &self.fields[index]
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Resolves `names` into parallel index arrays, in the given order.
    ///
    /// The position of a name in `names` becomes its pde index, i.e. its position in the
    /// per-element unknown ordering and in the global system.
    pub fn resolve(&self, names: &[&str]) -> eyre::Result<ResolvedFields> {
        let mut resolved = ResolvedFields::default();
        for (pde_index, &name) in names.iter().enumerate() {
            let solution_index = self
                .index_of(name)
                .ok_or_else(|| eyre!("Field {name} is not registered"))?;
            if resolved.solution_indices.contains(&solution_index) {
                bail!("Field {name} is requested more than once");
            }
            resolved.names.push(name.to_string());
            resolved.solution_indices.push(solution_index);
            resolved.pde_indices.push(pde_index);
            resolved.families.push(self.fields[solution_index].family);
            resolved.roles.push(self.fields[solution_index].role);
        }
        Ok(resolved)
    }

    /// Resolves every field whose role satisfies `filter`, in registry order.
    pub fn resolve_roles(&self, filter: impl Fn(FieldRole) -> bool) -> eyre::Result<ResolvedFields> {
        let names: Vec<_> = self
            .fields
            .iter()
            .filter(|field| filter(field.role))
            .map(|field| field.name.as_str())
            .collect();
        self.resolve(&names)
    }
}

/// Fields resolved for one problem, as parallel arrays indexed by pde index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFields {
    pub names: Vec<String>,
    /// Index into the [`FieldRegistry`] (and the [`Solution`](crate::solution::Solution)).
    pub solution_indices: Vec<usize>,
    pub pde_indices: Vec<usize>,
    pub families: Vec<FiniteElementFamily>,
    pub roles: Vec<FieldRole>,
}

impl ResolvedFields {
    pub fn len(&self) -> usize {
        self.solution_indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solution_indices.is_empty()
    }

    /// Pde index of the field with the given role.
    pub fn find_role(&self, role: FieldRole) -> eyre::Result<usize> {
        self.roles
            .iter()
            .position(|&r| r == role)
            .ok_or_else(|| eyre!("No field with role {role:?} among {:?}", self.names))
    }

    fn require_family(&self, pde_index: usize, family: FiniteElementFamily) -> eyre::Result<()> {
        if self.families[pde_index] != family {
            bail!(
                "Field {} must use the {family:?} family, but uses {:?}",
                self.names[pde_index],
                self.families[pde_index]
            );
        }
        Ok(())
    }
}

/// Pde indices of the Navier–Stokes control unknowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavierStokesFields {
    pub dim: usize,
    pub velocity: Vec<usize>,
    pub pressure: usize,
    pub adjoint_velocity: Vec<usize>,
    pub adjoint_pressure: usize,
    pub control: Vec<usize>,
    pub multiplier: usize,
    pub resolved: ResolvedFields,
}

impl NavierStokesFields {
    /// Resolves the standard Navier–Stokes control names.
    ///
    /// Velocity-like fields must be quadratic, pressures linear and the multiplier constant.
    pub fn resolve(registry: &FieldRegistry, dim: usize) -> eyre::Result<Self> {
        let mut names = Vec::new();
        names.extend_from_slice(&VELOCITY_NAMES[..dim]);
        names.push(PRESSURE_NAME);
        names.extend_from_slice(&ADJOINT_VELOCITY_NAMES[..dim]);
        names.push(ADJOINT_PRESSURE_NAME);
        names.extend_from_slice(&CONTROL_NAMES[..dim]);
        names.push(MULTIPLIER_NAME);
        let resolved = registry.resolve(&names)?;

        let velocity: Vec<_> = (0..dim).collect();
        let pressure = dim;
        let adjoint_velocity: Vec<_> = (dim + 1..2 * dim + 1).collect();
        let adjoint_pressure = 2 * dim + 1;
        let control: Vec<_> = (2 * dim + 2..3 * dim + 2).collect();
        let multiplier = 3 * dim + 2;

        use FiniteElementFamily::*;
        for &k in velocity.iter().chain(&adjoint_velocity).chain(&control) {
            resolved.require_family(k, Quadratic)?;
        }
        resolved.require_family(pressure, Linear)?;
        resolved.require_family(adjoint_pressure, Linear)?;
        resolved.require_family(multiplier, Constant)?;

        Ok(Self {
            dim,
            velocity,
            pressure,
            adjoint_velocity,
            adjoint_pressure,
            control,
            multiplier,
            resolved,
        })
    }
}

/// Pde indices of the solid unknowns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolidFields {
    pub dim: usize,
    pub displacement: Vec<usize>,
    pub pressure: usize,
    pub resolved: ResolvedFields,
}

impl SolidFields {
    pub fn resolve(registry: &FieldRegistry, dim: usize) -> eyre::Result<Self> {
        let mut names = Vec::new();
        names.extend_from_slice(&DISPLACEMENT_NAMES[..dim]);
        names.push(PRESSURE_NAME);
        let resolved = registry.resolve(&names)?;
        for k in 0..dim {
            resolved.require_family(k, FiniteElementFamily::Quadratic)?;
        }
        resolved.require_family(dim, FiniteElementFamily::Linear)?;
        Ok(Self {
            dim,
            displacement: (0..dim).collect(),
            pressure: dim,
            resolved,
        })
    }
}
