use crate::{
    advect_with_scheme_into, apply_buoyancy_into, apply_pressure_gradient_into, divergence_into,
    solve_pressure, Buoyancy, ConfigError, Field2, Grid2, MacCormackScratch, PingPong,
    SolverConfig, Vec2, VecField2,
};

/// Handle to an auxiliary field registered with a [`FluidSolver`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AuxId(usize);

impl AuxId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Passive quantity carried by the flow; never feeds back into velocity
/// except through explicit forces such as buoyancy.
#[derive(Clone, Debug)]
pub enum AuxField {
    Scalar(PingPong<Field2>),
    Vector(PingPong<VecField2>),
}

impl AuxField {
    fn grids(&self) -> [Grid2; 2] {
        match self {
            AuxField::Scalar(buffers) => buffers.both().map(|field| field.grid()),
            AuxField::Vector(buffers) => buffers.both().map(|field| field.grid()),
        }
    }
}

impl From<Field2> for AuxField {
    fn from(field: Field2) -> Self {
        AuxField::Scalar(PingPong::new(field))
    }
}

impl From<VecField2> for AuxField {
    fn from(field: VecField2) -> Self {
        AuxField::Vector(PingPong::new(field))
    }
}

/// Owns every double-buffered field of one simulation and sequences the
/// stages of a tick.
#[derive(Clone, Debug)]
pub struct FluidSolver {
    config: SolverConfig,
    grid: Grid2,
    velocity: PingPong<VecField2>,
    pressure: PingPong<Field2>,
    divergence: Field2,
    scalar_scratch: MacCormackScratch<f32>,
    vector_scratch: MacCormackScratch<Vec2>,
    aux: Vec<AuxField>,
    ticks: u64,
}

impl FluidSolver {
    pub fn new(config: SolverConfig) -> Result<Self, ConfigError> {
        let grid = config.validate()?;
        log::debug!(
            "fluid solver {}x{}: {:?}, {:?}, offset {}, {:?}",
            grid.width(),
            grid.height(),
            config.sampler,
            config.advection,
            config.discretization.stencil_offset,
            config.discretization.initial_guess
        );
        Ok(Self {
            config,
            grid,
            velocity: PingPong::new(VecField2::zeros(grid)),
            pressure: PingPong::new(Field2::new(grid, 0.0)),
            divergence: Field2::new(grid, 0.0),
            scalar_scratch: MacCormackScratch::new(grid),
            vector_scratch: MacCormackScratch::new(grid),
            aux: Vec::new(),
            ticks: 0,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn velocity(&self) -> &VecField2 {
        self.velocity.current()
    }

    pub fn velocity_mut(&mut self) -> &mut VecField2 {
        self.velocity.current_mut()
    }

    pub fn set_velocity(&mut self, velocity: VecField2) -> Result<(), ConfigError> {
        self.config.check_shape(velocity.grid())?;
        self.velocity = PingPong::new(velocity);
        Ok(())
    }

    pub fn pressure(&self) -> &Field2 {
        self.pressure.current()
    }

    pub fn divergence(&self) -> &Field2 {
        &self.divergence
    }

    pub fn add_scalar_field(&mut self, field: Field2) -> Result<AuxId, ConfigError> {
        self.push_aux(field.into())
    }

    pub fn add_vector_field(&mut self, field: VecField2) -> Result<AuxId, ConfigError> {
        self.push_aux(field.into())
    }

    fn push_aux(&mut self, field: AuxField) -> Result<AuxId, ConfigError> {
        for grid in field.grids() {
            self.config.check_shape(grid)?;
        }
        self.aux.push(field);
        Ok(AuxId(self.aux.len() - 1))
    }

    /// Replaces a registered auxiliary field; the kind may change.
    pub fn set_aux_field(
        &mut self,
        id: AuxId,
        field: impl Into<AuxField>,
    ) -> Result<(), ConfigError> {
        let field = field.into();
        for grid in field.grids() {
            self.config.check_shape(grid)?;
        }
        let slot = self
            .aux
            .get_mut(id.0)
            .ok_or(ConfigError::UnknownAuxField(id.0))?;
        *slot = field;
        Ok(())
    }

    pub fn aux(&self, id: AuxId) -> Option<&AuxField> {
        self.aux.get(id.0)
    }

    pub fn scalar_field(&self, id: AuxId) -> Option<&Field2> {
        match self.aux.get(id.0)? {
            AuxField::Scalar(buffers) => Some(buffers.current()),
            AuxField::Vector(_) => None,
        }
    }

    pub fn scalar_field_mut(&mut self, id: AuxId) -> Option<&mut Field2> {
        match self.aux.get_mut(id.0)? {
            AuxField::Scalar(buffers) => Some(buffers.current_mut()),
            AuxField::Vector(_) => None,
        }
    }

    pub fn vector_field(&self, id: AuxId) -> Option<&VecField2> {
        match self.aux.get(id.0)? {
            AuxField::Vector(buffers) => Some(buffers.current()),
            AuxField::Scalar(_) => None,
        }
    }

    pub fn vector_field_mut(&mut self, id: AuxId) -> Option<&mut VecField2> {
        match self.aux.get_mut(id.0)? {
            AuxField::Vector(buffers) => Some(buffers.current_mut()),
            AuxField::Scalar(_) => None,
        }
    }

    /// One full tick: self-advect, divergence, `iterations` Jacobi passes,
    /// projection, then transport of every auxiliary field.
    ///
    /// A zero timestep leaves every field untouched.
    pub fn step(&mut self, dt: f32, iterations: usize) {
        if dt == 0.0 {
            log::trace!("tick {} skipped: dt = 0", self.ticks);
            return;
        }
        self.advect_velocity(dt);
        self.compute_divergence(dt);
        self.solve_pressure(iterations);
        self.project(dt);
        self.advect_aux(dt);
        self.ticks += 1;
        if log::log_enabled!(log::Level::Trace) {
            log::trace!(
                "tick {}: dt {:.4}, max speed {:.4}, pre-projection divergence {:.6}",
                self.ticks,
                dt,
                self.velocity.current().max_speed(),
                self.divergence.max_abs()
            );
        }
    }

    pub fn advect_velocity(&mut self, dt: f32) {
        let sampler = self.config.sampler;
        let (current, next) = self.velocity.split();
        advect_with_scheme_into(
            self.config.advection,
            next,
            &mut self.vector_scratch,
            current,
            current,
            dt,
            &sampler,
        );
        self.velocity.swap();
    }

    /// Skipped for `dt == 0`, where per-dt scales are undefined.
    pub fn compute_divergence(&mut self, dt: f32) {
        if dt == 0.0 {
            return;
        }
        let scale = self.config.discretization.divergence_scale.at(dt);
        divergence_into(
            &mut self.divergence,
            self.velocity.current(),
            scale,
            &self.config.sampler,
        );
    }

    pub fn solve_pressure(&mut self, iterations: usize) {
        solve_pressure(
            &mut self.pressure,
            &self.divergence,
            iterations,
            &self.config.discretization,
            &self.config.sampler,
        );
    }

    /// Skipped for `dt == 0`, like [`FluidSolver::compute_divergence`].
    pub fn project(&mut self, dt: f32) {
        if dt == 0.0 {
            return;
        }
        let scale = self.config.discretization.projection_scale.at(dt);
        let (current, next) = self.velocity.split();
        apply_pressure_gradient_into(
            next,
            current,
            self.pressure.current(),
            scale,
            &self.config.sampler,
        );
        self.velocity.swap();
    }

    pub fn advect_aux(&mut self, dt: f32) {
        let sampler = self.config.sampler;
        let scheme = self.config.advection;
        let velocity = self.velocity.current();
        for field in self.aux.iter_mut() {
            match field {
                AuxField::Scalar(buffers) => {
                    let (current, next) = buffers.split();
                    advect_with_scheme_into(
                        scheme,
                        next,
                        &mut self.scalar_scratch,
                        current,
                        velocity,
                        dt,
                        &sampler,
                    );
                    buffers.swap();
                }
                AuxField::Vector(buffers) => {
                    let (current, next) = buffers.split();
                    advect_with_scheme_into(
                        scheme,
                        next,
                        &mut self.vector_scratch,
                        current,
                        velocity,
                        dt,
                        &sampler,
                    );
                    buffers.swap();
                }
            }
        }
    }

    /// Adds buoyant lift from two registered scalar fields to the velocity.
    pub fn apply_buoyancy(
        &mut self,
        temperature: AuxId,
        density: AuxId,
        buoyancy: Buoyancy,
        dt: f32,
    ) -> Result<(), ConfigError> {
        let temperature = match self.aux.get(temperature.0) {
            Some(AuxField::Scalar(buffers)) => buffers.current(),
            _ => return Err(ConfigError::NotAScalarField(temperature.0)),
        };
        let density = match self.aux.get(density.0) {
            Some(AuxField::Scalar(buffers)) => buffers.current(),
            _ => return Err(ConfigError::NotAScalarField(density.0)),
        };
        let (current, next) = self.velocity.split();
        apply_buoyancy_into(next, current, temperature, density, buoyancy, dt);
        self.velocity.swap();
        Ok(())
    }
}
