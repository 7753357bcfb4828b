use crate::{AdvectionScheme, Grid2, Sampler};
use thiserror::Error;

const CONSISTENCY_TOL: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: usize, height: usize },
    #[error("field of shape {found_width}x{found_height} does not match the {width}x{height} solver grid")]
    ShapeMismatch {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },
    #[error("jacobi stencil offset must be >= 1")]
    ZeroStencilOffset,
    #[error("jacobi weight must be the constant 0.25, got {0:?}")]
    JacobiWeight(Coefficient),
    #[error("divergence scale {divergence:?} and projection scale {projection:?} must have cancelling time scalings")]
    TimeScalingMismatch {
        divergence: Coefficient,
        projection: Coefficient,
    },
    #[error("divergence scale * projection scale is {product}, expected {expected} for stencil offset {offset}")]
    InconsistentScales {
        product: f32,
        expected: f32,
        offset: usize,
    },
    #[error("coefficient {0:?} is not finite")]
    NonFinite(Coefficient),
    #[error("auxiliary field {0} is not a registered scalar field")]
    NotAScalarField(usize),
    #[error("no auxiliary field with index {0}")]
    UnknownAuxField(usize),
}

/// How a constant depends on the per-tick timestep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimeScaling {
    #[default]
    Constant,
    TimesDt,
    PerDt,
}

impl TimeScaling {
    fn exponent(self) -> i32 {
        match self {
            TimeScaling::Constant => 0,
            TimeScaling::TimesDt => 1,
            TimeScaling::PerDt => -1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficient {
    pub value: f32,
    pub time: TimeScaling,
}

impl Coefficient {
    pub const fn constant(value: f32) -> Self {
        Self {
            value,
            time: TimeScaling::Constant,
        }
    }

    pub const fn times_dt(value: f32) -> Self {
        Self {
            value,
            time: TimeScaling::TimesDt,
        }
    }

    pub const fn per_dt(value: f32) -> Self {
        Self {
            value,
            time: TimeScaling::PerDt,
        }
    }

    pub fn at(self, dt: f32) -> f32 {
        match self.time {
            TimeScaling::Constant => self.value,
            TimeScaling::TimesDt => self.value * dt,
            TimeScaling::PerDt => self.value / dt,
        }
    }
}

/// Pressure buffer contents before the first Jacobi pass of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InitialGuess {
    /// Pressure is cleared to zero.
    #[default]
    Zero,
    /// Pass 0 writes `weight * divergence` without reading pressure.
    CenterTerm,
    /// The previous tick's pressure seeds the solve.
    WarmStart,
}

/// Constants of the divergence / Jacobi / projection stencils.
///
/// The set must satisfy `divergence_scale * projection_scale == -offset² / 4`
/// with cancelling time scalings, so that the Jacobi fixed point
/// `4p - Σ p(±offset) = d` yields a gradient that removes the estimated
/// divergence.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Discretization {
    pub divergence_scale: Coefficient,
    pub jacobi_weight: Coefficient,
    pub stencil_offset: usize,
    pub projection_scale: Coefficient,
    pub initial_guess: InitialGuess,
}

impl Discretization {
    /// `±2` Jacobi stencil: the exact Laplacian of central differences on a
    /// collocated grid.
    pub const fn wide_stencil() -> Self {
        Self {
            divergence_scale: Coefficient::per_dt(-2.0),
            jacobi_weight: Coefficient::constant(0.25),
            stencil_offset: 2,
            projection_scale: Coefficient::times_dt(0.5),
            initial_guess: InitialGuess::Zero,
        }
    }

    pub const fn compact_stencil() -> Self {
        Self {
            divergence_scale: Coefficient::constant(-0.5),
            jacobi_weight: Coefficient::constant(0.25),
            stencil_offset: 1,
            projection_scale: Coefficient::constant(0.5),
            initial_guess: InitialGuess::Zero,
        }
    }

    pub const fn compact_stencil_timed() -> Self {
        Self {
            divergence_scale: Coefficient::per_dt(-0.5),
            jacobi_weight: Coefficient::constant(0.25),
            stencil_offset: 1,
            projection_scale: Coefficient::times_dt(0.5),
            initial_guess: InitialGuess::Zero,
        }
    }

    pub fn with_initial_guess(mut self, initial_guess: InitialGuess) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for coefficient in [
            self.divergence_scale,
            self.jacobi_weight,
            self.projection_scale,
        ] {
            if !coefficient.value.is_finite() {
                return Err(ConfigError::NonFinite(coefficient));
            }
        }
        if self.stencil_offset == 0 {
            return Err(ConfigError::ZeroStencilOffset);
        }
        let weight = self.jacobi_weight;
        if weight.time != TimeScaling::Constant || (weight.value - 0.25).abs() > 1e-6 {
            return Err(ConfigError::JacobiWeight(weight));
        }
        if self.divergence_scale.time.exponent() + self.projection_scale.time.exponent() != 0 {
            return Err(ConfigError::TimeScalingMismatch {
                divergence: self.divergence_scale,
                projection: self.projection_scale,
            });
        }
        let offset = self.stencil_offset as f32;
        let expected = -offset * offset / 4.0;
        let product = self.divergence_scale.value * self.projection_scale.value;
        if (product - expected).abs() > CONSISTENCY_TOL * expected.abs() {
            return Err(ConfigError::InconsistentScales {
                product,
                expected,
                offset: self.stencil_offset,
            });
        }
        Ok(())
    }
}

impl Default for Discretization {
    fn default() -> Self {
        Self::wide_stencil()
    }
}

/// Everything fixed for the lifetime of a solver instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverConfig {
    pub width: usize,
    pub height: usize,
    pub sampler: Sampler,
    pub discretization: Discretization,
    pub advection: AdvectionScheme,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self::new(128, 128)
    }
}

impl SolverConfig {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            sampler: Sampler::default(),
            discretization: Discretization::default(),
            advection: AdvectionScheme::default(),
        }
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_discretization(mut self, discretization: Discretization) -> Self {
        self.discretization = discretization;
        self
    }

    pub fn with_advection(mut self, advection: AdvectionScheme) -> Self {
        self.advection = advection;
        self
    }

    pub fn validate(&self) -> Result<Grid2, ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        self.discretization.validate()?;
        Ok(Grid2::new(self.width, self.height))
    }

    pub fn check_shape(&self, grid: Grid2) -> Result<(), ConfigError> {
        if grid.width() != self.width || grid.height() != self.height {
            return Err(ConfigError::ShapeMismatch {
                width: self.width,
                height: self.height,
                found_width: grid.width(),
                found_height: grid.height(),
            });
        }
        Ok(())
    }
}
