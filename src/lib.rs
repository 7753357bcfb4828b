mod advect;
mod buffer;
mod config;
mod divergence;
mod field;
mod forces;
mod grid;
mod pressure;
mod project;
mod sampler;
mod solver;
mod vec2;
mod vec_field;

pub use advect::{
    advect, advect_into, advect_maccormack_into, advect_with_scheme_into, AdvectionScheme,
    MacCormackScratch,
};
pub use buffer::PingPong;
pub use config::{
    Coefficient, ConfigError, Discretization, InitialGuess, SolverConfig, TimeScaling,
};
pub use divergence::{divergence, divergence_into};
pub use field::{CellValue, Field2};
pub use forces::{apply_buoyancy_into, splat, Buoyancy};
pub use grid::Grid2;
pub use pressure::{jacobi_seed, jacobi_step, solve_pressure};
pub use project::{apply_pressure_gradient, apply_pressure_gradient_into};
pub use sampler::{BoundaryMode, CoordinateSpace, Interpolation, Sampler};
pub use solver::{AuxField, AuxId, FluidSolver};
pub use vec2::Vec2;
pub use vec_field::VecField2;
