use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image::{GrayImage, Luma};
use stable_fluids::{
    splat, AdvectionScheme, AuxId, BoundaryMode, Buoyancy, CoordinateSpace, Discretization,
    Field2, FluidSolver, Grid2, InitialGuess, Interpolation, Sampler, SolverConfig, Vec2,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    /// Dye pushed around by two opposing momentum splats
    Splats,
    /// Hot, light smoke rising from the bottom edge
    Smoke,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliBoundary {
    Clamp,
    Wrap,
}

impl From<CliBoundary> for BoundaryMode {
    fn from(value: CliBoundary) -> Self {
        match value {
            CliBoundary::Clamp => BoundaryMode::Clamp,
            CliBoundary::Wrap => BoundaryMode::Wrap,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliInterpolation {
    Linear,
    Nearest,
}

impl From<CliInterpolation> for Interpolation {
    fn from(value: CliInterpolation) -> Self {
        match value {
            CliInterpolation::Linear => Interpolation::Linear,
            CliInterpolation::Nearest => Interpolation::Nearest,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliCoordinates {
    Pixel,
    Normalized,
}

impl From<CliCoordinates> for CoordinateSpace {
    fn from(value: CliCoordinates) -> Self {
        match value {
            CliCoordinates::Pixel => CoordinateSpace::Pixel,
            CliCoordinates::Normalized => CoordinateSpace::Normalized,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliStencil {
    #[value(name = "wide")]
    Wide,
    #[value(name = "compact")]
    Compact,
    #[value(name = "compact-timed")]
    CompactTimed,
}

impl From<CliStencil> for Discretization {
    fn from(value: CliStencil) -> Self {
        match value {
            CliStencil::Wide => Discretization::wide_stencil(),
            CliStencil::Compact => Discretization::compact_stencil(),
            CliStencil::CompactTimed => Discretization::compact_stencil_timed(),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliGuess {
    Zero,
    #[value(name = "center-term")]
    CenterTerm,
    #[value(name = "warm-start")]
    WarmStart,
}

impl From<CliGuess> for InitialGuess {
    fn from(value: CliGuess) -> Self {
        match value {
            CliGuess::Zero => InitialGuess::Zero,
            CliGuess::CenterTerm => InitialGuess::CenterTerm,
            CliGuess::WarmStart => InitialGuess::WarmStart,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliAdvection {
    #[value(name = "semi-lagrangian")]
    SemiLagrangian,
    #[value(name = "maccormack")]
    MacCormack,
}

impl From<CliAdvection> for AdvectionScheme {
    fn from(value: CliAdvection) -> Self {
        match value {
            CliAdvection::SemiLagrangian => AdvectionScheme::SemiLagrangian,
            CliAdvection::MacCormack => AdvectionScheme::MacCormack,
        }
    }
}

/// Headless stable-fluids runner writing grayscale PNG frames
#[derive(Parser, Debug)]
#[command(name = "fluid", version, about)]
struct Cli {
    /// Scene to simulate
    #[arg(long, value_enum, default_value_t = Preset::Splats)]
    preset: Preset,

    #[arg(long, default_value_t = 128)]
    width: usize,

    #[arg(long, default_value_t = 128)]
    height: usize,

    /// Timestep per tick
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Jacobi passes per tick
    #[arg(long, default_value_t = 25)]
    iterations: usize,

    #[arg(long, default_value_t = 120)]
    frames: usize,

    #[arg(long, value_enum, default_value_t = CliBoundary::Clamp)]
    boundary: CliBoundary,

    #[arg(long, value_enum, default_value_t = CliInterpolation::Linear)]
    interpolation: CliInterpolation,

    #[arg(long, value_enum, default_value_t = CliCoordinates::Pixel)]
    coordinates: CliCoordinates,

    /// Divergence / Jacobi / projection constant set
    #[arg(long, value_enum, default_value_t = CliStencil::Wide)]
    stencil: CliStencil,

    #[arg(long, value_enum, default_value_t = CliGuess::Zero)]
    initial_guess: CliGuess,

    #[arg(long, value_enum, default_value_t = CliAdvection::SemiLagrangian)]
    advection: CliAdvection,

    /// Directory for frame_NNNN.png output; nothing is written when omitted
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Write every Nth frame
    #[arg(long, default_value_t = 1)]
    save_every: usize,
}

struct Scene {
    preset: Preset,
    /// Field written to disk: dye for splats, smoke density for smoke.
    display: AuxId,
    temperature: Option<AuxId>,
    /// Converts cell-unit speeds into the solver's velocity units, per axis.
    velocity_unit: Vec2,
}

/// Size of one cell per unit time in the solver's velocity units, per axis.
fn velocity_unit(coordinates: CoordinateSpace, grid: Grid2) -> Vec2 {
    match coordinates {
        CoordinateSpace::Pixel => Vec2::new(1.0, 1.0),
        CoordinateSpace::Normalized => {
            let (w, h) = grid.dims();
            Vec2::new(1.0 / w, 1.0 / h)
        }
    }
}

impl Scene {
    fn new(preset: Preset, solver: &mut FluidSolver) -> Result<Self> {
        let grid = solver.grid();
        let velocity_unit = velocity_unit(solver.config().sampler.coordinates, grid);
        let display = solver.add_scalar_field(Field2::new(grid, 0.0))?;
        let temperature = match preset {
            Preset::Splats => None,
            Preset::Smoke => Some(
                solver.add_scalar_field(Field2::new(grid, Buoyancy::default().ambient_temperature))?,
            ),
        };
        Ok(Self {
            preset,
            display,
            temperature,
            velocity_unit,
        })
    }

    fn inject(&self, solver: &mut FluidSolver, frame: usize, dt: f32) -> Result<()> {
        let grid = solver.grid();
        let (w, h) = grid.dims();
        let radius = (w.min(h) * 0.05).powi(2).max(1.0);
        match self.preset {
            Preset::Splats => {
                if frame % 20 != 0 {
                    return Ok(());
                }
                let speed = 0.4 * w.min(h) * self.velocity_unit.x;
                let left = (w * 0.25, h * 0.5);
                let right = (w * 0.75, h * 0.55);
                if let Some(dye) = solver.scalar_field_mut(self.display) {
                    splat(dye, left, 1.0, radius);
                    splat(dye, right, 1.0, radius);
                }
                let velocity = solver.velocity_mut();
                splat(velocity, left, Vec2::new(speed, 0.0), radius);
                splat(velocity, right, Vec2::new(-speed, 0.0), radius);
            }
            Preset::Smoke => {
                let source = (w * 0.5, h * 0.1);
                if let Some(density) = solver.scalar_field_mut(self.display) {
                    splat(density, source, 0.2 * dt, radius);
                }
                if let Some(temperature) = self.temperature {
                    if let Some(field) = solver.scalar_field_mut(temperature) {
                        splat(field, source, 20.0 * dt, radius);
                    }
                    let defaults = Buoyancy::default();
                    let buoyancy = Buoyancy {
                        kappa: defaults.kappa * self.velocity_unit.y,
                        sigma: defaults.sigma * self.velocity_unit.y,
                        ..defaults
                    };
                    solver.apply_buoyancy(temperature, self.display, buoyancy, dt)?;
                }
            }
        }
        Ok(())
    }
}

fn field_to_image(field: &Field2) -> GrayImage {
    let grid = field.grid();
    let height = grid.height();
    GrayImage::from_fn(grid.width() as u32, height as u32, |x, y| {
        // +y points up in the simulation, down in the image.
        let value = field.get(x as usize, height - 1 - y as usize);
        Luma([(value.clamp(0.0, 1.0) * 255.0) as u8])
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let discretization =
        Discretization::from(cli.stencil).with_initial_guess(cli.initial_guess.into());
    let config = SolverConfig::new(cli.width, cli.height)
        .with_sampler(Sampler::new(
            cli.interpolation.into(),
            cli.boundary.into(),
            cli.coordinates.into(),
        ))
        .with_discretization(discretization)
        .with_advection(cli.advection.into());
    let mut solver = FluidSolver::new(config).context("invalid solver configuration")?;
    let scene = Scene::new(cli.preset, &mut solver)?;

    if let Some(dir) = &cli.output {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }
    let save_every = cli.save_every.max(1);

    log::info!(
        "{:?}: {}x{}, dt {}, {} jacobi passes, {} frames",
        cli.preset,
        cli.width,
        cli.height,
        cli.dt,
        cli.iterations,
        cli.frames
    );
    for frame in 0..cli.frames {
        scene.inject(&mut solver, frame, cli.dt)?;
        solver.step(cli.dt, cli.iterations);
        log::debug!(
            "frame {frame}: max speed {:.4}, energy {:.4}, pre-projection divergence {:.6}",
            solver.velocity().max_speed(),
            solver.velocity().kinetic_energy(),
            solver.divergence().max_abs()
        );
        if let Some(dir) = &cli.output {
            if frame % save_every != 0 {
                continue;
            }
            let Some(field) = solver.scalar_field(scene.display) else {
                continue;
            };
            let path = dir.join(format!("frame_{frame:04}.png"));
            field_to_image(field)
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
        }
    }
    log::info!("finished after {} ticks", solver.ticks());
    Ok(())
}
