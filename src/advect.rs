use crate::{CellValue, Field2, Sampler, VecField2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AdvectionScheme {
    #[default]
    SemiLagrangian,
    MacCormack,
}

/// Intermediate forward and backward passes of a MacCormack advection.
#[derive(Clone, Debug)]
pub struct MacCormackScratch<T = f32> {
    forward: Field2<T>,
    backward: Field2<T>,
}

impl<T: CellValue> MacCormackScratch<T> {
    pub fn new(grid: crate::Grid2) -> Self {
        Self {
            forward: Field2::new(grid, T::default()),
            backward: Field2::new(grid, T::default()),
        }
    }
}

fn backtrace(sampler: &Sampler, velocity: &VecField2, x: usize, y: usize, dt: f32) -> (f32, f32) {
    let v = velocity.get(x, y);
    let pos = sampler.cell_position(velocity.grid(), x, y);
    (pos.0 - dt * v.x, pos.1 - dt * v.y)
}

/// Semi-Lagrangian transport of `field` along `velocity` into `out`.
///
/// Velocity is read at the cell itself; only the source field is interpolated.
pub fn advect_into<T: CellValue>(
    out: &mut Field2<T>,
    field: &Field2<T>,
    velocity: &VecField2,
    dt: f32,
    sampler: &Sampler,
) {
    field.assert_same_grid(velocity);
    if dt == 0.0 {
        out.copy_from(field);
        return;
    }
    out.assert_same_grid(field);
    out.fill_with_index(|x, y| sampler.sample(field, backtrace(sampler, velocity, x, y, dt)));
}

pub fn advect<T: CellValue>(
    field: &Field2<T>,
    velocity: &VecField2,
    dt: f32,
    sampler: &Sampler,
) -> Field2<T> {
    let mut out = Field2::new(field.grid(), T::default());
    advect_into(&mut out, field, velocity, dt, sampler);
    out
}

/// Forward/backward corrected advection, limited to the source stencil range.
pub fn advect_maccormack_into<T: CellValue>(
    out: &mut Field2<T>,
    scratch: &mut MacCormackScratch<T>,
    field: &Field2<T>,
    velocity: &VecField2,
    dt: f32,
    sampler: &Sampler,
) {
    out.assert_same_grid(field);
    if dt == 0.0 {
        out.copy_from(field);
        return;
    }
    advect_into(&mut scratch.forward, field, velocity, dt, sampler);
    advect_into(&mut scratch.backward, &scratch.forward, velocity, -dt, sampler);
    let forward = &scratch.forward;
    let backward = &scratch.backward;
    out.fill_with_index(|x, y| {
        let predicted = forward.get(x, y);
        let error = T::sub(field.get(x, y), backward.get(x, y));
        let corrected = T::add(predicted, T::scale(error, 0.5));
        if !T::is_finite(corrected) {
            return predicted;
        }
        let (lo, hi) =
            sampler.neighborhood_bounds(field, backtrace(sampler, velocity, x, y, dt));
        T::min(T::max(corrected, lo), hi)
    });
}

pub fn advect_with_scheme_into<T: CellValue>(
    scheme: AdvectionScheme,
    out: &mut Field2<T>,
    scratch: &mut MacCormackScratch<T>,
    field: &Field2<T>,
    velocity: &VecField2,
    dt: f32,
    sampler: &Sampler,
) {
    match scheme {
        AdvectionScheme::SemiLagrangian => advect_into(out, field, velocity, dt, sampler),
        AdvectionScheme::MacCormack => {
            advect_maccormack_into(out, scratch, field, velocity, dt, sampler)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoundaryMode, CoordinateSpace, Grid2, Interpolation, Vec2};

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    #[test]
    fn zero_dt_reproduces_source() {
        let grid = Grid2::new(5, 4);
        let field = Field2::from_fn(grid, |x, y| (x * x + 3 * y) as f32);
        let velocity = VecField2::from_fn(grid, |x, y| Vec2::new(x as f32, -(y as f32)));
        for interpolation in [Interpolation::Linear, Interpolation::Nearest] {
            let sampler = Sampler::new(interpolation, BoundaryMode::Clamp, CoordinateSpace::Pixel);
            assert_eq!(advect(&field, &velocity, 0.0, &sampler), field);
        }
    }

    #[test]
    fn constant_rightward_flow_shifts_by_one_cell() {
        let grid = Grid2::new(4, 4);
        let field = Field2::from_fn(grid, |x, y| (x + 10 * y) as f32);
        let velocity = VecField2::new(grid, Vec2::new(1.0, 0.0));
        let sampler = Sampler::default();
        let advected = advect(&field, &velocity, 1.0, &sampler);
        for y in 0..4 {
            assert_eq!(advected.get(0, y), field.get(0, y));
            for x in 1..4 {
                assert_eq!(advected.get(x, y), field.get(x - 1, y));
            }
        }
    }

    #[test]
    fn self_advection_of_uniform_velocity_is_stationary() {
        let grid = Grid2::new(4, 4);
        let velocity = VecField2::new(grid, Vec2::new(1.0, 0.0));
        let advected = advect(&velocity, &velocity, 1.0, &Sampler::default());
        assert_eq!(advected, velocity);
    }

    #[test]
    fn wrap_carries_values_around() {
        let grid = Grid2::new(4, 1);
        let field = Field2::from_fn(grid, |x, _y| x as f32);
        let velocity = VecField2::new(grid, Vec2::new(1.0, 0.0));
        let sampler = Sampler::new(
            Interpolation::Linear,
            BoundaryMode::Wrap,
            CoordinateSpace::Pixel,
        );
        let advected = advect(&field, &velocity, 1.0, &sampler);
        assert_eq!(advected.get(0, 0), 3.0);
        assert_eq!(advected.get(1, 0), 0.0);
    }

    #[test]
    fn normalized_velocity_is_measured_in_domain_units() {
        let grid = Grid2::new(8, 4);
        let field = Field2::from_fn(grid, |x, y| (x + 10 * y) as f32);
        let velocity = VecField2::new(grid, Vec2::new(1.0 / 8.0, 0.0));
        let sampler = Sampler::new(
            Interpolation::Linear,
            BoundaryMode::Clamp,
            CoordinateSpace::Normalized,
        );
        let advected = advect(&field, &velocity, 1.0, &sampler);
        for y in 0..4 {
            for x in 1..8 {
                assert_close(advected.get(x, y), field.get(x - 1, y), 1e-4);
            }
        }
    }

    #[test]
    fn half_cell_backtrace_interpolates() {
        let grid = Grid2::new(4, 1);
        let field = Field2::from_fn(grid, |x, _y| x as f32 * 2.0);
        let velocity = VecField2::new(grid, Vec2::new(0.5, 0.0));
        let advected = advect(&field, &velocity, 1.0, &Sampler::default());
        assert_close(advected.get(2, 0), 3.0, 1e-6);
    }

    #[test]
    fn maccormack_is_exact_on_linear_profiles() {
        let grid = Grid2::new(12, 3);
        let field = Field2::from_fn(grid, |x, _y| x as f32);
        let velocity = VecField2::new(grid, Vec2::new(0.3, 0.0));
        let sampler = Sampler::default();
        let mut scratch = MacCormackScratch::new(grid);
        let mut out = Field2::new(grid, 0.0);
        advect_maccormack_into(&mut out, &mut scratch, &field, &velocity, 1.0, &sampler);
        for x in 2..10 {
            assert_close(out.get(x, 1), x as f32 - 0.3, 1e-5);
        }
    }

    #[test]
    fn maccormack_does_not_create_new_extrema() {
        let grid = Grid2::new(16, 1);
        let field = Field2::from_fn(grid, |x, _y| if (5..9).contains(&x) { 1.0 } else { 0.0 });
        let velocity = VecField2::new(grid, Vec2::new(0.4, 0.0));
        let sampler = Sampler::default();
        let mut scratch = MacCormackScratch::new(grid);
        let mut out = Field2::new(grid, 0.0);
        advect_maccormack_into(&mut out, &mut scratch, &field, &velocity, 1.0, &sampler);
        let (lo, hi) = out.min_max();
        assert!(lo >= 0.0 && hi <= 1.0, "range {lo}..{hi}");
        let plain = advect(&field, &velocity, 1.0, &sampler);
        assert!(out.max_abs_diff(&field) > 0.0);
        assert!((out.sum() - plain.sum()).abs() < 1.0);
    }

    #[test]
    #[should_panic(expected = "field grid mismatch")]
    fn maccormack_rejects_mismatched_output() {
        let grid = Grid2::new(4, 4);
        let field = Field2::from_fn(grid, |x, y| (x + y) as f32);
        let velocity = VecField2::new(grid, Vec2::new(1.0, 0.0));
        let mut scratch = MacCormackScratch::new(grid);
        let mut out = Field2::new(Grid2::new(4, 2), 0.0);
        advect_maccormack_into(
            &mut out,
            &mut scratch,
            &field,
            &velocity,
            1.0,
            &Sampler::default(),
        );
    }

    #[test]
    fn scheme_dispatch_matches_direct_call() {
        let grid = Grid2::new(6, 6);
        let field = Field2::from_fn(grid, |x, y| ((x * 7 + y * 3) % 5) as f32);
        let velocity = VecField2::from_fn(grid, |x, y| Vec2::new(0.2 * x as f32, -0.1 * y as f32));
        let sampler = Sampler::default();
        let mut scratch = MacCormackScratch::new(grid);
        let mut out = Field2::new(grid, 0.0);
        advect_with_scheme_into(
            AdvectionScheme::SemiLagrangian,
            &mut out,
            &mut scratch,
            &field,
            &velocity,
            0.5,
            &sampler,
        );
        assert_eq!(out, advect(&field, &velocity, 0.5, &sampler));
    }
}
