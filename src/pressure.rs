use crate::{Discretization, Field2, InitialGuess, PingPong, Sampler};

/// One Jacobi pass over every cell:
/// `out = weight * (d + p(x-o) + p(x+o) + p(y-o) + p(y+o))`.
///
/// Reads only `pressure`, the fully settled previous pass.
pub fn jacobi_step(
    out: &mut Field2,
    pressure: &Field2,
    divergence: &Field2,
    weight: f32,
    offset: usize,
    sampler: &Sampler,
) {
    out.assert_same_grid(pressure);
    out.assert_same_grid(divergence);
    let o = offset as i32;
    out.fill_with_index(|x, y| {
        let (xi, yi) = (x as i32, y as i32);
        let neighbors = sampler.fetch(pressure, xi - o, yi)
            + sampler.fetch(pressure, xi + o, yi)
            + sampler.fetch(pressure, xi, yi - o)
            + sampler.fetch(pressure, xi, yi + o);
        weight * (divergence.get(x, y) + neighbors)
    });
}

/// First pass with no prior pressure: only the centre term survives.
pub fn jacobi_seed(out: &mut Field2, divergence: &Field2, weight: f32) {
    out.assert_same_grid(divergence);
    out.fill_with_index(|x, y| weight * divergence.get(x, y));
}

/// Runs exactly `iterations` Jacobi passes, swapping `pressure` after each.
///
/// The result is left in `pressure.current()`. Convergence is not checked.
/// `discretization` must pass [`Discretization::validate`]; the Jacobi weight
/// is read as a constant.
pub fn solve_pressure(
    pressure: &mut PingPong<Field2>,
    divergence: &Field2,
    iterations: usize,
    discretization: &Discretization,
    sampler: &Sampler,
) {
    debug_assert!(
        discretization.validate().is_ok(),
        "unvalidated discretization: {discretization:?}"
    );
    let weight = discretization.jacobi_weight.value;
    let offset = discretization.stencil_offset;
    let mut remaining = iterations;
    match discretization.initial_guess {
        InitialGuess::Zero => pressure.current_mut().fill(0.0),
        InitialGuess::CenterTerm => {
            pressure.current_mut().fill(0.0);
            if remaining > 0 {
                let (_, next) = pressure.split();
                jacobi_seed(next, divergence, weight);
                pressure.swap();
                remaining -= 1;
            }
        }
        InitialGuess::WarmStart => {}
    }
    for _ in 0..remaining {
        let (current, next) = pressure.split();
        jacobi_step(next, current, divergence, weight, offset, sampler);
        pressure.swap();
    }
    log::trace!(
        "jacobi: {} passes, offset {}, guess {:?}",
        iterations,
        offset,
        discretization.initial_guess
    );
}
