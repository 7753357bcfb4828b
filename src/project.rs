use crate::{Field2, Sampler, Vec2, VecField2};

/// Subtracts `scale * central_gradient(pressure)` from `velocity` into `out`.
pub fn apply_pressure_gradient_into(
    out: &mut VecField2,
    velocity: &VecField2,
    pressure: &Field2,
    scale: f32,
    sampler: &Sampler,
) {
    out.assert_same_grid(velocity);
    out.assert_same_grid(pressure);
    out.fill_with_index(|x, y| {
        let (xi, yi) = (x as i32, y as i32);
        let grad = Vec2::new(
            sampler.fetch(pressure, xi + 1, yi) - sampler.fetch(pressure, xi - 1, yi),
            sampler.fetch(pressure, xi, yi + 1) - sampler.fetch(pressure, xi, yi - 1),
        );
        velocity.get(x, y) - grad * scale
    });
}

pub fn apply_pressure_gradient(
    velocity: &VecField2,
    pressure: &Field2,
    scale: f32,
    sampler: &Sampler,
) -> VecField2 {
    let mut out = VecField2::zeros(velocity.grid());
    apply_pressure_gradient_into(&mut out, velocity, pressure, scale, sampler);
    out
}
