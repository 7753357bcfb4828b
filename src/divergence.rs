use crate::{Field2, Sampler, VecField2};

/// Central-difference divergence, `scale * (u(x+1) - u(x-1) + v(y+1) - v(y-1))`.
///
/// Neighbour reads past the edge go through the sampler's boundary policy.
pub fn divergence_into(out: &mut Field2, velocity: &VecField2, scale: f32, sampler: &Sampler) {
    out.assert_same_grid(velocity);
    out.fill_with_index(|x, y| {
        let (x, y) = (x as i32, y as i32);
        let u_r = sampler.fetch(velocity, x + 1, y).x;
        let u_l = sampler.fetch(velocity, x - 1, y).x;
        let v_t = sampler.fetch(velocity, x, y + 1).y;
        let v_b = sampler.fetch(velocity, x, y - 1).y;
        scale * (u_r - u_l + v_t - v_b)
    });
}

pub fn divergence(velocity: &VecField2, scale: f32, sampler: &Sampler) -> Field2 {
    let mut out = Field2::new(velocity.grid(), 0.0);
    divergence_into(&mut out, velocity, scale, sampler);
    out
}
