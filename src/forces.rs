use crate::{CellValue, Field2, VecField2};

/// Adds `amount * exp(-|cell - center|² / radius)` to every cell.
///
/// `center` is in cell units regardless of the solver's coordinate space.
pub fn splat<T: CellValue>(field: &mut Field2<T>, center: (f32, f32), amount: T, radius: f32) {
    if radius <= 0.0 {
        return;
    }
    field.update_with_index(|x, y, value| {
        let dx = x as f32 - center.0;
        let dy = y as f32 - center.1;
        let falloff = (-(dx * dx + dy * dy) / radius).exp();
        T::add(value, T::scale(amount, falloff))
    });
}

/// Thermal lift minus density weight, applied along +y.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Buoyancy {
    pub kappa: f32,
    pub sigma: f32,
    pub ambient_temperature: f32,
}

impl Default for Buoyancy {
    fn default() -> Self {
        Self {
            kappa: 0.25,
            sigma: 0.1,
            ambient_temperature: 15.0,
        }
    }
}

pub fn apply_buoyancy_into(
    out: &mut VecField2,
    velocity: &VecField2,
    temperature: &Field2,
    density: &Field2,
    buoyancy: Buoyancy,
    dt: f32,
) {
    out.assert_same_grid(velocity);
    out.assert_same_grid(temperature);
    out.assert_same_grid(density);
    out.fill_with_index(|x, y| {
        let mut v = velocity.get(x, y);
        let lift = -buoyancy.kappa * density.get(x, y)
            + buoyancy.sigma * (temperature.get(x, y) - buoyancy.ambient_temperature);
        v.y += dt * lift;
        v
    });
}
