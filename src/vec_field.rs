use crate::{Field2, Grid2, Vec2};

/// Two-component velocity or vector dye field, interleaved per cell.
pub type VecField2 = Field2<Vec2>;

impl Field2<Vec2> {
    pub fn zeros(grid: Grid2) -> Self {
        Self::new(grid, Vec2::zero())
    }

    pub fn max_speed(&self) -> f32 {
        self.data()
            .iter()
            .map(|value| value.length())
            .fold(0.0_f32, f32::max)
    }

    pub fn kinetic_energy(&self) -> f32 {
        0.5 * self
            .data()
            .iter()
            .map(|value| value.length_squared())
            .sum::<f32>()
    }
}
