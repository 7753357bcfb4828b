use crate::{CellValue, Field2, Grid2};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Interpolation {
    #[default]
    Linear,
    Nearest,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryMode {
    #[default]
    Clamp,
    Wrap,
}

/// How continuous positions handed to [`Sampler::sample`] are measured.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CoordinateSpace {
    /// Cell units; cell `(i, j)` sits at `(i, j)`.
    #[default]
    Pixel,
    /// Unit square; cell `(i, j)` sits at `((i + 0.5) / W, (j + 0.5) / H)`.
    ///
    /// Velocity `x` is then measured in `1/W` per unit time and `y` in `1/H`.
    /// The divergence and projection stencils difference both components
    /// with the same weight, so they match the continuous operator only on
    /// square grids.
    Normalized,
}

/// Immutable lookup policy shared by every kernel of a solver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sampler {
    pub interpolation: Interpolation,
    pub boundary: BoundaryMode,
    pub coordinates: CoordinateSpace,
}

impl Sampler {
    pub const fn new(
        interpolation: Interpolation,
        boundary: BoundaryMode,
        coordinates: CoordinateSpace,
    ) -> Self {
        Self {
            interpolation,
            boundary,
            coordinates,
        }
    }

    /// Integer read; out-of-range coordinates go through the boundary policy.
    pub fn fetch<T: CellValue>(&self, field: &Field2<T>, x: i32, y: i32) -> T {
        let (cx, cy) = field.grid().resolve(x, y, self.boundary);
        field.get(cx, cy)
    }

    pub fn cell_position(&self, grid: Grid2, x: usize, y: usize) -> (f32, f32) {
        match self.coordinates {
            CoordinateSpace::Pixel => (x as f32, y as f32),
            CoordinateSpace::Normalized => {
                let (w, h) = grid.dims();
                ((x as f32 + 0.5) / w, (y as f32 + 0.5) / h)
            }
        }
    }

    fn texel_position(&self, grid: Grid2, pos: (f32, f32)) -> (f32, f32) {
        let (w, h) = grid.dims();
        let (gx, gy) = match self.coordinates {
            CoordinateSpace::Pixel => pos,
            CoordinateSpace::Normalized => (pos.0 * w - 0.5, pos.1 * h - 0.5),
        };
        // Fold far positions back before the integer conversion saturates.
        match self.boundary {
            BoundaryMode::Clamp => (gx.clamp(-1.0, w), gy.clamp(-1.0, h)),
            BoundaryMode::Wrap => (gx.rem_euclid(w), gy.rem_euclid(h)),
        }
    }

    pub fn sample<T: CellValue>(&self, field: &Field2<T>, pos: (f32, f32)) -> T {
        let (gx, gy) = self.texel_position(field.grid(), pos);
        match self.interpolation {
            Interpolation::Nearest => self.fetch(field, gx.round() as i32, gy.round() as i32),
            Interpolation::Linear => {
                let x0 = gx.floor() as i32;
                let y0 = gy.floor() as i32;
                let x1 = x0.saturating_add(1);
                let y1 = y0.saturating_add(1);
                let sx = gx - x0 as f32;
                let sy = gy - y0 as f32;
                let v00 = self.fetch(field, x0, y0);
                let v10 = self.fetch(field, x1, y0);
                let v01 = self.fetch(field, x0, y1);
                let v11 = self.fetch(field, x1, y1);
                let vx0 = T::lerp(v00, v10, sx);
                let vx1 = T::lerp(v01, v11, sx);
                T::lerp(vx0, vx1, sy)
            }
        }
    }

    /// Component-wise min and max over the four cells surrounding `pos`.
    pub fn neighborhood_bounds<T: CellValue>(&self, field: &Field2<T>, pos: (f32, f32)) -> (T, T) {
        let (gx, gy) = self.texel_position(field.grid(), pos);
        let x0 = gx.floor() as i32;
        let y0 = gy.floor() as i32;
        let x1 = x0.saturating_add(1);
        let y1 = y0.saturating_add(1);
        let corners = [
            self.fetch(field, x0, y0),
            self.fetch(field, x1, y0),
            self.fetch(field, x0, y1),
            self.fetch(field, x1, y1),
        ];
        corners[1..]
            .iter()
            .fold((corners[0], corners[0]), |(lo, hi), value| {
                (T::min(lo, *value), T::max(hi, *value))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vec2;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn ramp(grid: Grid2) -> Field2 {
        Field2::from_fn(grid, |x, y| (x * 3 + y * 17) as f32 + 0.25)
    }

    fn all_samplers() -> Vec<Sampler> {
        let mut samplers = Vec::new();
        for interpolation in [Interpolation::Linear, Interpolation::Nearest] {
            for boundary in [BoundaryMode::Clamp, BoundaryMode::Wrap] {
                for coordinates in [CoordinateSpace::Pixel, CoordinateSpace::Normalized] {
                    samplers.push(Sampler::new(interpolation, boundary, coordinates));
                }
            }
        }
        samplers
    }

    #[test]
    fn cell_centres_reproduce_cell_values() {
        let grid = Grid2::new(5, 4);
        let field = ramp(grid);
        for sampler in all_samplers() {
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let pos = sampler.cell_position(grid, x, y);
                    let value = sampler.sample(&field, pos);
                    if sampler.coordinates == CoordinateSpace::Pixel {
                        assert_eq!(value, field.get(x, y), "{sampler:?} at ({x}, {y})");
                    } else {
                        assert_close(value, field.get(x, y), 1e-4);
                    }
                }
            }
        }
    }

    #[test]
    fn clamp_replicates_the_edge_cell() {
        let grid = Grid2::new(4, 3);
        let field = ramp(grid);
        for interpolation in [Interpolation::Linear, Interpolation::Nearest] {
            let sampler = Sampler::new(interpolation, BoundaryMode::Clamp, CoordinateSpace::Pixel);
            for y in 0..grid.height() {
                let y = y as f32;
                assert_eq!(
                    sampler.sample(&field, (-1.0, y)),
                    sampler.sample(&field, (0.0, y))
                );
            }
        }
    }

    #[test]
    fn wrap_reads_the_opposite_edge() {
        let grid = Grid2::new(4, 3);
        let field = ramp(grid);
        for interpolation in [Interpolation::Linear, Interpolation::Nearest] {
            let sampler = Sampler::new(interpolation, BoundaryMode::Wrap, CoordinateSpace::Pixel);
            for y in 0..grid.height() {
                assert_eq!(
                    sampler.sample(&field, (-1.0, y as f32)),
                    sampler.sample(&field, ((grid.width() - 1) as f32, y as f32))
                );
            }
        }
    }

    #[test]
    fn linear_interpolates_between_cells() {
        let grid = Grid2::new(3, 3);
        let field = Field2::from_fn(grid, |x, y| (x + 10 * y) as f32);
        let sampler = Sampler::default();
        assert_close(sampler.sample(&field, (0.5, 0.0)), 0.5, 1e-6);
        assert_close(sampler.sample(&field, (1.25, 1.5)), 16.25, 1e-5);
    }

    #[test]
    fn wrap_interpolates_across_the_seam() {
        let grid = Grid2::new(4, 1);
        let field = Field2::from_fn(grid, |x, _y| x as f32);
        let sampler = Sampler::new(
            Interpolation::Linear,
            BoundaryMode::Wrap,
            CoordinateSpace::Pixel,
        );
        assert_close(sampler.sample(&field, (3.5, 0.0)), 1.5, 1e-6);
        assert_close(sampler.sample(&field, (-0.5, 0.0)), 1.5, 1e-6);
    }

    #[test]
    fn nearest_rounds_to_closest_cell() {
        let grid = Grid2::new(3, 3);
        let field = Field2::from_fn(grid, |x, y| (x + 10 * y) as f32);
        let sampler = Sampler::new(
            Interpolation::Nearest,
            BoundaryMode::Clamp,
            CoordinateSpace::Pixel,
        );
        assert_eq!(sampler.sample(&field, (0.6, 1.4)), 11.0);
        assert_eq!(sampler.sample(&field, (7.0, -3.0)), 2.0);
    }

    #[test]
    fn vector_fields_interpolate_per_component() {
        let grid = Grid2::new(2, 2);
        let field = Field2::from_fn(grid, |x, y| Vec2::new(x as f32, -(y as f32)));
        let value = Sampler::default().sample(&field, (0.5, 0.5));
        assert_eq!(value, Vec2::new(0.5, -0.5));
    }

    #[test]
    fn neighborhood_bounds_cover_the_stencil() {
        let grid = Grid2::new(3, 3);
        let field = Field2::from_fn(grid, |x, y| (x + 10 * y) as f32);
        let (lo, hi) = Sampler::default().neighborhood_bounds(&field, (0.5, 1.5));
        assert_eq!((lo, hi), (10.0, 21.0));
    }

    #[test]
    fn far_out_of_range_positions_stay_addressable() {
        let grid = Grid2::new(3, 3);
        let field = ramp(grid);
        for sampler in all_samplers() {
            let value = sampler.sample(&field, (1.0e12, -1.0e12));
            assert!(value.is_finite());
        }
    }
}
