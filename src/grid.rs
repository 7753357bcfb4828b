use crate::BoundaryMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid2 {
    width: usize,
    height: usize,
}

impl Grid2 {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    pub fn dims(&self) -> (f32, f32) {
        (self.width as f32, self.height as f32)
    }

    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn clamp_coord(&self, x: i32, y: i32) -> (usize, usize) {
        let max_x = (self.width - 1) as i32;
        let max_y = (self.height - 1) as i32;
        let cx = x.clamp(0, max_x) as usize;
        let cy = y.clamp(0, max_y) as usize;
        (cx, cy)
    }

    pub fn wrap_coord(&self, x: i32, y: i32) -> (usize, usize) {
        let cx = x.rem_euclid(self.width as i32) as usize;
        let cy = y.rem_euclid(self.height as i32) as usize;
        (cx, cy)
    }

    /// Maps any signed coordinate onto an addressable cell.
    pub fn resolve(&self, x: i32, y: i32, boundary: BoundaryMode) -> (usize, usize) {
        match boundary {
            BoundaryMode::Clamp => self.clamp_coord(x, y),
            BoundaryMode::Wrap => self.wrap_coord(x, y),
        }
    }
}
