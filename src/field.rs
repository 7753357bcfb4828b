use crate::{Grid2, Vec2};
use rayon::prelude::*;
use std::fmt::Debug;
use std::sync::OnceLock;

const PAR_THRESHOLD_DEFAULT: usize = 262_144;
const PAR_MIN_WORK_PER_THREAD: usize = 4096;

fn parallel_threshold() -> usize {
    static THRESHOLD: OnceLock<usize> = OnceLock::new();
    *THRESHOLD.get_or_init(|| {
        std::env::var("SIM_PAR_THRESHOLD")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(PAR_THRESHOLD_DEFAULT)
    })
}

pub(crate) fn should_parallel(len: usize) -> bool {
    if len < parallel_threshold() {
        return false;
    }
    let threads = rayon::current_num_threads().max(1);
    len / threads >= PAR_MIN_WORK_PER_THREAD
}

/// Per-cell payload of a field: the arithmetic sampling and advection need.
pub trait CellValue: Copy + Default + Debug + PartialEq + Send + Sync + 'static {
    fn lerp(a: Self, b: Self, t: f32) -> Self;
    fn add(a: Self, b: Self) -> Self;
    fn sub(a: Self, b: Self) -> Self;
    fn scale(a: Self, s: f32) -> Self;
    fn min(a: Self, b: Self) -> Self;
    fn max(a: Self, b: Self) -> Self;
    fn is_finite(a: Self) -> bool;
}

impl CellValue for f32 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        a + (b - a) * t
    }

    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    fn scale(a: Self, s: f32) -> Self {
        a * s
    }

    fn min(a: Self, b: Self) -> Self {
        a.min(b)
    }

    fn max(a: Self, b: Self) -> Self {
        a.max(b)
    }

    fn is_finite(a: Self) -> bool {
        a.is_finite()
    }
}

impl CellValue for Vec2 {
    fn lerp(a: Self, b: Self, t: f32) -> Self {
        Vec2::new(<f32 as CellValue>::lerp(a.x, b.x, t), <f32 as CellValue>::lerp(a.y, b.y, t))
    }

    fn add(a: Self, b: Self) -> Self {
        a + b
    }

    fn sub(a: Self, b: Self) -> Self {
        a - b
    }

    fn scale(a: Self, s: f32) -> Self {
        a * s
    }

    fn min(a: Self, b: Self) -> Self {
        a.min(b)
    }

    fn max(a: Self, b: Self) -> Self {
        a.max(b)
    }

    fn is_finite(a: Self) -> bool {
        a.is_finite()
    }
}

/// Dense row-major `W×H` buffer, one `T` per cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Field2<T = f32> {
    grid: Grid2,
    data: Vec<T>,
}

impl<T: CellValue> Field2<T> {
    pub fn new(grid: Grid2, fill: T) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> T + Sync) -> Self {
        let mut field = Self::new(grid, T::default());
        field.fill_with_index(f);
        field
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.grid.idx(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.grid.idx(x, y);
        self.data[idx] = value;
    }

    /// Writes every cell exactly once from `f`; cells never observe each other.
    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> T + Sync) {
        let width = self.grid.width();
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                let x = i % width;
                let y = i / width;
                *value = f(x, y);
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                let x = i % width;
                let y = i / width;
                *value = f(x, y);
            }
        }
    }

    pub fn update_with_index(&mut self, f: impl Fn(usize, usize, T) -> T + Sync) {
        let width = self.grid.width();
        if should_parallel(self.data.len()) {
            self.data.par_iter_mut().enumerate().for_each(|(i, value)| {
                let x = i % width;
                let y = i / width;
                *value = f(x, y, *value);
            });
        } else {
            for (i, value) in self.data.iter_mut().enumerate() {
                let x = i % width;
                let y = i / width;
                *value = f(x, y, *value);
            }
        }
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.assert_same_grid(other);
        self.data.copy_from_slice(&other.data);
    }

    pub fn map<U: CellValue>(&self, f: impl Fn(T) -> U + Sync) -> Field2<U> {
        Field2::from_fn(self.grid, |x, y| f(self.get(x, y)))
    }

    pub(crate) fn assert_same_grid<U>(&self, other: &Field2<U>) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
    }
}

impl Field2<f32> {
    pub fn sum(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().sum()
        } else {
            self.data.iter().sum()
        }
    }

    pub fn abs_sum(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().map(|value| value.abs()).sum()
        } else {
            self.data.iter().map(|value| value.abs()).sum()
        }
    }

    pub fn sum_squares(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data.par_iter().map(|value| value * value).sum()
        } else {
            self.data.iter().map(|value| value * value).sum()
        }
    }

    pub fn max_abs(&self) -> f32 {
        if should_parallel(self.data.len()) {
            self.data
                .par_iter()
                .map(|value| value.abs())
                .reduce(|| 0.0_f32, f32::max)
        } else {
            self.data
                .iter()
                .map(|value| value.abs())
                .fold(0.0_f32, f32::max)
        }
    }

    /// Largest per-cell absolute difference between two fields on the same grid.
    pub fn max_abs_diff(&self, other: &Self) -> f32 {
        self.assert_same_grid(other);
        if should_parallel(self.data.len()) {
            self.data
                .par_iter()
                .zip(other.data.par_iter())
                .map(|(a, b)| (a - b).abs())
                .reduce(|| 0.0_f32, f32::max)
        } else {
            self.data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0_f32, f32::max)
        }
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((*first, *first), |(lo, hi), value| (lo.min(*value), hi.max(*value)))
    }
}
