//! Grid Module
//!
//! The fixed rectangular cell lattice everything else is addressed against.
//! A grid is `count_x * count_y` cells; each cell has an integer index and a
//! 2D lattice coordinate. The index/coordinate mapping is the single source
//! of truth shared by the picking id encoding and the content-span lookup.
//!
//! ## Index convention
//!
//! `index = count_y * x + y`, decoded as `x = index / count_y`,
//! `y = index % count_y`. Lattice y grows upward (toward the top of the
//! screen), while content items anchor their rows from the top, so span
//! tests flip the anchor once: `row = count_y - item.y - 1`. That flip lives
//! in [`content`], never here.

pub mod cells;
pub mod content;
pub mod transition;

pub use cells::{CellField, HoverSpan};
pub use content::{ContentItem, ViewDefinition};
pub use transition::{ActiveBuffer, TransitionState, ViewFlow};

/// Grid lattice configuration.
///
/// Immutable after construction. Cell step sizes are derived from the total
/// extents, matching how the grid fills a fixed world-space footprint
/// regardless of cell count.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridConfig {
    /// Number of cells along the lattice X axis
    pub count_x: u32,
    /// Number of cells along the lattice Y axis
    pub count_y: u32,
    /// Total world-space width covered by the grid
    pub width_x: f32,
    /// Total world-space height covered by the grid
    pub width_y: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self::new(19, 19, 10.0, 10.0)
    }
}

impl GridConfig {
    /// Create a new grid configuration.
    ///
    /// # Panics
    ///
    /// Zero cell counts or non-positive extents are programmer errors and
    /// fail fast here rather than producing a degenerate grid downstream.
    pub fn new(count_x: u32, count_y: u32, width_x: f32, width_y: f32) -> Self {
        assert!(
            count_x > 0 && count_y > 0,
            "grid must have at least one cell per axis"
        );
        assert!(
            width_x > 0.0 && width_y > 0.0,
            "grid extents must be positive"
        );
        Self {
            count_x,
            count_y,
            width_x,
            width_y,
        }
    }

    /// Total number of cells in the grid.
    pub fn total(&self) -> u32 {
        self.count_x * self.count_y
    }

    /// World-space step between cell centers along X.
    pub fn step_x(&self) -> f32 {
        self.width_x / self.count_x as f32
    }

    /// World-space step between cell centers along Y.
    pub fn step_y(&self) -> f32 {
        self.width_y / self.count_y as f32
    }

    /// Cell index for a lattice coordinate. Inverse of [`cell_coords`].
    ///
    /// [`cell_coords`]: GridConfig::cell_coords
    pub fn cell_index(&self, x: u32, y: u32) -> u32 {
        debug_assert!(x < self.count_x && y < self.count_y);
        self.count_y * x + y
    }

    /// Lattice coordinate for a cell index. Inverse of [`cell_index`].
    ///
    /// [`cell_index`]: GridConfig::cell_index
    pub fn cell_coords(&self, index: u32) -> (u32, u32) {
        debug_assert!(index < self.total());
        (index / self.count_y, index % self.count_y)
    }

    /// World-space center of a cell on the grid plane.
    ///
    /// The grid is centered on the origin; cell (0, 0) sits at the
    /// bottom-left corner.
    pub fn cell_center(&self, x: u32, y: u32) -> (f32, f32) {
        let px = x as f32 * self.step_x() - self.width_x / 2.0 + self.step_x() / 2.0;
        let py = y as f32 * self.step_y() - self.width_y / 2.0 + self.step_y() / 2.0;
        (px, py)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_coord_bijection() {
        let grid = GridConfig::new(19, 19, 10.0, 10.0);
        for i in 0..grid.total() {
            let (x, y) = grid.cell_coords(i);
            assert_eq!(grid.cell_index(x, y), i);
        }
    }

    #[test]
    fn test_bijection_non_square() {
        let grid = GridConfig::new(5, 3, 10.0, 6.0);
        let mut seen = vec![false; grid.total() as usize];
        for x in 0..grid.count_x {
            for y in 0..grid.count_y {
                let i = grid.cell_index(x, y);
                assert!(!seen[i as usize], "index collision at ({x}, {y})");
                seen[i as usize] = true;
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_steps_derived_from_extents() {
        let grid = GridConfig::new(20, 10, 10.0, 5.0);
        assert!((grid.step_x() - 0.5).abs() < 1e-6);
        assert!((grid.step_y() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_grid_is_centered() {
        let grid = GridConfig::new(2, 2, 4.0, 4.0);
        let (x0, y0) = grid.cell_center(0, 0);
        let (x1, y1) = grid.cell_center(1, 1);
        assert!((x0 + x1).abs() < 1e-6);
        assert!((y0 + y1).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "at least one cell")]
    fn test_zero_cell_grid_rejected() {
        GridConfig::new(0, 19, 10.0, 10.0);
    }
}
