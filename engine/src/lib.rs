//! Page Grid Engine
//!
//! The rendering core behind the grid page renderer: a page is a lattice of
//! instanced cube cells whose front faces carry a baked texture atlas.
//! Navigation swaps pages by staggered cell waves, hover state comes from
//! GPU color-id picking, and a single light shadow-maps the grid.
//!
//! # Modules
//!
//! - [`grid`] - Lattice layout, page content mapping and transition state
//! - [`animation`] - Deterministic RNG, staggered waves and tweens
//! - [`camera`] - Cameras and the single-pixel picking frustum
//! - [`render`] - wgpu passes: color, shadow depth, offscreen picking
//!
//! # Example
//!
//! ```ignore
//! use pagegrid_engine::grid::{GridConfig, ViewFlow};
//!
//! let grid = GridConfig::new(38, 24, 19.0, 12.0);
//! let mut flow = ViewFlow::new(grid, 42);
//! flow.set_active_view(some_view);
//! flow.advance(0.016);
//! ```

pub mod animation;
pub mod camera;
pub mod grid;
pub mod render;

// Application-level modules (located in src/app/ directory)
#[path = "../../src/app/mod.rs"]
pub mod app;

// Re-export the most commonly used types at crate level
pub use camera::{pixel_frustum, OrthographicCamera, PerspectiveCamera};
pub use grid::{ActiveBuffer, CellField, GridConfig, TransitionState, ViewDefinition, ViewFlow};
pub use render::{GpuContext, GpuContextConfig};
