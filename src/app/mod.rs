//! Application Layer
//!
//! Everything above the engine: the state store, page definitions, resource
//! loading and atlas baking, the GPU view manager and the loading screen.
//! The window event loop in `src/bin/pagegrid.rs` drives these.

pub mod loading_screen;
pub mod resources;
pub mod state;
pub mod view;
pub mod view_manager;
pub mod views;

pub use loading_screen::{LoadingModel, LoadingScreen};
pub use resources::{AtlasBaker, DiskLoader, RasterSurface, ResourceLoader, TILE_PX};
pub use state::{Action, AppState, LoadingPhase, Store};
pub use view::{GridRenderer, GridView, SceneUniforms};
pub use view_manager::ViewManager;
pub use views::{builtin_views, find_view, load_views};
