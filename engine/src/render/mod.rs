//! Render Module
//!
//! wgpu-based rendering infrastructure for the grid page renderer: the GPU
//! context, the shared cell mesh, per-cell instancing, the shadow pass
//! resources and the offscreen picking pass.

pub mod geometry;
pub mod gpu_context;
pub mod instancing;
pub mod picking;
pub mod shader_loader;
pub mod shadow;

// Re-export commonly used types for convenience
pub use geometry::{build_cell_faces, merge_faces, CellVertex, FaceGeometry, FaceOrientation};
pub use gpu_context::{GpuContext, GpuContextConfig};
pub use instancing::{
    build_pick_instances, decode_cell_id, encode_cell_id, CellInstance, PickInstance,
};
pub use picking::PickingPass;
pub use shader_loader::{create_shader_module, load_shader_file, ShaderSource};
pub use shadow::{matrices_differ, shadow_bias_matrix, ShadowSettings, ShadowTarget};
