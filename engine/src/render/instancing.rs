//! GPU Instance Buffer System for Grid Cells
//!
//! Per-cell instance data for the color pass and the picking pass, plus the
//! id-color encoding that makes GPU picking collision-free.

use crate::grid::GridConfig;

/// GPU instance data for a single grid cell.
///
/// Layout (88 bytes total, tightly packed for a vertex buffer):
/// - model:       mat4x4<f32> (64 bytes) - cell transform, rebuilt per frame
/// - cell_index:  f32 (4 bytes) - lattice index, drives the atlas UV offset
/// - shaded_mix:  f32 (4 bytes) - 1 = shaded cell, 0 = lit (image region)
/// - color_scale: f32 (4 bytes) - per-cell brightness jitter
/// - tint:        vec3<f32> (12 bytes) - text tint color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CellInstance {
    pub model: [[f32; 4]; 4],
    pub cell_index: f32,
    pub shaded_mix: f32,
    pub color_scale: f32,
    pub tint: [f32; 3],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CellInstance>(), 88);

impl Default for CellInstance {
    fn default() -> Self {
        Self {
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            cell_index: 0.0,
            shaded_mix: 1.0,
            color_scale: 1.0,
            tint: [0.0, 0.0, 0.0],
        }
    }
}

impl CellInstance {
    /// Vertex buffer layout for the color pass, instance-stepped.
    /// Locations 3..10 (0..2 are the per-vertex position/normal/uv).
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 8] = wgpu::vertex_attr_array![
            3 => Float32x4,  // model col 0
            4 => Float32x4,  // model col 1
            5 => Float32x4,  // model col 2
            6 => Float32x4,  // model col 3
            7 => Float32,    // cell_index
            8 => Float32,    // shaded_mix
            9 => Float32,    // color_scale
            10 => Float32x3, // tint
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// GPU instance data for the picking pass.
///
/// Layout (80 bytes): the rest-pose cell transform plus the 4-byte id color.
/// Built once at construction; picking never sees hover or transition
/// animation.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PickInstance {
    pub model: [[f32; 4]; 4],
    /// Cell id encoded as an RGBA8 color, see [`encode_cell_id`]
    pub id_color: [u8; 4],
    pub _pad: [u8; 12],
}

static_assertions::const_assert_eq!(std::mem::size_of::<PickInstance>(), 80);

impl PickInstance {
    /// Vertex buffer layout for the picking pass, instance-stepped.
    /// Locations 1..5 (0 is the per-vertex position).
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            1 => Float32x4,
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Unorm8x4, // id color
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PickInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Encode a cell index into a unique non-zero RGBA8 id color.
///
/// The stored id is `index + 1`, packed LSB-first across the four channels,
/// so the cleared background (0) can never alias a real cell.
pub fn encode_cell_id(index: u32) -> [u8; 4] {
    (index + 1).to_le_bytes()
}

/// Decode a read-back pixel into a cell index.
///
/// Returns `None` for the reserved background id 0.
pub fn decode_cell_id(pixel: [u8; 4]) -> Option<u32> {
    let id = u32::from_le_bytes(pixel);
    if id == 0 { None } else { Some(id - 1) }
}

/// Build the static rest-pose pick instances for a grid: every cell at its
/// lattice center with its encoded id.
pub fn build_pick_instances(grid: &GridConfig) -> Vec<PickInstance> {
    let mut instances = Vec::with_capacity(grid.total() as usize);
    for i in 0..grid.total() {
        let (x, y) = grid.cell_coords(i);
        let (px, py) = grid.cell_center(x, y);
        let model = glam::Mat4::from_translation(glam::Vec3::new(px, py, 0.0));
        instances.push(PickInstance {
            model: model.to_cols_array_2d(),
            id_color: encode_cell_id(i),
            _pad: [0; 12],
        });
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_round_trip_full_range() {
        // 20x20 grid: every index survives encode/decode with no collisions
        let mut seen = std::collections::HashSet::new();
        for i in 0..400 {
            let color = encode_cell_id(i);
            assert!(seen.insert(color), "id collision at {i}");
            assert_eq!(decode_cell_id(color), Some(i));
        }
    }

    #[test]
    fn test_background_decodes_to_no_hit() {
        assert_eq!(decode_cell_id([0, 0, 0, 0]), None);
    }

    #[test]
    fn test_id_zero_never_assigned() {
        for i in 0..1000 {
            assert_ne!(encode_cell_id(i), [0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_encoding_is_lsb_first() {
        assert_eq!(encode_cell_id(0), [1, 0, 0, 0]);
        assert_eq!(encode_cell_id(255), [0, 1, 0, 0]);
        assert_eq!(encode_cell_id(0x0304_0506 - 1), [6, 5, 4, 3]);
    }

    #[test]
    fn test_pick_instances_cover_grid() {
        let grid = GridConfig::new(4, 5, 4.0, 5.0);
        let instances = build_pick_instances(&grid);
        assert_eq!(instances.len(), 20);
        assert_eq!(decode_cell_id(instances[7].id_color), Some(7));
    }
}
