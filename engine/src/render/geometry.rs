//! Cell Box Geometry
//!
//! Builds the unit cell mesh every grid instance shares: a box whose front
//! face is a rounded rectangle (fan-triangulated, with atlas UVs) and whose
//! remaining faces are plain quads. The back face is generated like the
//! others so callers can decide what to draw; the grid renderer drops it
//! because the camera never sees it.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use std::f32::consts::FRAC_PI_2;

/// Arc subdivision per rounded corner.
pub const CORNER_SEGMENTS: u32 = 6;

/// Which side of the cell box a face covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FaceOrientation {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
}

impl FaceOrientation {
    pub const ALL: [FaceOrientation; 6] = [
        FaceOrientation::Front,
        FaceOrientation::Back,
        FaceOrientation::Left,
        FaceOrientation::Right,
        FaceOrientation::Top,
        FaceOrientation::Bottom,
    ];

    pub fn normal(self) -> Vec3 {
        match self {
            FaceOrientation::Front => Vec3::Z,
            FaceOrientation::Back => Vec3::NEG_Z,
            FaceOrientation::Left => Vec3::NEG_X,
            FaceOrientation::Right => Vec3::X,
            FaceOrientation::Top => Vec3::Y,
            FaceOrientation::Bottom => Vec3::NEG_Y,
        }
    }
}

/// Vertex format shared by the color and depth passes.
///
/// Layout (32 bytes):
/// - position: vec3<f32> at @location(0)
/// - normal:   vec3<f32> at @location(1)
/// - uv:       vec2<f32> at @location(2)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CellVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::const_assert_eq!(std::mem::size_of::<CellVertex>(), 32);

impl CellVertex {
    pub fn new(position: Vec3, normal: Vec3, uv: [f32; 2]) -> Self {
        Self {
            position: position.to_array(),
            normal: normal.to_array(),
            uv,
        }
    }

    /// Per-vertex buffer layout, locations 0..2.
    pub fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
            0 => Float32x3,
            1 => Float32x3,
            2 => Float32x2,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<CellVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// One face of the cell box as an independent triangle list.
#[derive(Clone, Debug)]
pub struct FaceGeometry {
    pub orientation: FaceOrientation,
    pub vertices: Vec<CellVertex>,
    pub indices: Vec<u32>,
}

/// Builds all six faces of a cell box centered at the origin.
///
/// `corner_radius` rounds the front face only; it is clamped so the arcs
/// never overlap. Dimensions must be positive.
pub fn build_cell_faces(
    width: f32,
    height: f32,
    depth: f32,
    corner_radius: f32,
) -> Vec<FaceGeometry> {
    assert!(
        width > 0.0 && height > 0.0 && depth > 0.0,
        "cell box dimensions must be positive: {width} x {height} x {depth}"
    );
    let radius = corner_radius.clamp(0.0, width.min(height) * 0.5);

    FaceOrientation::ALL
        .iter()
        .map(|&orientation| match orientation {
            FaceOrientation::Front => build_front_face(width, height, depth, radius),
            _ => build_quad_face(orientation, width, height, depth),
        })
        .collect()
}

/// Merge the faces whose orientation passes `keep` into one vertex/index
/// buffer pair for a single draw call.
pub fn merge_faces(
    faces: &[FaceGeometry],
    keep: impl Fn(FaceOrientation) -> bool,
) -> (Vec<CellVertex>, Vec<u32>) {
    let mut vertices = Vec::new();
    let mut indices = Vec::new();
    for face in faces.iter().filter(|f| keep(f.orientation)) {
        let base = vertices.len() as u32;
        vertices.extend_from_slice(&face.vertices);
        indices.extend(face.indices.iter().map(|i| i + base));
    }
    (vertices, indices)
}

/// Front face: rounded rectangle in the z = depth/2 plane, fan-triangulated
/// from its center. UVs span the full face with v growing downward so the
/// baked atlas tile reads upright.
fn build_front_face(width: f32, height: f32, depth: f32, radius: f32) -> FaceGeometry {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let z = depth * 0.5;
    let normal = Vec3::Z;

    let uv_of = |x: f32, y: f32| [x / width + 0.5, 0.5 - y / height];

    let mut vertices = vec![CellVertex::new(Vec3::new(0.0, 0.0, z), normal, uv_of(0.0, 0.0))];

    // Arc centers and start angles, counter-clockwise from the top-right
    // corner so the outline winds CCW as seen from +Z.
    let corners = [
        (hw - radius, hh - radius, 0.0_f32),
        (-hw + radius, hh - radius, FRAC_PI_2),
        (-hw + radius, -hh + radius, 2.0 * FRAC_PI_2),
        (hw - radius, -hh + radius, 3.0 * FRAC_PI_2),
    ];
    for (cx, cy, start) in corners {
        for s in 0..=CORNER_SEGMENTS {
            let angle = start + FRAC_PI_2 * s as f32 / CORNER_SEGMENTS as f32;
            let x = cx + radius * angle.cos();
            let y = cy + radius * angle.sin();
            vertices.push(CellVertex::new(Vec3::new(x, y, z), normal, uv_of(x, y)));
        }
    }

    let outline = vertices.len() as u32 - 1;
    let mut indices = Vec::with_capacity(outline as usize * 3);
    for i in 0..outline {
        let a = 1 + i;
        let b = 1 + (i + 1) % outline;
        indices.extend_from_slice(&[0, a, b]);
    }

    FaceGeometry {
        orientation: FaceOrientation::Front,
        vertices,
        indices,
    }
}

/// Side, top, bottom and back faces are plain quads; their UVs are unused by
/// the shader (side pixels sample the tile edge) but kept valid.
fn build_quad_face(
    orientation: FaceOrientation,
    width: f32,
    height: f32,
    depth: f32,
) -> FaceGeometry {
    let hw = width * 0.5;
    let hh = height * 0.5;
    let hd = depth * 0.5;
    let normal = orientation.normal();

    // Corners wound CCW as seen from outside the box.
    let corners: [Vec3; 4] = match orientation {
        FaceOrientation::Front => [
            Vec3::new(-hw, -hh, hd),
            Vec3::new(hw, -hh, hd),
            Vec3::new(hw, hh, hd),
            Vec3::new(-hw, hh, hd),
        ],
        FaceOrientation::Back => [
            Vec3::new(hw, -hh, -hd),
            Vec3::new(-hw, -hh, -hd),
            Vec3::new(-hw, hh, -hd),
            Vec3::new(hw, hh, -hd),
        ],
        FaceOrientation::Left => [
            Vec3::new(-hw, -hh, -hd),
            Vec3::new(-hw, -hh, hd),
            Vec3::new(-hw, hh, hd),
            Vec3::new(-hw, hh, -hd),
        ],
        FaceOrientation::Right => [
            Vec3::new(hw, -hh, hd),
            Vec3::new(hw, -hh, -hd),
            Vec3::new(hw, hh, -hd),
            Vec3::new(hw, hh, hd),
        ],
        FaceOrientation::Top => [
            Vec3::new(-hw, hh, hd),
            Vec3::new(hw, hh, hd),
            Vec3::new(hw, hh, -hd),
            Vec3::new(-hw, hh, -hd),
        ],
        FaceOrientation::Bottom => [
            Vec3::new(-hw, -hh, -hd),
            Vec3::new(hw, -hh, -hd),
            Vec3::new(hw, -hh, hd),
            Vec3::new(-hw, -hh, hd),
        ],
    };
    let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let vertices = corners
        .iter()
        .zip(uvs)
        .map(|(&p, uv)| CellVertex::new(p, normal, uv))
        .collect();

    FaceGeometry {
        orientation,
        vertices,
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_all_six_faces() {
        let faces = build_cell_faces(1.0, 1.0, 0.4, 0.1);
        assert_eq!(faces.len(), 6);
        for orientation in FaceOrientation::ALL {
            assert!(faces.iter().any(|f| f.orientation == orientation));
        }
    }

    #[test]
    fn test_front_face_fan_counts() {
        let faces = build_cell_faces(1.0, 1.0, 0.4, 0.1);
        let front = faces
            .iter()
            .find(|f| f.orientation == FaceOrientation::Front)
            .unwrap();
        let outline = 4 * (CORNER_SEGMENTS as usize + 1);
        assert_eq!(front.vertices.len(), 1 + outline);
        assert_eq!(front.indices.len(), outline * 3);
        for &idx in &front.indices {
            assert!((idx as usize) < front.vertices.len());
        }
    }

    #[test]
    fn test_front_outline_stays_inside_bounds() {
        let (w, h) = (2.0, 1.0);
        let faces = build_cell_faces(w, h, 0.4, 0.25);
        let front = faces
            .iter()
            .find(|f| f.orientation == FaceOrientation::Front)
            .unwrap();
        for v in &front.vertices {
            assert!(v.position[0].abs() <= w * 0.5 + 1e-6);
            assert!(v.position[1].abs() <= h * 0.5 + 1e-6);
            assert!((v.position[2] - 0.2).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rounding_cuts_the_corner() {
        // With a corner radius the outline never reaches the sharp corner
        let faces = build_cell_faces(1.0, 1.0, 0.4, 0.2);
        let front = faces
            .iter()
            .find(|f| f.orientation == FaceOrientation::Front)
            .unwrap();
        for v in &front.vertices {
            let corner_dist =
                ((v.position[0].abs() - 0.5).powi(2) + (v.position[1].abs() - 0.5).powi(2)).sqrt();
            assert!(
                corner_dist >= 0.2 * (1.0 - std::f32::consts::FRAC_1_SQRT_2) - 1e-5,
                "vertex too close to sharp corner: {:?}",
                v.position
            );
        }
    }

    #[test]
    fn test_front_uvs_cover_unit_square() {
        let faces = build_cell_faces(1.0, 1.0, 0.4, 0.1);
        let front = faces
            .iter()
            .find(|f| f.orientation == FaceOrientation::Front)
            .unwrap();
        for v in &front.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]), "u out of range: {}", v.uv[0]);
            assert!((0.0..=1.0).contains(&v.uv[1]), "v out of range: {}", v.uv[1]);
        }
        // Center of the face is the center of the tile
        assert_eq!(front.vertices[0].uv, [0.5, 0.5]);
    }

    #[test]
    fn test_quad_normals_point_outward() {
        let faces = build_cell_faces(1.0, 1.0, 0.4, 0.0);
        for face in &faces {
            let n = face.orientation.normal();
            for v in &face.vertices {
                assert_eq!(v.normal, n.to_array());
                // Every vertex of a face lies on the outward side
                let p = Vec3::from_array(v.position);
                assert!(p.dot(n) > 0.0);
            }
        }
    }

    #[test]
    fn test_merge_drops_filtered_faces() {
        let faces = build_cell_faces(1.0, 1.0, 0.4, 0.1);
        let (vertices, indices) = merge_faces(&faces, |o| o != FaceOrientation::Back);
        let outline = 4 * (CORNER_SEGMENTS as usize + 1);
        assert_eq!(vertices.len(), 1 + outline + 4 * 4);
        assert_eq!(indices.len(), outline * 3 + 4 * 6);
        for &idx in &indices {
            assert!((idx as usize) < vertices.len());
        }
        assert!(
            vertices
                .iter()
                .all(|v| v.normal != Vec3::NEG_Z.to_array())
        );
    }

    #[test]
    #[should_panic(expected = "dimensions must be positive")]
    fn test_zero_dimension_panics() {
        build_cell_faces(0.0, 1.0, 0.4, 0.1);
    }
}
